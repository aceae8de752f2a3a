//! Handlink bridge process.
//!
//! Wires the pipeline together: open the device source, spawn the
//! acquisition loop, wait for the single consumer, then unwind through
//! the fixed teardown order. Exits nonzero when any fatal condition
//! occurred before a clean, fully-streamed shutdown.

use anyhow::Context as _;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use handlink::{Acceptor, AcquisitionLoop, Config, DeliveryChannel, DeviceSource as _, ReplaySource};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env().context("loading configuration")?;
    info!(port = config.port, capture = %config.capture.display(), "starting handlink");

    // The driver connection is one-shot for the process lifetime; restart
    // is a supervisor concern.
    let source = ReplaySource::open(&config.capture).context("opening capture")?;

    let (channel, peer_tx) = DeliveryChannel::new();
    let handle =
        AcquisitionLoop::new(source, channel, config.poll_timeout, config.record_capacity).spawn();
    let run = handle.run_flag();

    // Accepting blocks the main thread until the one consumer shows up or
    // the pipeline dies first. Accept and bind failures both clear the run
    // flag: with no possible consumer there is no point streaming.
    let mut accept_failed = false;
    let listener = match Acceptor::bind(config.port) {
        Ok(acceptor) => match acceptor.accept_one(peer_tx, &run).await {
            Ok(listener) => Some(listener),
            Err(err) => {
                error!(error = %err, "no consumer possible");
                accept_failed = true;
                None
            }
        },
        Err(err) => {
            error!(error = %err, "no consumer possible");
            run.cancel();
            accept_failed = true;
            None
        }
    };

    // Fixed teardown order: join the loop (it closes the peer and the
    // source), close the listening endpoint, close the session once more.
    let (outcome, source) = handle.join().await;
    drop(listener);
    if let Some(mut source) = source {
        source.close().await;
    }

    info!(outcome = ?outcome, "handlink terminated");

    if accept_failed || !outcome.is_clean() {
        anyhow::bail!("bridge stopped after a fatal condition");
    }
    Ok(())
}
