//! One-shot consumer acceptor.
//!
//! Waits for the single permitted consumer on a loopback-only endpoint and
//! installs it into the delivery slot. Single-shot by design: there is one
//! consumer per process lifetime, so an accept failure clears the run flag
//! instead of retrying.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use tokio::net::{TcpListener, TcpSocket};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::delivery::PeerSender;
use crate::error::{BridgeError, Result};

/// One-shot listener that installs the single delivery peer.
pub struct Acceptor {
    listener: TcpListener,
}

impl Acceptor {
    /// Bind the loopback-only listening endpoint.
    ///
    /// Backlog of one matches the single-consumer model; address reuse lets
    /// a restarted bridge rebind immediately.
    pub fn bind(port: u16) -> Result<Self> {
        let addr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, port));
        let socket = TcpSocket::new_v4().map_err(|source| BridgeError::bind(addr, source))?;
        socket.set_reuseaddr(true).map_err(|source| BridgeError::bind(addr, source))?;
        socket.bind(addr).map_err(|source| BridgeError::bind(addr, source))?;
        let listener = socket.listen(1).map_err(|source| BridgeError::bind(addr, source))?;

        info!(%addr, "listening for the consumer");
        Ok(Self { listener })
    }

    /// Actual bound address; useful when the port was 0.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Wait for the single peer and install it into the delivery slot.
    ///
    /// Returns the listener back so teardown can close it in the fixed
    /// order after the acquisition loop is joined. On accept failure the
    /// run flag is cleared — with no possible consumer there is no point
    /// streaming — and the error propagates.
    pub async fn accept_one(self, peer_tx: PeerSender, run: &CancellationToken) -> Result<TcpListener> {
        let accepted = tokio::select! {
            _ = run.cancelled() => {
                info!("run flag cleared before a consumer connected");
                return Ok(self.listener);
            }
            accepted = self.listener.accept() => accepted,
        };

        match accepted {
            Ok((stream, addr)) => {
                info!(%addr, "consumer connected, streaming tracking data");
                if peer_tx.send(stream).is_err() {
                    // The loop is already gone; nothing left to stream to.
                    run.cancel();
                }
                Ok(self.listener)
            }
            Err(source) => {
                error!(error = %source, "accept failed, stopping the pipeline");
                run.cancel();
                Err(BridgeError::Accept { source })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::DeliveryChannel;
    use tokio::net::TcpStream;

    #[tokio::test]
    async fn binds_loopback_only() {
        let acceptor = Acceptor::bind(0).expect("bind");
        let addr = acceptor.local_addr().expect("addr");
        assert!(addr.ip().is_loopback());
    }

    #[tokio::test]
    async fn installs_exactly_one_peer() {
        let acceptor = Acceptor::bind(0).expect("bind");
        let addr = acceptor.local_addr().expect("addr");
        let (mut channel, peer_tx) = DeliveryChannel::new();
        let run = CancellationToken::new();

        let accept = tokio::spawn({
            let run = run.clone();
            async move { acceptor.accept_one(peer_tx, &run).await }
        });

        let _client = TcpStream::connect(addr).await.expect("connect");
        let listener = accept.await.expect("task").expect("accept");

        assert!(channel.attached());
        assert!(!run.is_cancelled());
        drop(listener);
    }

    #[tokio::test]
    async fn cancelled_run_flag_unblocks_the_acceptor() {
        let acceptor = Acceptor::bind(0).expect("bind");
        let (_channel, peer_tx) = DeliveryChannel::new();
        let run = CancellationToken::new();
        run.cancel();

        // Must return promptly with the listener, without a peer.
        let listener = acceptor.accept_one(peer_tx, &run).await.expect("no accept error");
        drop(listener);
    }
}
