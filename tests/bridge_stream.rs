//! End-to-end tests over real loopback TCP.
//!
//! These drive the full pipeline — scripted device source, acquisition
//! loop, acceptor, delivery channel — and read what a real consumer would
//! see on the wire.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;

use handlink::sources::scripted::Step;
use handlink::{
    Acceptor, AcquisitionLoop, DeliveryChannel, DeviceEvent, Finger, Hand, HandSide, LoopOutcome,
    Quat, ScriptedSource, TrackingFrame, Vec3,
};

const POLL_TIMEOUT: Duration = Duration::from_millis(10);

fn left_hand(id: u32) -> Hand {
    Hand {
        id,
        side: HandSide::Left,
        palm_position: Vec3::new(0.0, 180.0, -30.0),
        palm_stabilized: Vec3::new(0.0, 180.0, -30.0),
        palm_velocity: Vec3::new(0.0, 0.0, 0.0),
        palm_orientation: Quat::IDENTITY,
        grab_strength: 0.0,
        pinch_strength: 1.0,
        pinch_distance: 12.0,
        grab_angle: 0.0,
        fingers: [Finger { tip_position: Vec3::new(5.0, 200.0, -40.0), is_extended: true }; 5],
    }
}

fn tracking(frame_id: i64, hands: Vec<Hand>) -> Step {
    Step::Event(DeviceEvent::Tracking(TrackingFrame { frame_id, framerate: 90.0, hands }))
}

#[tokio::test(flavor = "multi_thread")]
async fn streams_frames_to_the_single_consumer() {
    let run = CancellationToken::new();
    let source = ScriptedSource::new(vec![
        Step::Event(DeviceEvent::Connected),
        Step::Event(DeviceEvent::DeviceFound),
        tracking(1, vec![left_hand(9)]),
        tracking(2, vec![]),
        Step::Event(DeviceEvent::ConnectionLost),
    ]);
    let (channel, peer_tx) = DeliveryChannel::new();

    let acceptor = Acceptor::bind(0).expect("bind");
    let addr = acceptor.local_addr().expect("addr");
    let accept_task = tokio::spawn({
        let run = run.clone();
        async move { acceptor.accept_one(peer_tx, &run).await }
    });

    // Attach the consumer before the loop starts so no frame is dropped.
    let client = TcpStream::connect(addr).await.expect("connect");
    let listener = accept_task.await.expect("task").expect("accept");

    let handle = AcquisitionLoop::new(source, channel, POLL_TIMEOUT, 4096)
        .with_run_flag(run.clone())
        .spawn();

    let mut lines = BufReader::new(client).lines();

    let first = lines.next_line().await.expect("read").expect("first record");
    let value: serde_json::Value = serde_json::from_str(&first).expect("valid JSON");
    assert_eq!(value["frameId"].as_i64(), Some(1));
    assert_eq!(value["framerate"].as_f64(), Some(90.0));
    let hands = value["hands"].as_array().expect("hands");
    assert_eq!(hands.len(), 1);
    assert_eq!(hands[0]["type"], "left");
    assert_eq!(hands[0]["fingerExtended"]["index"], serde_json::Value::Bool(true));

    let second = lines.next_line().await.expect("read").expect("second record");
    let value: serde_json::Value = serde_json::from_str(&second).expect("valid JSON");
    assert_eq!(value["frameId"].as_i64(), Some(2));
    assert_eq!(value["hands"].as_array().map(Vec::len), Some(0));

    let (outcome, source) = handle.join().await;
    assert_eq!(outcome, LoopOutcome::DriverEnded);
    assert!(source.is_some());
    assert!(run.is_cancelled());

    // The bridge closed the connection; the consumer sees a clean EOF.
    assert!(lines.next_line().await.expect("read").is_none());
    drop(listener);
}

#[tokio::test(flavor = "multi_thread")]
async fn peer_loss_triggers_exactly_one_shutdown_sequence() {
    let run = CancellationToken::new();

    // Enough frames to outlast socket buffering after the peer resets.
    let mut steps = vec![Step::Event(DeviceEvent::Connected), Step::Event(DeviceEvent::DeviceFound)];
    for id in 0..500 {
        steps.push(tracking(id, vec![left_hand(1)]));
    }
    steps.push(Step::Event(DeviceEvent::ConnectionLost));

    let source = ScriptedSource::new(steps);
    let counters = source.counters();
    let (channel, peer_tx) = DeliveryChannel::new();

    let acceptor = Acceptor::bind(0).expect("bind");
    let addr = acceptor.local_addr().expect("addr");
    let accept_task = tokio::spawn({
        let run = run.clone();
        async move { acceptor.accept_one(peer_tx, &run).await }
    });

    let client = TcpStream::connect(addr).await.expect("connect");
    // Reset on close so the bridge's writes fail fast.
    client.set_linger(Some(Duration::ZERO)).expect("linger");
    let listener = accept_task.await.expect("task").expect("accept");
    drop(client);

    let handle = AcquisitionLoop::new(source, channel, POLL_TIMEOUT, 4096)
        .with_run_flag(run.clone())
        .spawn();

    let (outcome, source) = handle.join().await;
    assert_eq!(outcome, LoopOutcome::PeerLost);
    assert!(source.is_some());
    assert!(run.is_cancelled());

    // Exactly one shutdown: the session was closed once, by the loop.
    assert_eq!(counters.close_calls(), 1);
    drop(listener);
}

#[tokio::test(flavor = "multi_thread")]
async fn frames_without_a_consumer_are_dropped_silently() {
    let run = CancellationToken::new();
    let source = ScriptedSource::new(vec![
        Step::Event(DeviceEvent::Connected),
        tracking(1, vec![left_hand(2)]),
        tracking(2, vec![left_hand(2)]),
        tracking(3, vec![]),
        Step::Event(DeviceEvent::ConnectionLost),
    ]);
    let counters = source.counters();
    let (channel, peer_tx) = DeliveryChannel::new();

    let acceptor = Acceptor::bind(0).expect("bind");
    let accept_task = tokio::spawn({
        let run = run.clone();
        async move { acceptor.accept_one(peer_tx, &run).await }
    });

    // No consumer ever connects; the session still streams to completion.
    let handle = AcquisitionLoop::new(source, channel, POLL_TIMEOUT, 4096)
        .with_run_flag(run.clone())
        .spawn();

    let (outcome, _) = handle.join().await;
    assert_eq!(outcome, LoopOutcome::DriverEnded);
    assert_eq!(counters.close_calls(), 1);

    // The loop's shutdown released the acceptor too.
    let listener = accept_task.await.expect("task").expect("unblocked by the run flag");
    drop(listener);
}
