//! Contract Test: Link State Watching and Monitoring
//!
//! Constraints verified:
//! - The watch loop returns Ok(()) on cancellation
//! - Removal of a watched interface stops the loop with an error
//! - Events for unwatched interfaces are ignored
//! - A failed or ended event stream stops the loop with an error
//! - The monitor keeps receiving through transport errors

mod common;

use common::*;
use corerad_core::error::Error;
use corerad_core::ndp::RouterAdvertisement;
use corerad_core::task::{watch_link_state, Monitor};
use corerad_core::traits::{LinkEvent, LinkEventKind, LinkStateSource, Message, Received, Task};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const DEADLINE: Duration = Duration::from_secs(5);

fn watched() -> Vec<String> {
    vec!["eth0".to_string(), "eth1".to_string()]
}

#[tokio::test]
async fn watch_returns_ok_on_cancel() {
    let (source, tx) = ControlledLinkState::new();
    let source: Arc<dyn LinkStateSource> = Arc::new(source);
    let cancel = CancellationToken::new();

    let handle = tokio::spawn(watch_link_state(source, watched(), cancel.clone()));

    tx.send(Ok(LinkEvent::new("eth0", LinkEventKind::Up))).unwrap();
    tx.send(Ok(LinkEvent::new("eth0", LinkEventKind::Up))).unwrap();
    tx.send(Ok(LinkEvent::new("eth1", LinkEventKind::Down))).unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!handle.is_finished());

    cancel.cancel();
    let result = tokio::time::timeout(DEADLINE, handle).await.unwrap().unwrap();
    assert!(result.is_ok(), "{:?}", result);
}

#[tokio::test]
async fn watched_interface_removal_is_an_error() {
    let (source, tx) = ControlledLinkState::new();
    let source: Arc<dyn LinkStateSource> = Arc::new(source);

    tx.send(Ok(LinkEvent::new("eth0", LinkEventKind::Up))).unwrap();
    tx.send(Ok(LinkEvent::new("eth1", LinkEventKind::Removed))).unwrap();

    let result = tokio::time::timeout(
        DEADLINE,
        watch_link_state(source, watched(), CancellationToken::new()),
    )
    .await
    .expect("watch should stop on removal");

    match result {
        Err(Error::LinkState(msg)) => assert!(msg.contains("eth1"), "{}", msg),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn unwatched_interfaces_are_ignored() {
    let (source, tx) = ControlledLinkState::new();
    let source: Arc<dyn LinkStateSource> = Arc::new(source);
    let cancel = CancellationToken::new();

    tx.send(Ok(LinkEvent::new("wlan0", LinkEventKind::Removed))).unwrap();
    tx.send(Ok(LinkEvent::new("docker0", LinkEventKind::Down))).unwrap();

    let handle = tokio::spawn(watch_link_state(source, watched(), cancel.clone()));
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!handle.is_finished(), "unwatched removal must not stop the watcher");

    cancel.cancel();
    assert!(tokio::time::timeout(DEADLINE, handle).await.unwrap().unwrap().is_ok());
}

#[tokio::test]
async fn stream_failure_is_an_error() {
    let (source, tx) = ControlledLinkState::new();
    let source: Arc<dyn LinkStateSource> = Arc::new(source);

    tx.send(Err(Error::link_state("socket closed"))).unwrap();

    let result = watch_link_state(source, watched(), CancellationToken::new()).await;
    assert!(matches!(result, Err(Error::LinkState(_))), "{:?}", result);
}

#[tokio::test]
async fn stream_end_is_an_error() {
    let (source, tx) = ControlledLinkState::new();
    let source: Arc<dyn LinkStateSource> = Arc::new(source);
    drop(tx);

    let result = watch_link_state(source, watched(), CancellationToken::new()).await;
    match result {
        Err(Error::LinkState(msg)) => assert!(msg.contains("ended"), "{}", msg),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn subscribe_failure_is_an_error() {
    let source: Arc<dyn LinkStateSource> = Arc::new(ControlledLinkState::unavailable());

    let result = watch_link_state(source, watched(), CancellationToken::new()).await;
    assert!(matches!(result, Err(Error::LinkState(_))), "{:?}", result);
}

#[tokio::test]
async fn monitor_survives_receive_errors() {
    let transports = Arc::new(MockTransportFactory::new());
    let mut monitor = Monitor::new("eth0", transports.clone());
    assert_eq!(monitor.to_string(), r#"monitor "eth0""#);

    transports.inject("eth0", Err(Error::transport("message too long")));
    transports.inject(
        "eth0",
        Ok(Received {
            from: "fe80::1".parse().unwrap(),
            message: Message::RouterAdvertisement(RouterAdvertisement::default()),
        }),
    );

    let cancel = CancellationToken::new();
    let handle = {
        let cancel = cancel.clone();
        tokio::spawn(async move { monitor.run(cancel).await })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!handle.is_finished());
    assert_eq!(transports.opened(), vec!["eth0"]);

    cancel.cancel();
    assert!(tokio::time::timeout(DEADLINE, handle).await.unwrap().unwrap().is_ok());

    // Monitors never transmit.
    assert!(transports.sent().is_empty());
}
