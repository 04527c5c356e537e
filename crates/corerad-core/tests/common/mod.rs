//! Test doubles and common utilities for contract tests
//!
//! These doubles stand in for the operating system: no sockets are opened
//! and every NDP message is exchanged through in-memory channels.

#![allow(dead_code)]

use async_trait::async_trait;
use corerad_core::error::{Error, Result};
use corerad_core::ndp::RouterAdvertisement;
use corerad_core::traits::{
    AddressSource, InterfaceAddr, LinkEvent, LinkEventStream, LinkStateSource, Message, Received,
    Task, Transport, TransportFactory,
};
use corerad_core::Server;
use std::collections::HashMap;
use std::fmt;
use std::net::Ipv6Addr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// An advertisement handed to a mock transport
#[derive(Debug, Clone)]
pub struct SentAdvertisement {
    pub interface: String,
    pub dst: Ipv6Addr,
    pub ra: RouterAdvertisement,
    pub at: Instant,
}

type Inbox = mpsc::UnboundedReceiver<Result<Received>>;

/// Opens in-memory transports and records everything they send
#[derive(Default)]
pub struct MockTransportFactory {
    sent: Arc<Mutex<Vec<SentAdvertisement>>>,
    senders: Mutex<HashMap<String, mpsc::UnboundedSender<Result<Received>>>>,
    inboxes: Mutex<HashMap<String, Inbox>>,
    opened: Mutex<Vec<String>>,
    fail_open: AtomicBool,
    fail_send: Arc<AtomicBool>,
    stall_send: Arc<AtomicBool>,
}

impl MockTransportFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `open` fail
    pub fn fail_open(&self) {
        self.fail_open.store(true, Ordering::SeqCst);
    }

    /// Make every subsequent `send` fail (or succeed again)
    pub fn set_fail_send(&self, fail: bool) {
        self.fail_send.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent `send` hang forever, as on a wedged socket
    pub fn stall_send(&self) {
        self.stall_send.store(true, Ordering::SeqCst);
    }

    /// Deliver `item` to the transport for `interface`, opened or not
    pub fn inject(&self, interface: &str, item: Result<Received>) {
        let tx = self.sender(interface);
        let _ = tx.send(item);
    }

    /// Deliver a router solicitation from `from`
    pub fn solicit(&self, interface: &str, from: Ipv6Addr) {
        self.inject(
            interface,
            Ok(Received {
                from,
                message: Message::RouterSolicitation,
            }),
        );
    }

    pub fn sent(&self) -> Vec<SentAdvertisement> {
        self.sent.lock().unwrap().clone()
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }

    fn sender(&self, interface: &str) -> mpsc::UnboundedSender<Result<Received>> {
        let mut senders = self.senders.lock().unwrap();
        if let Some(tx) = senders.get(interface) {
            return tx.clone();
        }

        let (tx, rx) = mpsc::unbounded_channel();
        senders.insert(interface.to_string(), tx.clone());
        self.inboxes.lock().unwrap().insert(interface.to_string(), rx);
        tx
    }
}

#[async_trait]
impl TransportFactory for MockTransportFactory {
    async fn open(&self, interface: &str) -> Result<Box<dyn Transport>> {
        if self.fail_open.load(Ordering::SeqCst) {
            return Err(Error::transport(format!("cannot open {}", interface)));
        }

        // Keep a sender alive so an idle inbox pends instead of closing.
        let _ = self.sender(interface);
        let inbox = self
            .inboxes
            .lock()
            .unwrap()
            .remove(interface)
            .unwrap_or_else(|| mpsc::unbounded_channel().1);

        self.opened.lock().unwrap().push(interface.to_string());

        Ok(Box::new(MockTransport {
            interface: interface.to_string(),
            sent: Arc::clone(&self.sent),
            fail_send: Arc::clone(&self.fail_send),
            stall_send: Arc::clone(&self.stall_send),
            inbox: tokio::sync::Mutex::new(inbox),
        }))
    }
}

pub struct MockTransport {
    interface: String,
    sent: Arc<Mutex<Vec<SentAdvertisement>>>,
    fail_send: Arc<AtomicBool>,
    stall_send: Arc<AtomicBool>,
    inbox: tokio::sync::Mutex<Inbox>,
}

#[async_trait]
impl Transport for MockTransport {
    fn interface(&self) -> &str {
        &self.interface
    }

    async fn send(&self, ra: &RouterAdvertisement, dst: Ipv6Addr) -> Result<()> {
        if self.stall_send.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }

        if self.fail_send.load(Ordering::SeqCst) {
            return Err(Error::transport("network is unreachable"));
        }

        self.sent.lock().unwrap().push(SentAdvertisement {
            interface: self.interface.clone(),
            dst,
            ra: ra.clone(),
            at: Instant::now(),
        });
        Ok(())
    }

    async fn receive(&self) -> Result<Received> {
        let mut inbox = self.inbox.lock().await;
        match inbox.recv().await {
            Some(item) => item,
            None => std::future::pending().await,
        }
    }
}

/// Returns the same addresses for every interface
pub struct StaticAddressSource {
    addrs: Vec<InterfaceAddr>,
}

impl StaticAddressSource {
    pub fn new(addrs: Vec<InterfaceAddr>) -> Self {
        Self { addrs }
    }
}

impl AddressSource for StaticAddressSource {
    fn addresses(&self, _interface: &str) -> Result<Vec<InterfaceAddr>> {
        Ok(self.addrs.clone())
    }
}

/// A link state source driven by the test
pub struct ControlledLinkState {
    rx: Mutex<Option<mpsc::UnboundedReceiver<Result<LinkEvent>>>>,
    fail_subscribe: bool,
}

impl ControlledLinkState {
    pub fn new() -> (Self, mpsc::UnboundedSender<Result<LinkEvent>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let source = Self {
            rx: Mutex::new(Some(rx)),
            fail_subscribe: false,
        };
        (source, tx)
    }

    /// A source whose `subscribe` always fails, like a missing netlink socket
    pub fn unavailable() -> Self {
        Self {
            rx: Mutex::new(None),
            fail_subscribe: true,
        }
    }
}

#[async_trait]
impl LinkStateSource for ControlledLinkState {
    async fn subscribe(&self) -> Result<LinkEventStream> {
        if self.fail_subscribe {
            return Err(Error::link_state("no such file or directory"));
        }

        let rx = self
            .rx
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| Error::link_state("already subscribed"))?;

        Ok(Box::pin(tokio_stream::wrappers::UnboundedReceiverStream::new(rx)))
    }
}

/// A link state source that never reports anything
pub struct IdleLinkState;

#[async_trait]
impl LinkStateSource for IdleLinkState {
    async fn subscribe(&self) -> Result<LinkEventStream> {
        Ok(Box::pin(tokio_stream::pending::<Result<LinkEvent>>()))
    }
}

/// A server wired to in-memory doubles, plus the transport factory so tests
/// can inspect traffic
pub fn test_server(addrs: Vec<InterfaceAddr>) -> (Server, Arc<MockTransportFactory>) {
    let transports = Arc::new(MockTransportFactory::new());
    let server = Server::new(
        transports.clone(),
        Arc::new(StaticAddressSource::new(addrs)),
        Arc::new(IdleLinkState),
    );
    (server, transports)
}

/// A task that waits for cancellation and counts how often it ran
pub struct CountingTask {
    name: String,
    runs: Arc<AtomicUsize>,
}

impl CountingTask {
    pub fn new(name: impl Into<String>, runs: Arc<AtomicUsize>) -> Self {
        Self {
            name: name.into(),
            runs,
        }
    }
}

#[async_trait]
impl Task for CountingTask {
    async fn run(&mut self, cancel: CancellationToken) -> Result<()> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        cancel.cancelled().await;
        Ok(())
    }
}

impl fmt::Display for CountingTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "counting task {:?}", self.name)
    }
}

/// A task that fails immediately
pub struct FailingTask;

#[async_trait]
impl Task for FailingTask {
    async fn run(&mut self, _cancel: CancellationToken) -> Result<()> {
        Err(Error::Other("boom".to_string()))
    }
}

impl fmt::Display for FailingTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("failing task")
    }
}

/// A task that panics immediately
pub struct PanickingTask;

#[async_trait]
impl Task for PanickingTask {
    async fn run(&mut self, _cancel: CancellationToken) -> Result<()> {
        panic!("task panicked on purpose");
    }
}

impl fmt::Display for PanickingTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("panicking task")
    }
}

/// A task whose preparation fails
pub struct UnpreparableTask;

#[async_trait]
impl Task for UnpreparableTask {
    async fn prepare(&mut self) -> Result<()> {
        Err(Error::task(self.to_string(), "address already in use"))
    }

    async fn run(&mut self, _cancel: CancellationToken) -> Result<()> {
        panic!("run must not be called after a failed prepare");
    }
}

impl fmt::Display for UnpreparableTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unpreparable task")
    }
}
