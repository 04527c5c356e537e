// # Link State Source Trait
//
// Defines the interface for observing link state changes.
//
// ## Implementations
//
// - rtnetlink-based (Linux): `corerad-netlink` crate
//
// ## Usage
//
// ```rust,ignore
// use tokio_stream::StreamExt;
//
// let mut events = source.subscribe().await?;
// while let Some(event) = events.next().await {
//     println!("{:?}", event?);
// }
// ```

use async_trait::async_trait;
use std::pin::Pin;
use tokio_stream::Stream;

/// What happened to a link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEventKind {
    /// Operationally up
    Up,
    /// Operationally down (cable unplugged, administratively down, ...)
    Down,
    /// The interface no longer exists
    Removed,
}

/// A link state change for one interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEvent {
    /// Interface name
    pub interface: String,
    /// What happened
    pub kind: LinkEventKind,
}

impl LinkEvent {
    pub fn new(interface: impl Into<String>, kind: LinkEventKind) -> Self {
        Self {
            interface: interface.into(),
            kind,
        }
    }
}

/// Stream of link events; an `Err` item means the source has failed
pub type LinkEventStream = Pin<Box<dyn Stream<Item = crate::Result<LinkEvent>> + Send + 'static>>;

/// Trait for link state sources
///
/// # Behavior
///
/// - Events are pushed by the operating system, not polled
/// - The stream runs until dropped; it ends only if the source fails
/// - Dropping the stream must release the underlying socket
#[async_trait]
pub trait LinkStateSource: Send + Sync {
    /// Subscribe to link state changes for all interfaces
    async fn subscribe(&self) -> crate::Result<LinkEventStream>;
}
