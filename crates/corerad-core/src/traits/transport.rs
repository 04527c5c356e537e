// # Transport Trait
//
// Defines the boundary between CoreRAD and whatever actually puts Neighbor
// Discovery messages on the wire. Packet framing, ICMPv6 checksums and
// socket options all live behind this trait.
//
// ## Usage
//
// ```rust,ignore
// use corerad_core::ndp::{RouterAdvertisement, ALL_NODES};
// use corerad_core::traits::TransportFactory;
//
// let transport = factory.open("eth0").await?;
// transport.send(&RouterAdvertisement::default(), ALL_NODES).await?;
//
// let received = transport.receive().await?;
// println!("{} sent {:?}", received.from, received.message);
// ```

use async_trait::async_trait;
use std::net::Ipv6Addr;

use crate::ndp::RouterAdvertisement;

/// A Neighbor Discovery message relevant to routers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// A host asked for an immediate advertisement
    RouterSolicitation,
    /// Another router advertised itself
    RouterAdvertisement(RouterAdvertisement),
}

/// A message received on an interface, with its source address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Received {
    /// Source address of the message
    pub from: Ipv6Addr,
    /// The decoded message
    pub message: Message,
}

/// Trait for per-interface NDP transports
///
/// A transport is opened by a task, used exclusively by that task, and
/// dropped when the task stops. Dropping it must release the underlying
/// socket.
///
/// # Cancel Safety
///
/// `receive` is raced against timers and the shutdown token inside
/// `tokio::select!`. Implementations must not lose a message when a pending
/// `receive` future is dropped before completion.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Name of the interface this transport is bound to
    fn interface(&self) -> &str;

    /// Send a router advertisement to `dst`
    ///
    /// Failures are reported and the advertiser retries on its next cycle.
    async fn send(&self, ra: &RouterAdvertisement, dst: Ipv6Addr) -> crate::Result<()>;

    /// Wait for the next router solicitation or advertisement
    async fn receive(&self) -> crate::Result<Received>;
}

/// Trait for opening transports on named interfaces
#[async_trait]
pub trait TransportFactory: Send + Sync {
    /// Open a transport bound to `interface`
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn Transport>)`: Ready to send and receive
    /// - `Err(Error)`: The interface does not exist or cannot be used
    async fn open(&self, interface: &str) -> crate::Result<Box<dyn Transport>>;
}
