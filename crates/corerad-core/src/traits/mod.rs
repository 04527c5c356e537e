//! Core traits for CoreRAD
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`Plugin`]: Contribute options to an outgoing router advertisement
//! - [`Task`]: A long-running unit of daemon behavior run by the server
//! - [`Transport`]: Send and receive NDP messages on one interface
//! - [`AddressSource`]: Enumerate the addresses bound to an interface
//! - [`LinkStateSource`]: Stream link up/down/removal events

pub mod plugin;
pub mod task;
pub mod transport;
pub mod address_source;
pub mod link_state;

pub use plugin::Plugin;
pub use task::Task;
pub use transport::{Message, Received, Transport, TransportFactory};
pub use address_source::{AddressSource, InterfaceAddr};
pub use link_state::{LinkEvent, LinkEventKind, LinkEventStream, LinkStateSource};
