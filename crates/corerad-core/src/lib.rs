// # corerad-core
//
// Core library for the CoreRAD IPv6 router advertisement daemon.
//
// ## Architecture Overview
//
// - **Server**: Builds tasks from configuration and runs them until shutdown
// - **Task**: One long-running activity (advertiser, monitor, debug HTTP, watcher)
// - **Plugin**: Contributes options to an outgoing router advertisement
// - **Transport**: Trait boundary for putting NDP messages on the wire
// - **AddressSource / LinkStateSource**: Trait boundaries for OS interface state
//
// ## Design Principles
//
// 1. **Core first**: Everything OS-specific lives behind a trait
// 2. **Cooperative shutdown**: One `CancellationToken` reaches every task
// 3. **Isolation**: A failing task is logged and never takes down its siblings
// 4. **Ordered assembly**: Plugins fold in configuration order, all or nothing

pub mod config;
pub mod error;
pub mod ndp;
pub mod plugin;
pub mod server;
pub mod task;
pub mod traits;

// Re-export core types for convenience
pub use config::{Config, DebugConfig, InterfaceConfig, PluginConfig};
pub use error::{Error, Result};
pub use ndp::RouterAdvertisement;
pub use server::{banner, Server};
pub use traits::{AddressSource, LinkStateSource, Plugin, Task, Transport, TransportFactory};
