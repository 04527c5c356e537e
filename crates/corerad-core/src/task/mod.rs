//! Task implementations run by [`Server::serve`](crate::server::Server::serve)
//!
//! | Task            | Description                  | Resources            |
//! |-----------------|------------------------------|----------------------|
//! | [`Advertiser`]  | `advertiser "<iface>"`       | interface transport  |
//! | [`Monitor`]     | `monitor "<iface>"`          | interface transport  |
//! | [`HttpTask`]    | `debug HTTP server "<addr>"` | TCP listener         |
//! | [`WatcherTask`] | caller supplied              | whatever it opens    |
//!
//! The link-state watcher built by the server is a [`WatcherTask`] running
//! [`watch_link_state`].

mod advertiser;
mod http;
mod link_state;
mod monitor;
mod watcher;

pub use advertiser::{
    Advertiser, MAX_INITIAL_RTR_ADVERT_INTERVAL, MAX_INITIAL_RTR_ADVERTISEMENTS, MAX_RA_DELAY_TIME,
    MIN_DELAY_BETWEEN_RAS,
};
pub use http::{debug_router, HttpTask};
pub use link_state::watch_link_state;
pub use monitor::Monitor;
pub use watcher::{WatchFn, WatcherTask};

use std::time::Duration;

/// How long advertisers and monitors wait after a failed receive
pub const RECEIVE_RETRY_DELAY: Duration = Duration::from_secs(1);
