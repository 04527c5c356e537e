// # Plugin Trait
//
// A plugin turns one piece of interface configuration into options on an
// outgoing router advertisement.
//
// ## Implementations
//
// - `plugin::Dnssl`, `plugin::Prefix`, `plugin::Mtu`, `plugin::Rdnss`
//
// ## Usage
//
// ```rust,ignore
// use corerad_core::ndp::RouterAdvertisement;
// use corerad_core::plugin;
//
// let plugins = plugin::from_config(&interface, addrs);
// let ra = plugin::build(&plugins, RouterAdvertisement::default())?;
// ```

use std::fmt;

use crate::ndp::RouterAdvertisement;

/// Trait for advertisement plugins
///
/// `Display` renders a stable, human-readable summary of the plugin's
/// configuration for logs.
///
/// # Contract
///
/// - `apply` is append-only: options already present in the advertisement
///   must be returned untouched and in the same order.
/// - On error nothing may be assumed about the returned advertisement; the
///   caller abandons the whole cycle.
/// - Plugins are immutable; any live data (such as interface addresses) is
///   fetched fresh on every call.
pub trait Plugin: fmt::Display + fmt::Debug + Send + Sync {
    /// Stable identifier used in logs and errors
    fn name(&self) -> &'static str;

    /// Append this plugin's options to `ra`
    fn apply(&self, ra: RouterAdvertisement) -> crate::Result<RouterAdvertisement>;
}
