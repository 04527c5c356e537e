//! Advertisement plugins and the assembler that folds them
//!
//! ## Assembly
//!
//! ```text
//! RouterAdvertisement::default()
//!         │
//!         ▼
//!   ┌──────────┐   ┌──────────┐   ┌──────────┐
//!   │ plugin 1 │──▶│ plugin 2 │──▶│ plugin N │──▶ complete advertisement
//!   └──────────┘   └──────────┘   └──────────┘
//!         │              │              │
//!         └──────────────┴──────────────┴──▶ first error aborts the cycle
//! ```
//!
//! Plugins run in configuration order, so every option contributed by an
//! earlier plugin precedes every option contributed by a later one.

mod dnssl;
mod mtu;
mod prefix;
mod rdnss;

pub use dnssl::Dnssl;
pub use mtu::Mtu;
pub use prefix::{AddrsFn, Prefix};
pub use rdnss::Rdnss;

use std::sync::Arc;

use crate::config::{InterfaceConfig, PluginConfig};
use crate::error::{Error, Result};
use crate::ndp::{Lifetime, RouterAdvertisement};
use crate::traits::{AddressSource, Plugin};

/// Fold `plugins` over `ra` in order
///
/// The first failing plugin aborts the fold; its error is returned tagged
/// with the plugin name and no partial advertisement escapes. An empty
/// plugin list returns `ra` unchanged.
pub fn build(plugins: &[Box<dyn Plugin>], ra: RouterAdvertisement) -> Result<RouterAdvertisement> {
    plugins.iter().try_fold(ra, |ra, plugin| {
        plugin
            .apply(ra)
            .map_err(|e| Error::plugin(plugin.name(), e.to_string()))
    })
}

/// Build the plugins configured for `iface`
///
/// No I/O happens here: automatic prefixes capture `addrs` and the interface
/// name, and enumerate addresses only when applied.
pub fn from_config(iface: &InterfaceConfig, addrs: &Arc<dyn AddressSource>) -> Vec<Box<dyn Plugin>> {
    let dns_lifetime = Lifetime::Finite(iface.max_interval() * 3);

    iface
        .plugins
        .iter()
        .map(|config| -> Box<dyn Plugin> {
            match config {
                PluginConfig::Prefix {
                    prefix,
                    on_link,
                    autonomous,
                    preferred_lifetime,
                    valid_lifetime,
                } => {
                    let plugin = Prefix {
                        prefix: *prefix,
                        on_link: *on_link,
                        autonomous: *autonomous,
                        preferred_lifetime: *preferred_lifetime,
                        valid_lifetime: *valid_lifetime,
                        addrs: None,
                    };

                    if prefix.is_unspecified() {
                        let source = Arc::clone(addrs);
                        let name = iface.name.clone();
                        Box::new(plugin.with_addrs(Arc::new(move || source.addresses(&name))))
                    } else {
                        Box::new(plugin)
                    }
                }
                PluginConfig::Rdnss { servers, lifetime } => Box::new(Rdnss {
                    lifetime: lifetime.unwrap_or(dns_lifetime),
                    servers: servers.clone(),
                }),
                PluginConfig::Dnssl {
                    domain_names,
                    lifetime,
                } => Box::new(Dnssl {
                    lifetime: lifetime.unwrap_or(dns_lifetime),
                    domain_names: domain_names.clone(),
                }),
                PluginConfig::Mtu { mtu } => Box::new(Mtu(*mtu)),
            }
        })
        .collect()
}
