//! Prefix Information plugin
//!
//! A prefix plugin runs in one of two modes:
//!
//! - **static**: advertises exactly the configured prefix
//! - **automatic**: configured as `::/N`, advertises every distinct /N
//!   network found on the interface at the time of each advertisement
//!
//! Automatic mode enumerates addresses on every `apply`, so addresses added
//! or removed at runtime show up in the next advertisement without a restart.

use std::collections::HashSet;
use std::fmt;
use std::net::{IpAddr, Ipv6Addr};
use std::sync::Arc;

use crate::error::Result;
use crate::ndp::{self, Ipv6Prefix, Lifetime, NdpOption, PrefixInformation, RouterAdvertisement};
use crate::traits::{InterfaceAddr, Plugin};

/// Callback returning the addresses currently bound to an interface
pub type AddrsFn = Arc<dyn Fn() -> Result<Vec<InterfaceAddr>> + Send + Sync>;

/// Prefix Information plugin
#[derive(Clone)]
pub struct Prefix {
    /// The advertised prefix, or `::/N` for automatic mode
    pub prefix: Ipv6Prefix,
    pub on_link: bool,
    pub autonomous: bool,
    pub preferred_lifetime: Lifetime,
    pub valid_lifetime: Lifetime,

    /// Address enumeration for automatic mode; `None` means static mode
    pub addrs: Option<AddrsFn>,
}

impl Prefix {
    /// Switch this plugin to automatic mode using `addrs`
    pub fn with_addrs(mut self, addrs: AddrsFn) -> Self {
        self.addrs = Some(addrs);
        self
    }

    fn option(&self, network: Ipv6Addr) -> NdpOption {
        NdpOption::PrefixInformation(PrefixInformation {
            prefix_length: self.prefix.prefix_len(),
            on_link: self.on_link,
            autonomous_address_configuration: self.autonomous,
            valid_lifetime: self.valid_lifetime,
            preferred_lifetime: self.preferred_lifetime,
            prefix: network,
        })
    }

    /// Distinct networks of the configured length found in `addrs`, in
    /// enumeration order
    fn discover(&self, addrs: Vec<InterfaceAddr>) -> Vec<Ipv6Addr> {
        let len = self.prefix.prefix_len();
        let mut seen = HashSet::new();

        addrs
            .into_iter()
            .filter_map(|addr| match addr {
                InterfaceAddr::Ip {
                    addr: IpAddr::V6(ip),
                    prefix_len,
                } if prefix_len == len && !ip.is_unicast_link_local() => Some(ndp::mask(ip, len)),
                _ => None,
            })
            .filter(|network| seen.insert(*network))
            .collect()
    }
}

impl Plugin for Prefix {
    fn name(&self) -> &'static str {
        "prefix"
    }

    fn apply(&self, mut ra: RouterAdvertisement) -> Result<RouterAdvertisement> {
        let Some(addrs) = &self.addrs else {
            ra.options.push(self.option(self.prefix.addr()));
            return Ok(ra);
        };

        let networks = self.discover(addrs()?);
        ra.options
            .extend(networks.into_iter().map(|network| self.option(network)));

        Ok(ra)
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut flags = Vec::new();
        if self.on_link {
            flags.push("on-link");
        }
        if self.autonomous {
            flags.push("autonomous");
        }

        write!(
            f,
            "{} [{}], preferred: {}, valid: {}",
            self.prefix,
            flags.join(", "),
            self.preferred_lifetime,
            self.valid_lifetime
        )
    }
}

impl fmt::Debug for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Prefix")
            .field("prefix", &self.prefix)
            .field("on_link", &self.on_link)
            .field("autonomous", &self.autonomous)
            .field("preferred_lifetime", &self.preferred_lifetime)
            .field("valid_lifetime", &self.valid_lifetime)
            .field("automatic", &self.addrs.is_some())
            .finish()
    }
}
