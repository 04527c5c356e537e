use std::fmt;
use std::net::Ipv6Addr;

use crate::error::Result;
use crate::ndp::{Lifetime, NdpOption, RecursiveDnsServer, RouterAdvertisement};
use crate::traits::Plugin;

/// Recursive DNS Server plugin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rdnss {
    pub lifetime: Lifetime,
    pub servers: Vec<Ipv6Addr>,
}

impl Plugin for Rdnss {
    fn name(&self) -> &'static str {
        "rdnss"
    }

    fn apply(&self, mut ra: RouterAdvertisement) -> Result<RouterAdvertisement> {
        ra.options.push(NdpOption::RecursiveDnsServer(RecursiveDnsServer {
            lifetime: self.lifetime,
            servers: self.servers.clone(),
        }));

        Ok(ra)
    }
}

impl fmt::Display for Rdnss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let servers: Vec<String> = self.servers.iter().map(|s| s.to_string()).collect();

        write!(
            f,
            "servers: [{}], lifetime: {}",
            servers.join(", "),
            self.lifetime
        )
    }
}
