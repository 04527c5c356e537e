use std::fmt;

use crate::error::Result;
use crate::ndp::{DnsSearchList, Lifetime, NdpOption, RouterAdvertisement};
use crate::traits::Plugin;

/// DNS Search List plugin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dnssl {
    pub lifetime: Lifetime,
    pub domain_names: Vec<String>,
}

impl Plugin for Dnssl {
    fn name(&self) -> &'static str {
        "dnssl"
    }

    fn apply(&self, mut ra: RouterAdvertisement) -> Result<RouterAdvertisement> {
        ra.options.push(NdpOption::DnsSearchList(DnsSearchList {
            lifetime: self.lifetime,
            domain_names: self.domain_names.clone(),
        }));

        Ok(ra)
    }
}

impl fmt::Display for Dnssl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "domain names: [{}], lifetime: {}",
            self.domain_names.join(", "),
            self.lifetime
        )
    }
}
