use std::fmt;

use crate::error::Result;
use crate::ndp::{NdpOption, RouterAdvertisement};
use crate::traits::Plugin;

/// MTU plugin
///
/// The value is passed through as configured; range checks belong to
/// configuration validation and the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mtu(pub u32);

impl Plugin for Mtu {
    fn name(&self) -> &'static str {
        "mtu"
    }

    fn apply(&self, mut ra: RouterAdvertisement) -> Result<RouterAdvertisement> {
        ra.options.push(NdpOption::Mtu(self.0));
        Ok(ra)
    }
}

impl fmt::Display for Mtu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MTU: {}", self.0)
    }
}
