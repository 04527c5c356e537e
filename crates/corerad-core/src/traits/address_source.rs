// # Address Source Trait
//
// Defines how the automatic prefix plugin learns which addresses are
// currently assigned to an interface.
//
// ## Implementations
//
// - getifaddrs-based (Linux): `corerad-netlink` crate

use std::fmt;
use std::net::IpAddr;

/// One address entry reported for an interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterfaceAddr {
    /// An IP address together with its netmask length
    Ip {
        addr: IpAddr,
        prefix_len: u8,
    },

    /// An entry that is not an address/mask pair (link-layer address,
    /// address without a netmask, unknown family)
    Other(String),
}

impl InterfaceAddr {
    /// Create an IP entry
    pub fn ip(addr: impl Into<IpAddr>, prefix_len: u8) -> Self {
        InterfaceAddr::Ip {
            addr: addr.into(),
            prefix_len,
        }
    }
}

impl fmt::Display for InterfaceAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterfaceAddr::Ip { addr, prefix_len } => write!(f, "{}/{}", addr, prefix_len),
            InterfaceAddr::Other(desc) => f.write_str(desc),
        }
    }
}

/// Trait for interface address enumeration
///
/// Called on every advertisement cycle by automatic prefix plugins, so
/// implementations should return the live state of the interface rather
/// than a cached copy.
pub trait AddressSource: Send + Sync {
    /// List the addresses currently bound to `interface`, in the order the
    /// operating system reports them
    fn addresses(&self, interface: &str) -> crate::Result<Vec<InterfaceAddr>>;
}
