//! Neighbor Discovery message model
//!
//! These types describe the contents of a Router Advertisement as handed to
//! a [`Transport`](crate::traits::Transport). Wire encoding is the
//! transport's concern; nothing here knows about packet layout.

use serde::Deserialize;
use std::fmt;
use std::net::Ipv6Addr;
use std::str::FromStr;
use std::time::Duration;

use crate::error::Error;

/// The link-local all-nodes multicast group (ff02::1)
pub const ALL_NODES: Ipv6Addr = Ipv6Addr::new(0xff02, 0, 0, 0, 0, 0, 0, 1);

/// A Router Advertisement (RFC 4861 §4.2) and its options
///
/// An advertiser builds one of these from scratch for every cycle and folds
/// its plugins over it; the options are emitted in the order they appear.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouterAdvertisement {
    /// Hop limit hosts should use for outgoing packets (0 = unspecified)
    pub current_hop_limit: u8,
    /// Addresses are available via DHCPv6
    pub managed_configuration: bool,
    /// Other configuration is available via DHCPv6
    pub other_configuration: bool,
    /// Lifetime as a default router (zero = not a default router)
    pub router_lifetime: Duration,
    /// Reachable time (zero = unspecified)
    pub reachable_time: Duration,
    /// Retransmission timer (zero = unspecified)
    pub retransmit_timer: Duration,
    /// Options, in emission order
    pub options: Vec<NdpOption>,
}

/// An option carried inside a Router Advertisement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NdpOption {
    PrefixInformation(PrefixInformation),
    Mtu(u32),
    DnsSearchList(DnsSearchList),
    RecursiveDnsServer(RecursiveDnsServer),
}

impl NdpOption {
    /// Short option name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            NdpOption::PrefixInformation(_) => "prefix information",
            NdpOption::Mtu(_) => "MTU",
            NdpOption::DnsSearchList(_) => "DNS search list",
            NdpOption::RecursiveDnsServer(_) => "recursive DNS server",
        }
    }
}

/// Prefix Information option (RFC 4861 §4.6.2)
///
/// `prefix` never has bits set beyond `prefix_length`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixInformation {
    pub prefix_length: u8,
    pub on_link: bool,
    pub autonomous_address_configuration: bool,
    pub valid_lifetime: Lifetime,
    pub preferred_lifetime: Lifetime,
    pub prefix: Ipv6Addr,
}

/// DNS Search List option (RFC 8106 §5.2)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsSearchList {
    pub lifetime: Lifetime,
    pub domain_names: Vec<String>,
}

/// Recursive DNS Server option (RFC 8106 §5.1)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecursiveDnsServer {
    pub lifetime: Lifetime,
    pub servers: Vec<Ipv6Addr>,
}

/// A lifetime that may be infinite (all-ones on the wire)
///
/// In configuration files a lifetime is either a number of seconds or the
/// string `"infinite"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawLifetime")]
pub enum Lifetime {
    Finite(Duration),
    Infinite,
}

impl Lifetime {
    /// A finite lifetime of `secs` seconds
    pub const fn from_secs(secs: u64) -> Self {
        Lifetime::Finite(Duration::from_secs(secs))
    }
}

impl PartialOrd for Lifetime {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Lifetime {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use std::cmp::Ordering;
        match (self, other) {
            (Lifetime::Infinite, Lifetime::Infinite) => Ordering::Equal,
            (Lifetime::Infinite, Lifetime::Finite(_)) => Ordering::Greater,
            (Lifetime::Finite(_), Lifetime::Infinite) => Ordering::Less,
            (Lifetime::Finite(a), Lifetime::Finite(b)) => a.cmp(b),
        }
    }
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifetime::Infinite => f.write_str("infinite"),
            Lifetime::Finite(d) => f.write_str(&format_duration(*d)),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLifetime {
    Seconds(u64),
    Word(String),
}

impl TryFrom<RawLifetime> for Lifetime {
    type Error = String;

    fn try_from(raw: RawLifetime) -> std::result::Result<Self, Self::Error> {
        match raw {
            RawLifetime::Seconds(secs) => Ok(Lifetime::from_secs(secs)),
            RawLifetime::Word(word) if word == "infinite" => Ok(Lifetime::Infinite),
            RawLifetime::Word(word) => Err(format!(
                "invalid lifetime {:?}: expected seconds or \"infinite\"",
                word
            )),
        }
    }
}

/// An IPv6 network prefix, always stored with host bits cleared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct Ipv6Prefix {
    addr: Ipv6Addr,
    len: u8,
}

impl Ipv6Prefix {
    /// Create a prefix, masking `addr` to `len` bits
    pub fn new(addr: Ipv6Addr, len: u8) -> crate::Result<Self> {
        if len > 128 {
            return Err(Error::config(format!(
                "prefix length {} exceeds 128 bits",
                len
            )));
        }

        Ok(Self {
            addr: mask(addr, len),
            len,
        })
    }

    /// The network address
    pub fn addr(&self) -> Ipv6Addr {
        self.addr
    }

    /// The prefix length in bits
    pub fn prefix_len(&self) -> u8 {
        self.len
    }

    /// `::/N` selects automatic prefix discovery
    pub fn is_unspecified(&self) -> bool {
        self.addr.is_unspecified()
    }
}

impl fmt::Display for Ipv6Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.len)
    }
}

impl FromStr for Ipv6Prefix {
    type Err = Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        let (addr, len) = s
            .split_once('/')
            .ok_or_else(|| Error::config(format!("prefix {:?} is missing a length", s)))?;

        let addr: Ipv6Addr = addr
            .parse()
            .map_err(|_| Error::config(format!("prefix {:?} is not an IPv6 address", s)))?;
        let len: u8 = len
            .parse()
            .map_err(|_| Error::config(format!("prefix {:?} has an invalid length", s)))?;

        Self::new(addr, len)
    }
}

impl TryFrom<String> for Ipv6Prefix {
    type Error = Error;

    fn try_from(s: String) -> crate::Result<Self> {
        s.parse()
    }
}

/// Clear every bit of `addr` beyond the first `len` bits
pub fn mask(addr: Ipv6Addr, len: u8) -> Ipv6Addr {
    let bits = u128::from(addr);
    let mask = match len {
        0 => 0,
        len if len >= 128 => u128::MAX,
        len => u128::MAX << (128 - u32::from(len)),
    };

    Ipv6Addr::from(bits & mask)
}

/// Render a duration the way operators read it in logs: `1h0m0s`, `15m0s`,
/// `30s`, `1.5s`, `500ms`.
pub fn format_duration(d: Duration) -> String {
    if d.is_zero() {
        return "0s".to_string();
    }

    let secs = d.as_secs();
    let nanos = u64::from(d.subsec_nanos());

    if secs == 0 {
        return if nanos >= 1_000_000 {
            format!("{}ms", decimal(nanos, 1_000_000))
        } else if nanos >= 1_000 {
            format!("{}µs", decimal(nanos, 1_000))
        } else {
            format!("{}ns", nanos)
        };
    }

    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{}h", hours));
    }
    if hours > 0 || minutes > 0 {
        out.push_str(&format!("{}m", minutes));
    }
    out.push_str(&format!("{}s", decimal(seconds * 1_000_000_000 + nanos, 1_000_000_000)));

    out
}

/// `value / scale` as a decimal without trailing zeros; `scale` is a power of ten
fn decimal(value: u64, scale: u64) -> String {
    let whole = value / scale;
    let rem = value % scale;
    if rem == 0 {
        return whole.to_string();
    }

    let width = scale.ilog10() as usize;
    let frac = format!("{:0width$}", rem, width = width);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}
