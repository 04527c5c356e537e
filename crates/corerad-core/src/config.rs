//! Configuration types for CoreRAD
//!
//! Configuration is read once from a TOML file, validated, and then treated as
//! immutable. Plugins are a `type`-tagged list so that the order in the file
//! is the order options appear in advertisements.
//!
//! ```toml
//! [debug]
//! address = ":9430"
//!
//! [[interfaces]]
//! name = "eth0"
//! advertise = true
//! max_interval_secs = 600
//!
//!   [[interfaces.plugins]]
//!   type = "prefix"
//!   prefix = "::/64"
//!   valid_lifetime = "infinite"
//!
//!   [[interfaces.plugins]]
//!   type = "rdnss"
//!   servers = ["2001:db8::53"]
//!
//! [[interfaces]]
//! name = "eth1"
//! monitor = true
//! ```

use serde::Deserialize;
use std::collections::HashSet;
use std::net::Ipv6Addr;
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::ndp::{Ipv6Prefix, Lifetime};

/// Main CoreRAD configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Interfaces to advertise on or monitor, in task order
    #[serde(default)]
    pub interfaces: Vec<InterfaceConfig>,

    /// Debug HTTP server settings
    #[serde(default)]
    pub debug: DebugConfig,
}

impl Config {
    /// Parse and validate a TOML document
    pub fn from_toml(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("failed to read {}: {}", path.display(), e))
        })?;

        Self::from_toml(&contents)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for iface in &self.interfaces {
            iface.validate()?;

            if !seen.insert(iface.name.as_str()) {
                return Err(Error::config(format!(
                    "interface {:?} is configured more than once",
                    iface.name
                )));
            }
        }

        Ok(())
    }
}

/// Debug HTTP server configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DebugConfig {
    /// Listen address such as `":9430"` or `"[::1]:9430"`; empty disables
    /// the server
    #[serde(default)]
    pub address: String,
}

/// Per-interface configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InterfaceConfig {
    /// Interface name (e.g., "eth0")
    pub name: String,

    /// Passively log advertisements from other routers
    #[serde(default)]
    pub monitor: bool,

    /// Send router advertisements
    #[serde(default)]
    pub advertise: bool,

    /// Maximum time between unsolicited advertisements (4..=1800 seconds)
    #[serde(default = "default_max_interval_secs")]
    pub max_interval_secs: u64,

    /// Minimum time between unsolicited advertisements
    ///
    /// Defaults to a third of `max_interval_secs` when that is at least 9
    /// seconds, otherwise to `max_interval_secs`.
    #[serde(default)]
    pub min_interval_secs: Option<u64>,

    /// Current hop limit advertised to hosts (0 = unspecified)
    #[serde(default = "default_hop_limit")]
    pub hop_limit: u8,

    /// Managed address configuration flag
    #[serde(default)]
    pub managed: bool,

    /// Other configuration flag
    #[serde(default)]
    pub other_config: bool,

    /// Router lifetime; defaults to three times `max_interval_secs`
    #[serde(default)]
    pub default_lifetime_secs: Option<u64>,

    /// Reachable time in milliseconds (0 = unspecified)
    #[serde(default)]
    pub reachable_time_ms: u32,

    /// Retransmission timer in milliseconds (0 = unspecified)
    #[serde(default)]
    pub retransmit_timer_ms: u32,

    /// Advertisement plugins, in emission order
    #[serde(default)]
    pub plugins: Vec<PluginConfig>,
}

impl InterfaceConfig {
    /// Create an interface configuration with default settings
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            monitor: false,
            advertise: false,
            max_interval_secs: default_max_interval_secs(),
            min_interval_secs: None,
            hop_limit: default_hop_limit(),
            managed: false,
            other_config: false,
            default_lifetime_secs: None,
            reachable_time_ms: 0,
            retransmit_timer_ms: 0,
            plugins: Vec::new(),
        }
    }

    /// Enable or disable monitoring
    pub fn with_monitor(mut self, monitor: bool) -> Self {
        self.monitor = monitor;
        self
    }

    /// Enable or disable advertising
    pub fn with_advertise(mut self, advertise: bool) -> Self {
        self.advertise = advertise;
        self
    }

    /// Set the advertisement interval bounds
    pub fn with_intervals(mut self, min_secs: u64, max_secs: u64) -> Self {
        self.min_interval_secs = Some(min_secs);
        self.max_interval_secs = max_secs;
        self
    }

    /// Append a plugin
    pub fn with_plugin(mut self, plugin: PluginConfig) -> Self {
        self.plugins.push(plugin);
        self
    }

    pub fn max_interval(&self) -> Duration {
        Duration::from_secs(self.max_interval_secs)
    }

    pub fn min_interval(&self) -> Duration {
        Duration::from_secs(self.resolved_min_interval_secs())
    }

    pub fn default_lifetime(&self) -> Duration {
        Duration::from_secs(
            self.default_lifetime_secs
                .unwrap_or(self.max_interval_secs * 3),
        )
    }

    pub fn reachable_time(&self) -> Duration {
        Duration::from_millis(u64::from(self.reachable_time_ms))
    }

    pub fn retransmit_timer(&self) -> Duration {
        Duration::from_millis(u64::from(self.retransmit_timer_ms))
    }

    fn resolved_min_interval_secs(&self) -> u64 {
        self.min_interval_secs.unwrap_or(if self.max_interval_secs >= 9 {
            self.max_interval_secs / 3
        } else {
            self.max_interval_secs
        })
    }

    /// Validate the interface configuration (RFC 4861 §6.2.1 ranges)
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::config("interface name cannot be empty"));
        }

        let max = self.max_interval_secs;
        if !(4..=1800).contains(&max) {
            return Err(self.invalid(format!(
                "max_interval_secs must be between 4 and 1800, got {}",
                max
            )));
        }

        let min = self.resolved_min_interval_secs();
        if min < 3 || min > max * 3 / 4 {
            return Err(self.invalid(format!(
                "min_interval_secs must be between 3 and 0.75 * max_interval_secs ({}), got {}",
                max * 3 / 4,
                min
            )));
        }

        if let Some(lifetime) = self.default_lifetime_secs
            && lifetime != 0
            && !(max..=9000).contains(&lifetime)
        {
            return Err(self.invalid(format!(
                "default_lifetime_secs must be 0 or between max_interval_secs ({}) and 9000, got {}",
                max, lifetime
            )));
        }

        if self.reachable_time_ms > 3_600_000 {
            return Err(self.invalid(format!(
                "reachable_time_ms must be at most 3600000, got {}",
                self.reachable_time_ms
            )));
        }

        for plugin in &self.plugins {
            plugin.validate().map_err(|e| self.invalid(e))?;
        }

        Ok(())
    }

    fn invalid(&self, msg: impl std::fmt::Display) -> Error {
        Error::config(format!("interface {:?}: {}", self.name, msg))
    }
}

/// Configuration for one advertisement plugin
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PluginConfig {
    /// Prefix Information; `::/N` advertises every /N on the interface
    Prefix {
        prefix: Ipv6Prefix,
        #[serde(default = "default_true")]
        on_link: bool,
        #[serde(default = "default_true")]
        autonomous: bool,
        #[serde(default = "default_preferred_lifetime")]
        preferred_lifetime: Lifetime,
        #[serde(default = "default_valid_lifetime")]
        valid_lifetime: Lifetime,
    },

    /// Recursive DNS Servers; lifetime defaults to 3 * max_interval
    Rdnss {
        servers: Vec<Ipv6Addr>,
        #[serde(default)]
        lifetime: Option<Lifetime>,
    },

    /// DNS Search List; lifetime defaults to 3 * max_interval
    Dnssl {
        domain_names: Vec<String>,
        #[serde(default)]
        lifetime: Option<Lifetime>,
    },

    /// Link MTU
    Mtu { mtu: u32 },
}

impl PluginConfig {
    /// A prefix plugin with default flags and lifetimes
    pub fn prefix(prefix: Ipv6Prefix) -> Self {
        PluginConfig::Prefix {
            prefix,
            on_link: true,
            autonomous: true,
            preferred_lifetime: default_preferred_lifetime(),
            valid_lifetime: default_valid_lifetime(),
        }
    }

    fn validate(&self) -> std::result::Result<(), String> {
        match self {
            PluginConfig::Prefix {
                prefix,
                preferred_lifetime,
                valid_lifetime,
                ..
            } => {
                if preferred_lifetime > valid_lifetime {
                    return Err(format!(
                        "prefix {}: preferred lifetime {} exceeds valid lifetime {}",
                        prefix, preferred_lifetime, valid_lifetime
                    ));
                }
                Ok(())
            }
            PluginConfig::Rdnss { servers, .. } => {
                if servers.is_empty() {
                    return Err("rdnss: at least one server is required".to_string());
                }
                Ok(())
            }
            PluginConfig::Dnssl { domain_names, .. } => {
                if domain_names.is_empty() {
                    return Err("dnssl: at least one domain name is required".to_string());
                }
                if let Some(name) = domain_names.iter().find(|n| n.is_empty()) {
                    return Err(format!("dnssl: invalid domain name {:?}", name));
                }
                Ok(())
            }
            PluginConfig::Mtu { mtu } => {
                if !(1280..=65535).contains(mtu) {
                    return Err(format!("mtu must be between 1280 and 65535, got {}", mtu));
                }
                Ok(())
            }
        }
    }
}

fn default_max_interval_secs() -> u64 {
    600
}

fn default_hop_limit() -> u8 {
    64
}

fn default_true() -> bool {
    true
}

fn default_preferred_lifetime() -> Lifetime {
    Lifetime::from_secs(4 * 60 * 60)
}

fn default_valid_lifetime() -> Lifetime {
    Lifetime::from_secs(24 * 60 * 60)
}
