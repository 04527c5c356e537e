//! Transport that logs advertisements instead of transmitting them
//!
//! Raw ICMPv6 framing is not part of this daemon, so every interface gets a
//! dry-run transport: outgoing advertisements are rendered to the log and no
//! solicitations ever arrive.

use async_trait::async_trait;
use corerad_core::ndp::{format_duration, NdpOption, RouterAdvertisement};
use corerad_core::traits::{Received, Transport, TransportFactory};
use corerad_core::Result;
use std::net::Ipv6Addr;
use tracing::info;

pub struct DryRunTransports;

#[async_trait]
impl TransportFactory for DryRunTransports {
    async fn open(&self, interface: &str) -> Result<Box<dyn Transport>> {
        Ok(Box::new(DryRunTransport {
            interface: interface.to_string(),
        }))
    }
}

struct DryRunTransport {
    interface: String,
}

#[async_trait]
impl Transport for DryRunTransport {
    fn interface(&self) -> &str {
        &self.interface
    }

    async fn send(&self, ra: &RouterAdvertisement, dst: Ipv6Addr) -> Result<()> {
        let options: Vec<String> = ra.options.iter().map(describe).collect();

        info!(
            interface = %self.interface,
            %dst,
            hop_limit = ra.current_hop_limit,
            router_lifetime = %format_duration(ra.router_lifetime),
            "Router advertisement [{}]",
            options.join("; ")
        );
        Ok(())
    }

    async fn receive(&self) -> Result<Received> {
        std::future::pending().await
    }
}

fn describe(option: &NdpOption) -> String {
    match option {
        NdpOption::PrefixInformation(pi) => format!(
            "prefix {}/{} preferred {} valid {}",
            pi.prefix, pi.prefix_length, pi.preferred_lifetime, pi.valid_lifetime
        ),
        NdpOption::Mtu(mtu) => format!("mtu {}", mtu),
        NdpOption::DnsSearchList(dnssl) => {
            format!("dnssl [{}] {}", dnssl.domain_names.join(", "), dnssl.lifetime)
        }
        NdpOption::RecursiveDnsServer(rdnss) => {
            let servers: Vec<String> = rdnss.servers.iter().map(|s| s.to_string()).collect();
            format!("rdnss [{}] {}", servers.join(", "), rdnss.lifetime)
        }
    }
}
