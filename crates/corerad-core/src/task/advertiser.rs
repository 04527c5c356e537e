//! Router advertisement task
//!
//! ## Schedule
//!
//! ```text
//! start ──▶ RA ──(rand[min,max], ≤16s for the first 3)──▶ RA ──▶ ...
//!                          ▲
//!      RS received ────────┘ pulled in to max(now + rand(0..500ms), last + 3s)
//!
//! cancel ──▶ RA with router lifetime 0 (best effort, 1s) ──▶ Ok(())
//! ```

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::InterfaceConfig;
use crate::error::Result;
use crate::ndp::{NdpOption, RouterAdvertisement, ALL_NODES};
use crate::plugin;
use crate::traits::{Message, Plugin, Received, Task, Transport, TransportFactory};

use super::RECEIVE_RETRY_DELAY;

/// Number of initial advertisements sent with a shortened interval
pub const MAX_INITIAL_RTR_ADVERTISEMENTS: usize = 3;

/// Upper bound on the interval after each initial advertisement
pub const MAX_INITIAL_RTR_ADVERT_INTERVAL: Duration = Duration::from_secs(16);

/// Upper bound on the random delay before answering a solicitation
pub const MAX_RA_DELAY_TIME: Duration = Duration::from_millis(500);

/// Minimum spacing between multicast advertisements
pub const MIN_DELAY_BETWEEN_RAS: Duration = Duration::from_secs(3);

const FINAL_RA_TIMEOUT: Duration = Duration::from_secs(1);

/// Sends router advertisements on one interface
pub struct Advertiser {
    iface: InterfaceConfig,
    plugins: Vec<Box<dyn Plugin>>,
    transports: Arc<dyn TransportFactory>,
}

impl Advertiser {
    pub fn new(
        iface: InterfaceConfig,
        plugins: Vec<Box<dyn Plugin>>,
        transports: Arc<dyn TransportFactory>,
    ) -> Self {
        Self {
            iface,
            plugins,
            transports,
        }
    }

    /// Build one advertisement with the given router lifetime
    pub fn assemble(&self, router_lifetime: Duration) -> Result<RouterAdvertisement> {
        let ra = RouterAdvertisement {
            current_hop_limit: self.iface.hop_limit,
            managed_configuration: self.iface.managed,
            other_configuration: self.iface.other_config,
            router_lifetime,
            reachable_time: self.iface.reachable_time(),
            retransmit_timer: self.iface.retransmit_timer(),
            options: Vec::new(),
        };

        plugin::build(&self.plugins, ra)
    }

    /// Assemble and multicast one advertisement; true if it was sent
    async fn advertise(&self, transport: &dyn Transport, router_lifetime: Duration) -> bool {
        let ra = match self.assemble(router_lifetime) {
            Ok(ra) => ra,
            Err(e) => {
                error!("Skipping advertisement on {}: {}", self.iface.name, e);
                return false;
            }
        };

        match transport.send(&ra, ALL_NODES).await {
            Ok(()) => {
                let kinds: Vec<&str> = ra.options.iter().map(NdpOption::kind).collect();
                debug!(
                    interface = %self.iface.name,
                    options = ?kinds,
                    "Sent router advertisement"
                );
                true
            }
            Err(e) => {
                warn!("Failed to send advertisement on {}: {}", self.iface.name, e);
                false
            }
        }
    }

    /// Random interval before the next unsolicited advertisement, after
    /// `sent` of them have gone out
    fn next_interval(&self, rng: &mut StdRng, sent: usize) -> Duration {
        let min = self.iface.min_interval();
        let max = self.iface.max_interval();

        let interval = if min >= max {
            max
        } else {
            Duration::from_millis(rng.gen_range(min.as_millis() as u64..=max.as_millis() as u64))
        };

        if sent <= MAX_INITIAL_RTR_ADVERTISEMENTS {
            interval.min(MAX_INITIAL_RTR_ADVERT_INTERVAL)
        } else {
            interval
        }
    }

    async fn shutdown(&self, transport: &dyn Transport) {
        match tokio::time::timeout(FINAL_RA_TIMEOUT, self.advertise(transport, Duration::ZERO)).await {
            Ok(true) => info!("Sent final advertisement on {}", self.iface.name),
            Ok(false) => {}
            Err(_) => warn!("Timed out sending final advertisement on {}", self.iface.name),
        }
    }
}

#[async_trait]
impl Task for Advertiser {
    async fn run(&mut self, cancel: CancellationToken) -> Result<()> {
        let transport = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(()),
            transport = self.transports.open(&self.iface.name) => transport?,
        };

        info!(
            "Advertising on {} with {} plugin(s)",
            self.iface.name,
            self.plugins.len()
        );

        let mut rng = StdRng::from_entropy();
        let mut next = Instant::now();
        let mut last_sent: Option<Instant> = None;
        let mut sent = 0;

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep_until(next) => {
                    let advertised = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => break,
                        advertised = self.advertise(&*transport, self.iface.default_lifetime()) => advertised,
                    };
                    if advertised {
                        last_sent = Some(Instant::now());
                    }
                    sent += 1;
                    next = Instant::now() + self.next_interval(&mut rng, sent);
                }
                received = transport.receive() => match received {
                    Ok(Received { from, message: Message::RouterSolicitation }) => {
                        let delay = rng.gen_range(Duration::ZERO..MAX_RA_DELAY_TIME);
                        let mut at = Instant::now() + delay;
                        if let Some(last) = last_sent {
                            at = at.max(last + MIN_DELAY_BETWEEN_RAS);
                        }

                        debug!(interface = %self.iface.name, %from, "Received router solicitation");
                        if at < next {
                            next = at;
                        }
                    }
                    Ok(Received { from, message: Message::RouterAdvertisement(ra) }) => {
                        debug!(
                            interface = %self.iface.name,
                            %from,
                            options = ra.options.len(),
                            "Received router advertisement from another router"
                        );
                    }
                    Err(e) => {
                        warn!("Failed to receive on {}: {}", self.iface.name, e);
                        tokio::select! {
                            biased;
                            _ = cancel.cancelled() => break,
                            _ = tokio::time::sleep(RECEIVE_RETRY_DELAY) => {}
                        }
                    }
                },
            }
        }

        self.shutdown(&*transport).await;
        Ok(())
    }
}

impl fmt::Display for Advertiser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "advertiser {:?}", self.iface.name)
    }
}
