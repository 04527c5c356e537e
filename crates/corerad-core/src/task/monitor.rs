use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::ndp::format_duration;
use crate::traits::{Message, Received, Task, TransportFactory};

use super::RECEIVE_RETRY_DELAY;

/// Passively logs router advertisements seen on an interface
pub struct Monitor {
    interface: String,
    transports: Arc<dyn TransportFactory>,
}

impl Monitor {
    pub fn new(interface: impl Into<String>, transports: Arc<dyn TransportFactory>) -> Self {
        Self {
            interface: interface.into(),
            transports,
        }
    }

    fn log(&self, received: Received) {
        match received.message {
            Message::RouterAdvertisement(ra) => {
                info!(
                    interface = %self.interface,
                    from = %received.from,
                    hop_limit = ra.current_hop_limit,
                    router_lifetime = %format_duration(ra.router_lifetime),
                    managed = ra.managed_configuration,
                    other = ra.other_configuration,
                    options = ra.options.len(),
                    "Received router advertisement"
                );
            }
            Message::RouterSolicitation => {
                debug!(interface = %self.interface, from = %received.from, "Received router solicitation");
            }
        }
    }
}

#[async_trait]
impl Task for Monitor {
    async fn run(&mut self, cancel: CancellationToken) -> Result<()> {
        let transport = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(()),
            transport = self.transports.open(&self.interface) => transport?,
        };

        info!("Monitoring router advertisements on {}", self.interface);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(()),
                received = transport.receive() => match received {
                    Ok(received) => self.log(received),
                    Err(e) => {
                        warn!("Failed to receive on {}: {}", self.interface, e);
                        tokio::select! {
                            biased;
                            _ = cancel.cancelled() => return Ok(()),
                            _ = tokio::time::sleep(RECEIVE_RETRY_DELAY) => {}
                        }
                    }
                },
            }
        }
    }
}

impl fmt::Display for Monitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "monitor {:?}", self.interface)
    }
}
