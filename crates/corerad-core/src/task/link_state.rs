use std::collections::HashMap;
use std::sync::Arc;
use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::traits::{LinkEventKind, LinkStateSource};

/// Watch link state for `interfaces` until `cancel` fires
///
/// Up/Down transitions of watched interfaces are logged once per change.
/// Returns an error if a watched interface disappears or the event stream
/// stops, since every task bound to that interface is now useless.
pub async fn watch_link_state(
    source: Arc<dyn LinkStateSource>,
    interfaces: Vec<String>,
    cancel: CancellationToken,
) -> Result<()> {
    let mut events = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Ok(()),
        events = source.subscribe() => events?,
    };

    let mut states: HashMap<String, Option<LinkEventKind>> =
        interfaces.into_iter().map(|name| (name, None)).collect();

    debug!("Watching link state for {} interface(s)", states.len());

    loop {
        let event = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(()),
            event = events.next() => event,
        };

        let event = match event {
            Some(Ok(event)) => event,
            Some(Err(e)) => return Err(Error::link_state(format!("link state stream failed: {}", e))),
            None => return Err(Error::link_state("link state stream ended")),
        };

        let Some(state) = states.get_mut(&event.interface) else {
            continue;
        };

        match event.kind {
            LinkEventKind::Removed => {
                return Err(Error::link_state(format!(
                    "interface {:?} was removed",
                    event.interface
                )));
            }
            kind if *state == Some(kind) => {}
            LinkEventKind::Up => {
                *state = Some(LinkEventKind::Up);
                info!(interface = %event.interface, "Link is up");
            }
            LinkEventKind::Down => {
                *state = Some(LinkEventKind::Down);
                warn!(interface = %event.interface, "Link is down");
            }
        }
    }
}
