//! Task construction and orchestration
//!
//! ## Lifecycle
//!
//! ```text
//! Config ──build_tasks()──▶ Vec<Box<dyn Task>>
//!                                   │
//!                                   ▼
//!                        serve(cancel, tasks)
//!                                   │
//!          ┌────────────────────────┼────────────────────────┐
//!          ▼                        ▼                        ▼
//!   prepare() task 1   ...   prepare() task N        (first error: abort)
//!          │                        │
//!          ▼                        ▼
//!   spawn run() 1      ...   spawn run() N           (JoinSet)
//!          │                        │
//!          └──────── cancel ────────┘
//!                       │
//!                       ▼
//!             wait for every run() ──▶ Ok(())
//! ```
//!
//! Task failures and panics are logged with the task description and never
//! stop other tasks.

use axum::Router;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn, Instrument};

use crate::config::Config;
use crate::error::Result;
use crate::plugin;
use crate::task::{debug_router, watch_link_state, Advertiser, HttpTask, Monitor, WatcherTask};
use crate::traits::{AddressSource, LinkStateSource, Task, TransportFactory};

/// Version banner shown at startup and by the debug HTTP server
pub fn banner() -> String {
    format!("CoreRAD {} BETA", env!("CARGO_PKG_VERSION"))
}

/// Builds and runs CoreRAD tasks
///
/// The server holds the operating system collaborators handed to tasks;
/// it has no state of its own.
#[derive(Clone)]
pub struct Server {
    transports: Arc<dyn TransportFactory>,
    addrs: Arc<dyn AddressSource>,
    link: Arc<dyn LinkStateSource>,
    debug_handler: Router,
}

impl Server {
    pub fn new(
        transports: Arc<dyn TransportFactory>,
        addrs: Arc<dyn AddressSource>,
        link: Arc<dyn LinkStateSource>,
    ) -> Self {
        Self {
            transports,
            addrs,
            link,
            debug_handler: debug_router(),
        }
    }

    /// Replace the router served by the debug HTTP task
    pub fn with_debug_handler(mut self, handler: Router) -> Self {
        self.debug_handler = handler;
        self
    }

    /// Build the tasks described by `config`
    ///
    /// Per interface, in configuration order: a monitor if `monitor` is set,
    /// then an advertiser if `advertise` is set. Then the debug HTTP server
    /// if an address is configured, and always one link state watcher.
    ///
    /// No I/O is performed; `config` is assumed to be validated.
    pub fn build_tasks(&self, config: &Config) -> Vec<Box<dyn Task>> {
        let mut tasks: Vec<Box<dyn Task>> = Vec::new();
        let mut watched = Vec::new();

        for iface in &config.interfaces {
            if iface.monitor {
                tasks.push(Box::new(Monitor::new(
                    iface.name.clone(),
                    Arc::clone(&self.transports),
                )));
            }

            if iface.advertise {
                tasks.push(Box::new(Advertiser::new(
                    iface.clone(),
                    plugin::from_config(iface, &self.addrs),
                    Arc::clone(&self.transports),
                )));
            }

            if iface.monitor || iface.advertise {
                watched.push(iface.name.clone());
            }
        }

        if !config.debug.address.is_empty() {
            tasks.push(Box::new(HttpTask::new(
                config.debug.address.clone(),
                self.debug_handler.clone(),
            )));
        }

        let link = Arc::clone(&self.link);
        tasks.push(Box::new(WatcherTask::new("link state watcher", move |cancel| {
            watch_link_state(Arc::clone(&link), watched.clone(), cancel)
        })));

        tasks
    }

    /// Run `tasks` until `cancel` fires and all of them have returned
    ///
    /// Every task is prepared, in order, before any is spawned; the first
    /// preparation failure is returned and nothing runs. After that, errors
    /// are only logged and the result is `Ok(())`, which is never returned
    /// before `cancel` fires even if every task has already exited.
    pub async fn serve(&self, cancel: CancellationToken, mut tasks: Vec<Box<dyn Task>>) -> Result<()> {
        for task in tasks.iter_mut() {
            task.prepare().await?;
        }

        info!("Starting {} task(s)", tasks.len());

        let mut set = JoinSet::new();
        let mut descriptions = HashMap::new();
        for mut task in tasks {
            let description = task.to_string();
            let cancel = cancel.clone();
            let span = tracing::info_span!("task", task = %description);

            let handle = set.spawn(
                async move {
                    info!("Task started");
                    task.run(cancel).await
                }
                .instrument(span),
            );
            descriptions.insert(handle.id(), description);
        }

        while let Some(joined) = set.join_next_with_id().await {
            let id = match &joined {
                Ok((id, _)) => *id,
                Err(e) => e.id(),
            };
            let description = descriptions.remove(&id).unwrap_or_default();

            match joined {
                Ok((_, Ok(()))) => info!("{} stopped", description),
                Ok((_, Err(e))) => error!("{} failed: {}", description, e),
                Err(e) if e.is_panic() => error!("{} panicked", description),
                Err(e) => error!("{} was aborted: {}", description, e),
            }
        }

        if !cancel.is_cancelled() {
            warn!("All tasks stopped before shutdown was requested");
            cancel.cancelled().await;
        }

        info!("All tasks stopped");
        Ok(())
    }
}
