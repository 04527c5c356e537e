// # Task Trait
//
// A task is one independently scheduled, long-running activity of the
// daemon: advertising on an interface, monitoring an interface, serving the
// debug HTTP endpoint, or watching link state.
//
// ## Lifecycle
//
// 1. Built by `Server::build_tasks()` (no I/O)
// 2. `prepare()` is awaited for every task before any of them runs
// 3. `run()` executes on its own tokio task until the token is cancelled
// 4. Resources opened by the task are dropped when `run()` returns

use async_trait::async_trait;
use std::fmt;
use tokio_util::sync::CancellationToken;

/// Trait for server tasks
///
/// `Display` renders the task description used in logs, for example
/// `advertiser "eth0"` or `link state watcher`.
///
/// # Cancellation
///
/// `run` must observe `cancel` at every suspension point and return
/// `Ok(())` promptly once it fires. The server waits for every task without a
/// timeout, so a task that ignores cancellation stalls shutdown.
///
/// # Errors
///
/// Returning an error from `run` is reported by the server and does not stop
/// other tasks. Returning an error from `prepare` aborts startup.
#[async_trait]
pub trait Task: fmt::Display + Send + Sync {
    /// Acquire resources whose failure should prevent the daemon from
    /// starting at all
    async fn prepare(&mut self) -> crate::Result<()> {
        Ok(())
    }

    /// Run until `cancel` fires or an unrecoverable error occurs
    async fn run(&mut self, cancel: CancellationToken) -> crate::Result<()>;
}
