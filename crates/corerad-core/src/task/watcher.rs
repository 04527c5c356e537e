use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::traits::Task;

/// A watch operation: runs until `cancel` fires or returns why it stopped
pub type WatchFn =
    Box<dyn Fn(CancellationToken) -> Pin<Box<dyn Future<Output = Result<()>> + Send>> + Send + Sync>;

/// Task wrapping a caller-supplied watch operation
///
/// The server imposes no timeout: `watch` must return on its own once the
/// token is cancelled.
pub struct WatcherTask {
    description: String,
    watch: WatchFn,
}

impl WatcherTask {
    pub fn new<F, Fut>(description: impl Into<String>, watch: F) -> Self
    where
        F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Self {
            description: description.into(),
            watch: Box::new(move |cancel| Box::pin(watch(cancel))),
        }
    }
}

#[async_trait]
impl Task for WatcherTask {
    async fn run(&mut self, cancel: CancellationToken) -> Result<()> {
        (self.watch)(cancel).await
    }
}

impl fmt::Display for WatcherTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use tokio_test::{assert_ok, assert_pending, assert_ready};

    #[tokio::test]
    async fn test_watcher_returns_on_cancel() {
        let mut task = WatcherTask::new("test watcher", |cancel: CancellationToken| async move {
            cancel.cancelled().await;
            Ok(())
        });
        assert_eq!(task.to_string(), "test watcher");

        let cancel = CancellationToken::new();
        cancel.cancel();
        task.run(cancel).await.unwrap();
    }

    #[test]
    fn test_watcher_pending_until_cancelled() {
        let mut task = WatcherTask::new("test watcher", |cancel: CancellationToken| async move {
            cancel.cancelled().await;
            Ok(())
        });
        let cancel = CancellationToken::new();

        let mut run = tokio_test::task::spawn(task.run(cancel.clone()));
        assert_pending!(run.poll());

        cancel.cancel();
        assert!(run.is_woken());
        assert_ok!(assert_ready!(run.poll()));
    }

    #[tokio::test]
    async fn test_watcher_propagates_error() {
        let mut task = WatcherTask::new("broken watcher", |_cancel| async {
            Err(Error::link_state("no such file or directory"))
        });

        let err = task.run(CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, Error::LinkState(_)));
    }
}
