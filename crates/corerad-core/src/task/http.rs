use async_trait::async_trait;
use axum::routing::get;
use axum::Router;
use std::fmt;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::error::{Error, Result};
use crate::traits::Task;

/// Default diagnostics router: `GET /` returns the version banner and
/// `GET /healthz` returns `OK`
pub fn debug_router() -> Router {
    Router::new()
        .route("/", get(|| async { format!("{}\n", crate::server::banner()) }))
        .route("/healthz", get(|| async { "OK\n" }))
}

/// Debug HTTP server task
///
/// The listener is bound in [`Task::prepare`] so that an unusable address
/// stops the daemon before anything else starts.
pub struct HttpTask {
    addr: String,
    handler: Router,
    listener: Option<TcpListener>,
}

impl HttpTask {
    pub fn new(addr: impl Into<String>, handler: Router) -> Self {
        Self {
            addr: addr.into(),
            handler,
            listener: None,
        }
    }

    /// Address the listener is bound to, once prepared
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().and_then(|l| l.local_addr().ok())
    }

    /// `:port` means every address on `port`
    fn bind_addr(&self) -> String {
        match self.addr.strip_prefix(':') {
            Some(port) => format!("[::]:{}", port),
            None => self.addr.clone(),
        }
    }
}

#[async_trait]
impl Task for HttpTask {
    async fn prepare(&mut self) -> Result<()> {
        if self.listener.is_some() {
            return Ok(());
        }

        let listener = TcpListener::bind(self.bind_addr())
            .await
            .map_err(|e| Error::task(self.to_string(), format!("failed to listen: {}", e)))?;

        self.listener = Some(listener);
        Ok(())
    }

    async fn run(&mut self, cancel: CancellationToken) -> Result<()> {
        self.prepare().await?;
        let Some(listener) = self.listener.take() else {
            return Err(Error::task(self.to_string(), "listener not bound"));
        };

        if let Ok(addr) = listener.local_addr() {
            info!("Serving debug HTTP on {}", addr);
        }

        axum::serve(listener, self.handler.clone())
            .with_graceful_shutdown(async move { cancel.cancelled().await })
            .await
            .map_err(|e| Error::task(self.to_string(), e.to_string()))
    }
}

impl fmt::Display for HttpTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "debug HTTP server {:?}", self.addr)
    }
}
