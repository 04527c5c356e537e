// # corerad - IPv6 Router Advertisement Daemon
//
// This binary is a thin integration layer: it reads settings from the
// environment, loads the TOML configuration, wires the Linux interface
// sources into a `corerad_core::Server` and runs it until SIGTERM/SIGINT.
// All advertisement logic lives in corerad-core.
//
// ## Configuration
//
// ### Environment
// - `CORERAD_CONFIG`: Path to the TOML configuration file (default: corerad.toml)
// - `CORERAD_LOG_LEVEL`: trace, debug, info, warn or error (default: info)
// - `CORERAD_SHUTDOWN_TIMEOUT_SECS`: Grace period for tasks to stop after a
//   signal, 1..=300 (default: 30)
//
// ## Example
//
// ```bash
// export CORERAD_CONFIG=/etc/corerad/corerad.toml
// export CORERAD_LOG_LEVEL=debug
//
// corerad
// ```

mod dry_run;

use anyhow::Result;
use corerad_core::{Config, Server};
use corerad_netlink::{NetlinkAddressSource, NetlinkLinkStateSource};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

use dry_run::DryRunTransports;

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CoreradExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<CoreradExitCode> for ExitCode {
    fn from(code: CoreradExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Daemon settings from the environment
#[derive(Debug)]
struct Settings {
    config_path: PathBuf,
    log_level: String,
    shutdown_timeout_secs: u64,
}

impl Settings {
    /// Load settings from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let shutdown_timeout_secs = match lookup("CORERAD_SHUTDOWN_TIMEOUT_SECS") {
            Some(s) => s.parse().map_err(|_| {
                anyhow::anyhow!(
                    "CORERAD_SHUTDOWN_TIMEOUT_SECS must be a number of seconds. Got: {}",
                    s
                )
            })?,
            None => 30,
        };

        Ok(Self {
            config_path: lookup("CORERAD_CONFIG")
                .unwrap_or_else(|| "corerad.toml".to_string())
                .into(),
            log_level: lookup("CORERAD_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            shutdown_timeout_secs,
        })
    }

    /// Validate the settings
    fn validate(&self) -> Result<()> {
        if self.config_path.as_os_str().is_empty() {
            anyhow::bail!("CORERAD_CONFIG cannot be empty");
        }

        if !(1..=300).contains(&self.shutdown_timeout_secs) {
            anyhow::bail!(
                "CORERAD_SHUTDOWN_TIMEOUT_SECS must be between 1 and 300 seconds. Got: {}",
                self.shutdown_timeout_secs
            );
        }

        self.level()?;
        Ok(())
    }

    fn level(&self) -> Result<Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            _ => anyhow::bail!(
                "CORERAD_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }
    }

    fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

fn main() -> ExitCode {
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return CoreradExitCode::ConfigError.into();
        }
    };

    if let Err(e) = settings.validate() {
        eprintln!("Configuration validation error: {}", e);
        return CoreradExitCode::ConfigError.into();
    }

    let log_level = settings.level().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return CoreradExitCode::ConfigError.into();
    }

    info!("{}", corerad_core::banner());

    let config = match Config::load(&settings.config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return CoreradExitCode::ConfigError.into();
        }
    };

    info!(
        "Configuration loaded from {}: {} interface(s)",
        settings.config_path.display(),
        config.interfaces.len()
    );

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return CoreradExitCode::RuntimeError.into();
        }
    };

    rt.block_on(run_daemon(settings, config)).into()
}

/// Run the server until a shutdown signal and report how it ended
async fn run_daemon(settings: Settings, config: Config) -> CoreradExitCode {
    let server = Server::new(
        Arc::new(DryRunTransports),
        Arc::new(NetlinkAddressSource::new()),
        Arc::new(NetlinkLinkStateSource::new()),
    );

    let tasks = server.build_tasks(&config);
    for task in &tasks {
        info!("Configured task: {}", task);
    }

    let cancel = CancellationToken::new();
    let mut serving = {
        let cancel = cancel.clone();
        tokio::spawn(async move { server.serve(cancel, tasks).await })
    };

    // Nothing has cancelled serve yet, so any return here is abnormal.
    let signal = tokio::select! {
        result = &mut serving => return early_exit_code(result),
        signal = wait_for_shutdown_signal() => signal,
    };

    match signal {
        Ok(signal) => info!("Received shutdown signal: {}", signal),
        Err(e) => error!("Shutdown error: {}", e),
    }

    info!("Shutting down daemon");
    cancel.cancel();

    match tokio::time::timeout(settings.shutdown_timeout(), serving).await {
        Ok(Ok(Ok(()))) => {
            info!("Daemon stopped");
            CoreradExitCode::CleanShutdown
        }
        Ok(Ok(Err(e))) => {
            error!("Daemon error: {}", e);
            CoreradExitCode::RuntimeError
        }
        Ok(Err(e)) => {
            error!("Server task failed: {}", e);
            CoreradExitCode::RuntimeError
        }
        Err(_) => {
            error!("Shutdown timeout after {:?}", settings.shutdown_timeout());
            CoreradExitCode::RuntimeError
        }
    }
}

/// Exit code for a serve that returned before any shutdown signal
///
/// A preparation failure is a startup error; anything else means serve
/// stopped on its own, which only happens when something is broken.
fn early_exit_code(
    result: std::result::Result<corerad_core::Result<()>, tokio::task::JoinError>,
) -> CoreradExitCode {
    match result {
        Ok(Ok(())) => {
            error!("Server stopped without a shutdown signal");
            CoreradExitCode::RuntimeError
        }
        Ok(Err(e)) => {
            error!("Failed to start: {}", e);
            CoreradExitCode::ConfigError
        }
        Err(e) => {
            error!("Server task failed: {}", e);
            CoreradExitCode::RuntimeError
        }
    }
}

/// Wait for SIGTERM or SIGINT
///
/// # Returns
///
/// Returns the name of the signal received.
#[cfg(unix)]
async fn wait_for_shutdown_signal() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    let signal = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };

    Ok(signal)
}

/// Wait for CTRL-C
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown_signal() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
