//! Error types for CoreRAD
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for CoreRAD operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for CoreRAD
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A plugin failed while building an advertisement
    #[error("Plugin error ({plugin}): {message}")]
    Plugin {
        /// Plugin name
        plugin: String,
        /// Error message
        message: String,
    },

    /// Interface address enumeration errors
    #[error("Address source error: {0}")]
    AddressSource(String),

    /// Errors from the NDP send/receive collaborator
    #[error("Transport error: {0}")]
    Transport(String),

    /// Link state monitoring errors
    #[error("Link state error: {0}")]
    LinkState(String),

    /// A task could not be prepared or stopped early
    #[error("Task error ({task}): {message}")]
    Task {
        /// Task description
        task: String,
        /// Error message
        message: String,
    },

    /// I/O errors (listeners, sockets)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML configuration parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a plugin error
    pub fn plugin(plugin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Plugin {
            plugin: plugin.into(),
            message: message.into(),
        }
    }

    /// Create an address source error
    pub fn address_source(msg: impl Into<String>) -> Self {
        Self::AddressSource(msg.into())
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a link state error
    pub fn link_state(msg: impl Into<String>) -> Self {
        Self::LinkState(msg.into())
    }

    /// Create a task error
    pub fn task(task: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Task {
            task: task.into(),
            message: message.into(),
        }
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
