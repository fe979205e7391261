//! Error types for speedtest-ambient
//!
//! Every failure category of a measurement run has its own variant. With the
//! exception of address-info entries that carry no usable family or local
//! address (which are filtered, not reported), every error aborts the run.

use thiserror::Error;

/// Result type alias for speedtest-ambient operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for speedtest-ambient
#[derive(Error, Debug)]
pub enum Error {
    /// The interface listing could not be obtained or parsed
    #[error("Address discovery failed: {0}")]
    Discovery(String),

    /// The route lookup for a probe destination failed
    #[error("Route lookup failed: {0}")]
    RouteLookup(String),

    /// The speed test for an address failed
    #[error("Measurement failed: {0}")]
    Measurement(String),

    /// The telemetry upload failed or was rejected
    #[error("Reporting failed: {0}")]
    Reporting(String),

    /// More routable addresses than configured reporting channels
    #[error(
        "No reporting channel for routable address #{position} ({configured} channel(s) configured)"
    )]
    ChannelsExhausted {
        /// 1-based position of the address without a channel
        position: usize,
        /// Number of channels in the configuration
        configured: usize,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// An external command could not be spawned or exited unsuccessfully
    #[error("Command `{program}` failed ({}): {stderr}", describe_status(.status))]
    Command {
        /// Program that was invoked
        program: String,
        /// Exit code, `None` if terminated by a signal or never started
        status: Option<i32>,
        /// Captured diagnostic output
        stderr: String,
    },

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

fn describe_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exit status {}", code),
        None => "no exit status".to_string(),
    }
}

impl Error {
    /// Create a discovery error
    pub fn discovery(msg: impl Into<String>) -> Self {
        Self::Discovery(msg.into())
    }

    /// Create a route lookup error
    pub fn route_lookup(msg: impl Into<String>) -> Self {
        Self::RouteLookup(msg.into())
    }

    /// Create a measurement error
    pub fn measurement(msg: impl Into<String>) -> Self {
        Self::Measurement(msg.into())
    }

    /// Create a reporting error
    pub fn reporting(msg: impl Into<String>) -> Self {
        Self::Reporting(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create a command failure
    pub fn command(program: impl Into<String>, status: Option<i32>, stderr: impl Into<String>) -> Self {
        Self::Command {
            program: program.into(),
            status,
            stderr: stderr.into(),
        }
    }

    /// Whether this error stems from configuration rather than from the run itself
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
