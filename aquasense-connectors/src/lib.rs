//! Telemetry sink adapters for AquaSense stations
//!
//! ## Overview
//!
//! The acquisition core only knows the [`TelemetrySink`] port. This crate
//! provides the adapters that sit behind it on std targets.
//!
//! ### Log sink
//!
//! **When to use:**
//! - Bench setups and serial-only deployments
//! - Soak tests of the acquisition loop without a backend
//!
//! Every set is rendered as one JSON line at info level.
//!
//! ### Document sink (`http` feature)
//!
//! **When to use:**
//! - Stations writing their latest readings into a hosted document store
//!
//! **Characteristics:**
//! - One PATCH per cycle, overwriting a single document
//! - Fields are typed doubles (`pHValue`, `TDSValue`, `turbidityValue`,
//!   `ultrasonicValue`, `salinitasValue`)
//! - API key passed as a query parameter
//! - No internal retry; the next cycle is the retry
//!
//! ## Error Mapping
//!
//! Adapters fail with [`ConnectorError`], which converts into the core's
//! [`SinkError`] at the trait boundary:
//!
//! | Connector error          | Sink error  |
//! |--------------------------|-------------|
//! | 401, 403, `Auth`         | `Auth`      |
//! | 429, `Quota`             | `Quota`     |
//! | other 4xx, serialization | `Rejected`  |
//! | 5xx, timeout, transport  | `Transport` |
//!
//! ## Example Usage
//!
//! ```rust
//! use aquasense_connectors::LogSink;
//! use aquasense_core::TelemetrySink;
//!
//! let sink = LogSink::new("station-01");
//! assert!(sink.is_ready());
//! assert_eq!(sink.stats().messages_sent, 0);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod document;
pub mod log_sink;

#[cfg(feature = "http")]
pub use document::{DocumentConfig, DocumentSink};
pub use document::encode_document;
pub use log_sink::LogSink;

pub use aquasense_core::{Ack, SinkError, TelemetrySink};

use thiserror::Error;

/// Common connector errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectorError {
    /// No connection to the backend
    #[error("Not connected")]
    NotConnected,

    /// Request did not complete in time
    #[error("Timeout")]
    Timeout,

    /// Credentials were rejected
    #[error("Authentication failed")]
    Auth,

    /// Backend is rate limiting this client
    #[error("Quota exceeded")]
    Quota,

    /// Backend answered with a non-success status
    #[error("Server returned status {0}")]
    Status(u16),

    /// Network failure below HTTP
    #[error("Transport error: {0}")]
    Transport(String),

    /// Connector was configured with unusable settings
    #[error("Configuration error: {0}")]
    Config(String),

    /// Reading set could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ConnectorError {
    /// Classify an HTTP status code
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => Self::Auth,
            429 => Self::Quota,
            other => Self::Status(other),
        }
    }
}

impl From<ConnectorError> for SinkError {
    fn from(err: ConnectorError) -> Self {
        match err {
            ConnectorError::NotConnected => SinkError::Transport { reason: "not connected" },
            ConnectorError::Timeout => SinkError::Transport { reason: "timeout" },
            ConnectorError::Transport(_) => SinkError::Transport { reason: "transport" },
            ConnectorError::Auth => SinkError::Auth,
            ConnectorError::Quota => SinkError::Quota,
            ConnectorError::Status(status) => match status {
                401 | 403 => SinkError::Auth,
                429 => SinkError::Quota,
                500..=599 => SinkError::Transport { reason: "server error" },
                _ => SinkError::Rejected { status },
            },
            ConnectorError::Config(_) | ConnectorError::Serialization(_) => {
                SinkError::Rejected { status: 0 }
            }
        }
    }
}

/// Connection statistics common to all connectors
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConnectionStats {
    /// Total messages sent successfully
    pub messages_sent: u64,
    /// Total messages failed to send
    pub messages_failed: u64,
    /// Total payload bytes sent
    pub bytes_sent: u64,
    /// Number of reconnections
    pub reconnections: u32,
    /// Last error message
    pub last_error: Option<String>,
}

impl ConnectionStats {
    pub(crate) fn record_sent(&mut self, bytes: usize) {
        self.messages_sent += 1;
        self.bytes_sent += bytes as u64;
    }

    pub(crate) fn record_failure(&mut self, err: &ConnectorError) {
        self.messages_failed += 1;
        self.last_error = Some(err.to_string());
    }
}
