//! Error Types for Acquisition, Delivery and Configuration
//!
//! ## Design
//!
//! Errors travel through the acquisition loop on a microcontroller, so every
//! type here is `Copy`, allocation-free and carries only `&'static str` or
//! numeric context:
//!
//! - [`ValidationError`]: a physical value failed its plausibility window or
//!   is not a number at all.
//! - [`SinkError`]: the telemetry sink could not accept a reading set. The
//!   orchestrator counts these and escalates past a threshold.
//! - [`ConfigError`]: a calibration profile or acquisition config is
//!   malformed or would produce meaningless conversions.
//!
//! ## Error Handling Strategy
//!
//! ```rust
//! use aquasense_core::{validators, QuantityKind, ValidationError};
//!
//! match validators::validate(QuantityKind::Ph, 15.2) {
//!     Ok(()) => { /* keep the sample */ }
//!     Err(ValidationError::OutOfRange { .. }) => { /* reject the sample */ }
//!     Err(ValidationError::InvalidValue) => { /* NaN from a broken conversion */ }
//! }
//! ```
//!
//! ## Memory Layout
//!
//! ```text
//! ValidationError size = 16 bytes
//! ├── Discriminant: 1 byte
//! ├── Largest variant (OutOfRange): 12 bytes
//! └── Padding: 3 bytes
//! ```

use thiserror_no_std::Error;

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validation errors - kept small for embedded use
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ValidationError {
    /// Value outside its plausibility window
    #[error("Value {value} outside range [{min}, {max}]")]
    OutOfRange {
        /// The physical value that failed validation
        value: f32,
        /// Inclusive lower bound
        min: f32,
        /// Inclusive upper bound
        max: f32,
    },

    /// Value makes no physical sense (NaN, infinity)
    #[error("Invalid value: not a valid number")]
    InvalidValue,
}

#[cfg(feature = "defmt")]
impl defmt::Format for ValidationError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::OutOfRange { value, min, max } =>
                defmt::write!(fmt, "Value {} outside [{}, {}]", value, min, max),
            Self::InvalidValue =>
                defmt::write!(fmt, "Invalid value"),
        }
    }
}

/// Failure reported by a telemetry sink.
///
/// Sinks never retry internally. The orchestrator retries by publishing the
/// next cycle's reading set.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkError {
    /// Network or server-side failure; the next cycle may succeed
    #[error("Transport failure: {reason}")]
    Transport {
        /// Short description of the failure
        reason: &'static str,
    },

    /// Credentials rejected by the backend
    #[error("Authentication rejected by sink")]
    Auth,

    /// Backend refused the write because of rate limits or quota
    #[error("Sink quota exceeded")]
    Quota,

    /// Backend rejected the document itself
    #[error("Document rejected with status {status}")]
    Rejected {
        /// Status code returned by the backend, 0 when unknown
        status: u16,
    },
}

impl SinkError {
    /// Whether publishing the next reading set could plausibly succeed
    /// without operator intervention.
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Quota)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for SinkError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Transport { reason } => defmt::write!(fmt, "Transport: {}", reason),
            Self::Auth => defmt::write!(fmt, "Auth rejected"),
            Self::Quota => defmt::write!(fmt, "Quota exceeded"),
            Self::Rejected { status } => defmt::write!(fmt, "Rejected ({})", status),
        }
    }
}

/// Configuration and calibration errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Document could not be parsed
    #[error("Malformed configuration at line {line}, column {column}")]
    Parse {
        /// 1-based line of the parse failure
        line: usize,
        /// 1-based column of the parse failure
        column: usize,
    },

    /// A constant would make a conversion degenerate
    #[error("Invalid {field}: {reason}")]
    InvalidConstant {
        /// Name of the offending field
        field: &'static str,
        /// Why the value was refused
        reason: &'static str,
    },

    /// A filter burst size outside what the sample buffer holds
    #[error("Invalid {field}: {samples} samples, expected 1..={max}")]
    SampleCount {
        /// Name of the offending field
        field: &'static str,
        /// Configured samples per burst
        samples: usize,
        /// Buffer capacity
        max: usize,
    },
}

#[cfg(feature = "defmt")]
impl defmt::Format for ConfigError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Parse { line, column } =>
                defmt::write!(fmt, "Parse error at {}:{}", line, column),
            Self::InvalidConstant { field, reason } =>
                defmt::write!(fmt, "Invalid {}: {}", field, reason),
            Self::SampleCount { field, samples, max } =>
                defmt::write!(fmt, "Invalid {}: {} samples, expected 1..={}", field, samples, max),
        }
    }
}
