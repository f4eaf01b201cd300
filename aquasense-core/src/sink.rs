//! Telemetry sink and connectivity ports
//!
//! The orchestrator hands every sendable [`ReadingSet`] to a
//! [`TelemetrySink`] and periodically asks a [`ConnectivityMonitor`] to
//! check the uplink. Both are implemented by platform or connector code;
//! the core only counts outcomes.

use crate::{errors::SinkError, reading::ReadingSet};

/// Acknowledgement of a published reading set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Ack;

/// Destination for reading sets
pub trait TelemetrySink {
    /// Publish one reading set
    ///
    /// Called at most once per cycle and only with sendable sets. Must not
    /// retry internally; the next cycle is the retry.
    fn publish(&mut self, readings: ReadingSet) -> Result<Ack, SinkError>;

    /// Whether the sink can accept a set right now
    ///
    /// Cycles are not started while this is false.
    fn is_ready(&self) -> bool {
        true
    }
}

impl<T: TelemetrySink + ?Sized> TelemetrySink for &mut T {
    fn publish(&mut self, readings: ReadingSet) -> Result<Ack, SinkError> {
        (**self).publish(readings)
    }

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }
}

/// Uplink state reported by a connectivity check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    /// Link was up
    Up,
    /// Link was down and has been re-established
    Reconnected,
    /// Link is down; reconnection will be retried on the next check
    Down,
}

impl LinkStatus {
    /// Whether the link is usable after the check
    pub const fn is_up(&self) -> bool {
        !matches!(self, Self::Down)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for LinkStatus {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Up => defmt::write!(fmt, "up"),
            Self::Reconnected => defmt::write!(fmt, "reconnected"),
            Self::Down => defmt::write!(fmt, "down"),
        }
    }
}

/// Periodic uplink check
pub trait ConnectivityMonitor {
    /// Check the link and reconnect if it dropped
    fn check(&mut self) -> LinkStatus;
}

impl<T: ConnectivityMonitor + ?Sized> ConnectivityMonitor for &mut T {
    fn check(&mut self) -> LinkStatus {
        (**self).check()
    }
}

/// Monitor for deployments without a managed link
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysUp;

impl ConnectivityMonitor for AlwaysUp {
    fn check(&mut self) -> LinkStatus {
        LinkStatus::Up
    }
}
