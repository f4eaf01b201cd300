//! Time-Related Constants
//!
//! Schedule periods for the acquisition loop and the short delays used while
//! sampling. Millisecond values are `u64` to match [`crate::Timestamp`];
//! pulse timings are microseconds.

// ===== TIME UNIT CONVERSIONS =====

/// Microseconds per millisecond.
pub const US_PER_MS: u64 = 1000;

// ===== SCHEDULE =====

/// Default period between acquisition cycles (ms).
///
/// Long enough for the mean and median filters to finish their settle
/// delays with plenty of margin.
pub const DEFAULT_SAMPLE_PERIOD_MS: u64 = 3000;

/// Default period between connectivity checks (ms).
pub const DEFAULT_HEALTH_CHECK_PERIOD_MS: u64 = 10_000;

// ===== SETTLE DELAYS =====

/// Minimum delay after each analog sample (ms).
pub const MEAN_FILTER_SETTLE_MS: u32 = 10;

/// Minimum delay after each ultrasonic sample (ms). Lets echoes die out.
pub const MEDIAN_FILTER_SETTLE_MS: u32 = 50;

// ===== ULTRASONIC PULSE =====

/// Trigger held low before the pulse (µs).
pub const TRIGGER_SETTLE_US: u32 = 2;

/// Trigger pulse width (µs).
pub const TRIGGER_PULSE_US: u32 = 10;

/// Maximum wait for a complete echo pulse (µs). About 5 m round trip.
pub const ECHO_TIMEOUT_US: u32 = 30_000;
