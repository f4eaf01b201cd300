//! Sample Counts and Fixed Capacities
//!
//! Everything in the acquisition path is stack allocated; these bound the
//! `heapless` containers used for filtering and failure reporting.

/// Samples averaged per analog reading.
pub const MEAN_FILTER_SAMPLES: u8 = 5;

/// Samples per ultrasonic reading. Odd so the median is a real sample.
pub const MEDIAN_FILTER_SAMPLES: u8 = 3;

/// Largest sample count either filter accepts.
pub const MAX_FILTER_SAMPLES: usize = 16;

/// Capacity of the failure reason string.
///
/// Fits all four "<quantity> out of range" entries with separators.
pub const REASON_CAPACITY: usize = 96;

/// Consecutive sink failures tolerated before escalation.
pub const DEFAULT_ESCALATION_THRESHOLD: u32 = 10;
