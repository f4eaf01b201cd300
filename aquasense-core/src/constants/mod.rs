//! Constants for AquaSense Core
//!
//! Centralized numeric constants for the acquisition pipeline. Every value
//! that appears in a conversion, a plausibility window or a schedule lives
//! here with its unit in the name.
//!
//! ## Organization
//!
//! - **Sensors**: probe conversion constants and plausibility windows
//! - **Time**: schedule periods, settle delays and pulse timings
//! - **Quality**: fuzzy membership breakpoints and score thresholds
//! - **Buffers**: sample counts and fixed capacities
//!
//! Calibration profiles copy the sensor constants at construction, so a
//! deployment can override them without touching this module.

/// Probe conversion constants and plausibility windows.
pub mod sensors;

/// Schedule periods, settle delays and pulse timings.
pub mod time;

/// Fuzzy water-quality membership breakpoints and category thresholds.
pub mod quality;

/// Sample counts and fixed buffer capacities.
pub mod buffers;

pub use sensors::{
    PH_MIN, PH_MAX, TDS_MIN_PPM, TDS_MAX_PPM,
    TURBIDITY_MIN_NTU, TURBIDITY_MAX_NTU, DISTANCE_MIN_CM, DISTANCE_MAX_CM,
    SALINITY_K,
};

pub use time::{
    DEFAULT_SAMPLE_PERIOD_MS, DEFAULT_HEALTH_CHECK_PERIOD_MS,
    MEAN_FILTER_SETTLE_MS, MEDIAN_FILTER_SETTLE_MS, ECHO_TIMEOUT_US,
};

pub use buffers::{
    MEAN_FILTER_SAMPLES, MEDIAN_FILTER_SAMPLES, MAX_FILTER_SAMPLES,
    REASON_CAPACITY, DEFAULT_ESCALATION_THRESHOLD,
};
