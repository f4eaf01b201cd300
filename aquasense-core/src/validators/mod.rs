//! Plausibility Validators
//!
//! ## Overview
//!
//! Every physical quantity has a fixed inclusive window outside of which the
//! value cannot come from a healthy probe in water:
//!
//! ```text
//! pH         0 ..= 14
//! TDS        0 ..= 20000 ppm
//! Turbidity  0 ..= 1000 NTU
//! Distance   2 ..= 400 cm
//! ```
//!
//! The windows are compile-time data. They are used twice in a cycle:
//!
//! 1. Per sample, by the filters, to reject spikes before averaging.
//! 2. Per reading set, by [`SetVerdict`], to decide whether the set may be
//!    published and to build the failure reason.
//!
//! ```rust
//! use aquasense_core::{validators, QuantityKind};
//!
//! assert!(validators::is_valid(QuantityKind::Distance, 2.0));
//! assert!(!validators::is_valid(QuantityKind::Distance, 0.0));
//! assert!(!validators::is_valid(QuantityKind::Ph, f32::NAN));
//! ```

pub mod utils;
mod verdict;

pub use verdict::{Reason, SetVerdict};

use crate::{
    constants::sensors::{
        DISTANCE_MAX_CM, DISTANCE_MIN_CM, PH_MAX, PH_MIN, TDS_MAX_PPM, TDS_MIN_PPM,
        TURBIDITY_MAX_NTU, TURBIDITY_MIN_NTU,
    },
    errors::ValidationResult,
    reading::QuantityKind,
    traits::{Validator, ValidatorConstraints},
};

/// Inclusive plausibility window for one quantity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidRange {
    /// Lowest plausible value
    pub min: f32,
    /// Highest plausible value
    pub max: f32,
}

impl ValidRange {
    /// pH window
    pub const PH: Self = Self::new(PH_MIN, PH_MAX);
    /// TDS window (ppm)
    pub const TDS: Self = Self::new(TDS_MIN_PPM, TDS_MAX_PPM);
    /// Turbidity window (NTU)
    pub const TURBIDITY: Self = Self::new(TURBIDITY_MIN_NTU, TURBIDITY_MAX_NTU);
    /// Ultrasonic distance window (cm)
    pub const DISTANCE: Self = Self::new(DISTANCE_MIN_CM, DISTANCE_MAX_CM);

    /// Create a window from inclusive bounds
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Whether `value` lies inside the window. NaN never does.
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }
}

impl Validator for ValidRange {
    type Value = f32;

    fn validate(&self, value: f32) -> ValidationResult<()> {
        utils::check_range(value, self.min, self.max)
    }

    fn constraints(&self) -> ValidatorConstraints {
        ValidatorConstraints {
            min_value: self.min,
            max_value: self.max,
        }
    }
}

/// Whether `value` is plausible for `kind`
pub fn is_valid(kind: QuantityKind, value: f32) -> bool {
    kind.valid_range().contains(value)
}

/// Validate `value` for `kind`, reporting which bound failed
pub fn validate(kind: QuantityKind, value: f32) -> ValidationResult<()> {
    kind.valid_range().validate(value)
}
