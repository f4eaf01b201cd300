//! Core traits for validators
//!
//! Plausibility checks are plain range windows, so the interface stays
//! small: a value either sits inside its window or it does not.

use crate::errors::ValidationResult;

/// Core validator trait
pub trait Validator {
    /// The type of value this validator handles
    type Value;

    /// Validate a single value
    fn validate(&self, value: Self::Value) -> ValidationResult<()>;

    /// Get the window this validator enforces
    fn constraints(&self) -> ValidatorConstraints;

    /// Convenience form of [`validate`](Self::validate)
    fn accepts(&self, value: Self::Value) -> bool {
        self.validate(value).is_ok()
    }
}

/// Inclusive window enforced by a validator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidatorConstraints {
    /// Minimum valid value
    pub min_value: f32,

    /// Maximum valid value
    pub max_value: f32,
}

/// Trait for values that can be validated
pub trait Validatable {
    /// Check if the value is a usable number (not NaN or infinite)
    fn is_valid(&self) -> bool;
}

impl Validatable for f32 {
    fn is_valid(&self) -> bool {
        self.is_finite()
    }
}

impl Validatable for f64 {
    fn is_valid(&self) -> bool {
        self.is_finite()
    }
}
