//! Common Validation Utilities
//!
//! Pure, allocation-free helpers shared by the range validators. Safe to
//! call from interrupt context.

use crate::{
    errors::{ValidationError, ValidationResult},
    traits::Validatable,
};

/// Check if a value is within the inclusive range `[min, max]`
///
/// NaN and infinities are reported as [`ValidationError::InvalidValue`]
/// rather than slipping through the comparisons.
pub fn check_range(value: f32, min: f32, max: f32) -> ValidationResult<()> {
    if !value.is_valid() {
        Err(ValidationError::InvalidValue)
    } else if value < min || value > max {
        Err(ValidationError::OutOfRange { value, min, max })
    } else {
        Ok(())
    }
}
