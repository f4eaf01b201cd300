//! Set-level verdict: may a reading set be published?

use core::fmt::Write;

use heapless::{String, Vec};

use crate::{
    constants::buffers::REASON_CAPACITY,
    reading::{PhysicalReading, QuantityKind},
};

/// Failure description attached to a reading set
pub type Reason = String<REASON_CAPACITY>;

/// Outcome of checking every reading in a set
///
/// A set is sendable only when every reading is valid. The failed
/// quantities are kept in acquisition order, each at most once.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SetVerdict {
    failures: Vec<QuantityKind, { QuantityKind::COUNT }>,
}

impl SetVerdict {
    /// Check a set of readings
    pub fn assess(readings: &[PhysicalReading]) -> Self {
        let mut failures = Vec::new();
        for reading in readings.iter().filter(|r| !r.is_valid()) {
            if !failures.contains(&reading.kind()) {
                // One slot per kind, cannot overflow.
                let _ = failures.push(reading.kind());
            }
        }
        Self { failures }
    }

    /// True when no reading failed
    pub fn is_sendable(&self) -> bool {
        self.failures.is_empty()
    }

    /// Quantities that failed, in acquisition order
    pub fn failures(&self) -> &[QuantityKind] {
        &self.failures
    }

    /// Human-readable failure list, e.g. `"pH out of range; Distance out of range"`
    ///
    /// Empty when the set is sendable.
    pub fn reason(&self) -> Reason {
        let mut reason = Reason::new();
        for (i, kind) in self.failures.iter().enumerate() {
            let sep = if i == 0 { "" } else { "; " };
            // Capacity covers all four entries.
            let _ = write!(reason, "{}{} out of range", sep, kind.name());
        }
        reason
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ph: f32, tds: f32, turbidity: f32, distance: f32) -> [PhysicalReading; 4] {
        [
            PhysicalReading::measured(QuantityKind::Ph, ph),
            PhysicalReading::measured(QuantityKind::Tds, tds),
            PhysicalReading::measured(QuantityKind::Turbidity, turbidity),
            PhysicalReading::measured(QuantityKind::Distance, distance),
        ]
    }

    #[test]
    fn all_valid_is_sendable() {
        let verdict = SetVerdict::assess(&set(7.0, 400.0, 30.0, 50.0));
        assert!(verdict.is_sendable());
        assert!(verdict.reason().is_empty());
    }

    #[test]
    fn single_failure_named() {
        let verdict = SetVerdict::assess(&set(7.0, 400.0, 30.0, 0.0));
        assert!(!verdict.is_sendable());
        assert_eq!(verdict.failures(), &[QuantityKind::Distance]);
        assert_eq!(verdict.reason().as_str(), "Distance out of range");
    }

    #[test]
    fn every_failure_listed_in_order() {
        let verdict = SetVerdict::assess(&set(20.0, -5.0, 2000.0, 1.0));
        assert_eq!(
            verdict.reason().as_str(),
            "pH out of range; TDS out of range; Turbidity out of range; Distance out of range"
        );
    }

    #[test]
    fn duplicate_kinds_reported_once() {
        let readings = [
            PhysicalReading::measured(QuantityKind::Ph, 20.0),
            PhysicalReading::measured(QuantityKind::Ph, 21.0),
        ];
        assert_eq!(SetVerdict::assess(&readings).failures().len(), 1);
    }
}
