//! Derived quantities
//!
//! Values computed from validated readings rather than measured:
//!
//! - salinity (ppt) from TDS: `tds_ppm / (K · 1000)`
//! - fill level (cm) from the ultrasonic distance and the tank geometry
//! - the fuzzy water-quality assessment
//!
//! Each is computed only from valid inputs. An invalid TDS produces no
//! salinity, so nothing downstream mistakes a sentinel for a measurement.

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::{
    calibration::{CalibrationProfile, TankGeometry},
    quality::{self, QualityAssessment},
    reading::{PhysicalReading, QuantityKind},
};

/// Salinity in ppt from TDS in ppm
pub fn salinity_ppt(tds_ppm: f32, salinity_k: f32) -> f32 {
    tds_ppm / (salinity_k * 1000.0)
}

/// Water level above the tank floor, within `[0, height]`
///
/// `height − offset − distance`
pub fn fill_level_cm(distance_cm: f32, tank: &TankGeometry) -> f32 {
    let level = tank.height_cm - tank.sensor_offset_cm - distance_cm;
    level.clamp(0.0, tank.height_cm)
}

/// Derived values attached to a reading set
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct DerivedQuantities {
    /// Salinity (ppt), when TDS is valid
    pub salinity_ppt: Option<f32>,
    /// Fill level (cm), when distance is valid
    pub fill_level_cm: Option<f32>,
    /// Quality assessment, when pH, TDS and turbidity are all valid
    ///
    /// A [`ReadingSet`](crate::ReadingSet) keeps it only when sendable.
    pub quality: Option<QualityAssessment>,
}

impl DerivedQuantities {
    /// Compute everything the readings allow
    ///
    /// `readings` is in acquisition order: pH, TDS, turbidity, distance.
    pub fn compute(
        readings: &[PhysicalReading; QuantityKind::COUNT],
        profile: &CalibrationProfile,
    ) -> Self {
        let [ph, tds, turbidity, distance] = readings;

        let salinity_ppt = tds
            .is_valid()
            .then(|| salinity_ppt(tds.value(), profile.salinity_k));
        let fill_level_cm = distance
            .is_valid()
            .then(|| fill_level_cm(distance.value(), &profile.tank));
        let quality = if ph.is_valid() && tds.is_valid() && turbidity.is_valid() {
            quality::assess(ph.value(), tds.value(), turbidity.value())
        } else {
            None
        };

        Self { salinity_ppt, fill_level_cm, quality }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn salinity_from_tds() {
        assert_eq!(salinity_ppt(570.0, 0.57), 570.0 / (0.57 * 1000.0));
        assert!((salinity_ppt(1000.0, 0.57) - 1.754_386).abs() < 1e-5);
        assert_eq!(salinity_ppt(0.0, 0.57), 0.0);
    }

    #[test]
    fn fill_level_follows_distance() {
        let tank = TankGeometry::REFERENCE;
        assert_eq!(fill_level_cm(5.0, &tank), 90.0);
        assert_eq!(fill_level_cm(55.0, &tank), 40.0);
        assert_eq!(fill_level_cm(95.0, &tank), 0.0);
        assert_eq!(fill_level_cm(300.0, &tank), 0.0);

        let deep = TankGeometry { height_cm: 100.0, sensor_offset_cm: 0.0 };
        assert_eq!(fill_level_cm(0.5, &deep), 99.5);
    }

    fn readings(ph: f32, tds: f32, turbidity: f32, distance: f32) -> [PhysicalReading; 4] {
        [
            PhysicalReading::measured(QuantityKind::Ph, ph),
            PhysicalReading::measured(QuantityKind::Tds, tds),
            PhysicalReading::measured(QuantityKind::Turbidity, turbidity),
            PhysicalReading::measured(QuantityKind::Distance, distance),
        ]
    }

    #[test]
    fn invalid_tds_yields_no_salinity() {
        let profile = CalibrationProfile::REFERENCE_PROBE;
        let derived = DerivedQuantities::compute(&readings(7.5, -3.0, 30.0, 55.0), &profile);
        assert_eq!(derived.salinity_ppt, None);
        assert_eq!(derived.quality, None);
        assert_eq!(derived.fill_level_cm, Some(40.0));
    }

    #[test]
    fn invalid_distance_yields_no_level() {
        let profile = CalibrationProfile::REFERENCE_PROBE;
        let derived = DerivedQuantities::compute(&readings(7.5, 500.0, 30.0, 0.0), &profile);
        assert_eq!(derived.fill_level_cm, None);
        assert!((derived.salinity_ppt.unwrap_or_default() - 0.877_193).abs() < 1e-5);
        assert!(derived.quality.is_some());
    }
}
