//! Physical readings and the per-cycle reading set
//!
//! A [`PhysicalReading`] is one filtered, calibrated value with its validity
//! and whether it is a filter fallback. A [`ReadingSet`] gathers the four
//! readings of one cycle with the derived quantities and the publication
//! verdict. Both are immutable once built; the orchestrator moves the set
//! into the telemetry sink.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    constants::sensors::{
        DISTANCE_INVALID_CM, PH_FALLBACK, TDS_FALLBACK_PPM, TURBIDITY_FALLBACK_NTU,
    },
    derived::DerivedQuantities,
    filter::Filtered,
    frontend::Channel,
    quality::QualityAssessment,
    time::Timestamp,
    validators::{self, Reason, SetVerdict, ValidRange},
};

/// Measured physical quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum QuantityKind {
    /// Acidity, pH units
    Ph,
    /// Total dissolved solids, ppm
    Tds,
    /// Turbidity, NTU
    Turbidity,
    /// Ultrasonic distance to the water surface, cm
    Distance,
}

impl QuantityKind {
    /// Number of quantities acquired per cycle
    pub const COUNT: usize = 4;

    /// Every quantity in acquisition order
    pub const ALL: [QuantityKind; Self::COUNT] =
        [Self::Ph, Self::Tds, Self::Turbidity, Self::Distance];

    /// Display name used in failure reasons
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Ph => "pH",
            Self::Tds => "TDS",
            Self::Turbidity => "Turbidity",
            Self::Distance => "Distance",
        }
    }

    /// Unit symbol
    pub const fn unit(&self) -> &'static str {
        match self {
            Self::Ph => "pH",
            Self::Tds => "ppm",
            Self::Turbidity => "NTU",
            Self::Distance => "cm",
        }
    }

    /// Frontend channel carrying this quantity
    pub const fn channel(&self) -> Channel {
        match self {
            Self::Ph => Channel::Ph,
            Self::Tds => Channel::Tds,
            Self::Turbidity => Channel::Turbidity,
            Self::Distance => Channel::Distance,
        }
    }

    /// Plausibility window
    pub const fn valid_range(&self) -> ValidRange {
        match self {
            Self::Ph => ValidRange::PH,
            Self::Tds => ValidRange::TDS,
            Self::Turbidity => ValidRange::TURBIDITY,
            Self::Distance => ValidRange::DISTANCE,
        }
    }

    /// Value reported when filtering produces no usable sample
    ///
    /// pH falls back to neutral, everything else to zero. Zero distance is
    /// below the ranger's window, so a fallback distance never validates.
    pub const fn fallback(&self) -> f32 {
        match self {
            Self::Ph => PH_FALLBACK,
            Self::Tds => TDS_FALLBACK_PPM,
            Self::Turbidity => TURBIDITY_FALLBACK_NTU,
            Self::Distance => DISTANCE_INVALID_CM,
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for QuantityKind {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{}", self.name())
    }
}

/// One calibrated, filtered value
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct PhysicalReading {
    kind: QuantityKind,
    value: f32,
    valid: bool,
    fallback: bool,
}

impl PhysicalReading {
    /// Reading built from a filter result
    pub fn from_filtered(kind: QuantityKind, filtered: Filtered) -> Self {
        Self {
            kind,
            value: filtered.value(),
            valid: validators::is_valid(kind, filtered.value()),
            fallback: filtered.is_fallback(),
        }
    }

    /// Reading from a directly measured value
    pub fn measured(kind: QuantityKind, value: f32) -> Self {
        Self::from_filtered(kind, Filtered::Measured(value))
    }

    /// Quantity measured
    pub fn kind(&self) -> QuantityKind {
        self.kind
    }

    /// Value in the quantity's unit
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Whether the value lies in the plausibility window
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Whether the value is a filter fallback rather than a measurement
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }
}

/// Everything one acquisition cycle produced
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ReadingSet {
    cycle: u32,
    timestamp: Timestamp,
    ph: PhysicalReading,
    tds: PhysicalReading,
    turbidity: PhysicalReading,
    distance: PhysicalReading,
    salinity_ppt: Option<f32>,
    fill_level_cm: Option<f32>,
    quality: Option<QualityAssessment>,
    sendable: bool,
    reason: Reason,
}

impl ReadingSet {
    /// Assemble a set and compute its verdict
    pub fn assemble(
        cycle: u32,
        timestamp: Timestamp,
        readings: [PhysicalReading; QuantityKind::COUNT],
        derived: DerivedQuantities,
    ) -> Self {
        let verdict = SetVerdict::assess(&readings);
        let [ph, tds, turbidity, distance] = readings;
        Self {
            cycle,
            timestamp,
            ph,
            tds,
            turbidity,
            distance,
            salinity_ppt: derived.salinity_ppt,
            fill_level_cm: derived.fill_level_cm,
            quality: derived.quality.filter(|_| verdict.is_sendable()),
            sendable: verdict.is_sendable(),
            reason: verdict.reason(),
        }
    }

    /// 1-based cycle number
    pub fn cycle(&self) -> u32 {
        self.cycle
    }

    /// Time the cycle started
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// pH reading
    pub fn ph(&self) -> &PhysicalReading {
        &self.ph
    }

    /// TDS reading (ppm)
    pub fn tds(&self) -> &PhysicalReading {
        &self.tds
    }

    /// Turbidity reading
    pub fn turbidity(&self) -> &PhysicalReading {
        &self.turbidity
    }

    /// Ultrasonic distance reading (cm)
    pub fn distance(&self) -> &PhysicalReading {
        &self.distance
    }

    /// The four readings in acquisition order
    pub fn readings(&self) -> [PhysicalReading; QuantityKind::COUNT] {
        [self.ph, self.tds, self.turbidity, self.distance]
    }

    /// Reading for `kind`
    pub fn reading(&self, kind: QuantityKind) -> &PhysicalReading {
        match kind {
            QuantityKind::Ph => &self.ph,
            QuantityKind::Tds => &self.tds,
            QuantityKind::Turbidity => &self.turbidity,
            QuantityKind::Distance => &self.distance,
        }
    }

    /// Salinity (ppt), present only when TDS is valid
    pub fn salinity_ppt(&self) -> Option<f32> {
        self.salinity_ppt
    }

    /// Water level above the tank floor (cm), present only when distance is valid
    pub fn fill_level_cm(&self) -> Option<f32> {
        self.fill_level_cm
    }

    /// Fuzzy water-quality assessment, present only for sendable sets
    pub fn quality(&self) -> Option<&QualityAssessment> {
        self.quality.as_ref()
    }

    /// Whether every reading is valid
    pub fn is_sendable(&self) -> bool {
        self.sendable
    }

    /// Failure reason, empty when sendable
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Whether any reading is a filter fallback
    pub fn has_fallback(&self) -> bool {
        self.readings().iter().any(PhysicalReading::is_fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn readings(ph: f32, tds: f32, turbidity: f32, distance: f32) -> [PhysicalReading; 4] {
        [
            PhysicalReading::measured(QuantityKind::Ph, ph),
            PhysicalReading::measured(QuantityKind::Tds, tds),
            PhysicalReading::measured(QuantityKind::Turbidity, turbidity),
            PhysicalReading::measured(QuantityKind::Distance, distance),
        ]
    }

    #[test]
    fn fallback_flag_carried() {
        let r = PhysicalReading::from_filtered(QuantityKind::Ph, Filtered::Fallback(7.0));
        assert!(r.is_fallback());
        assert!(r.is_valid());
        assert_eq!(r.value(), 7.0);

        let r = PhysicalReading::from_filtered(QuantityKind::Distance, Filtered::Fallback(0.0));
        assert!(r.is_fallback());
        assert!(!r.is_valid());
    }

    #[test]
    fn assemble_valid_set() {
        let set = ReadingSet::assemble(
            3,
            6000,
            readings(7.2, 367.5, 12.0, 40.0),
            DerivedQuantities::default(),
        );
        assert!(set.is_sendable());
        assert_eq!(set.reason(), "");
        assert_eq!(set.cycle(), 3);
        assert_eq!(set.timestamp(), 6000);
        assert_eq!(set.reading(QuantityKind::Tds).value(), 367.5);
        assert!(!set.has_fallback());
    }

    #[test]
    fn suppressed_set_drops_quality() {
        let profile = crate::CalibrationProfile::REFERENCE_PROBE;

        let good = readings(7.75, 500.0, 30.0, 40.0);
        let set = ReadingSet::assemble(1, 0, good, DerivedQuantities::compute(&good, &profile));
        assert!(set.is_sendable());
        assert!(set.quality().is_some());

        let no_echo = readings(7.75, 500.0, 30.0, 0.0);
        let derived = DerivedQuantities::compute(&no_echo, &profile);
        assert!(derived.quality.is_some());
        let set = ReadingSet::assemble(2, 0, no_echo, derived);
        assert!(!set.is_sendable());
        assert!(set.quality().is_none());
    }

    #[test]
    fn assemble_invalid_set_keeps_reason() {
        let set = ReadingSet::assemble(
            1,
            0,
            readings(7.0, 400.0, 30.0, 0.0),
            DerivedQuantities::default(),
        );
        assert!(!set.is_sendable());
        assert_eq!(set.reason(), "Distance out of range");
    }

    #[test]
    fn kind_metadata() {
        assert_eq!(QuantityKind::Tds.unit(), "ppm");
        assert_eq!(QuantityKind::Distance.channel(), Channel::Distance);
        assert_eq!(QuantityKind::Ph.fallback(), 7.0);
        assert_eq!(QuantityKind::ALL.len(), QuantityKind::COUNT);
    }
}
