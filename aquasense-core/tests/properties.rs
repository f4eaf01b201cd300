//! Property tests for calibration, filtering and set validation

use aquasense_core::{
    calibration::{PhCalibration, TdsCalibration, TurbidityCalibration},
    derived::DerivedQuantities,
    validators, CalibrationProfile, FilterStrategy, Filtered, ManualClock, PhysicalReading,
    QuantityKind, ReadingSet,
};
use proptest::prelude::*;

fn run_filter(strategy: FilterStrategy, kind: QuantityKind, samples: &[f32]) -> Filtered {
    let clock = ManualClock::new(0);
    let mut delay = clock.delay();
    let mut it = samples.iter().copied();
    strategy.apply(kind, || it.next().unwrap_or(f32::NAN), &mut delay)
}

proptest! {
    #[test]
    fn ph_decreases_as_voltage_rises(v1 in 0.0f32..3.3, v2 in 0.0f32..3.3) {
        prop_assume!(v2 - v1 > 1e-3);
        let ph = PhCalibration::REFERENCE;
        prop_assert!(ph.ph_from_voltage(v1) > ph.ph_from_voltage(v2));
    }

    #[test]
    fn ph_at_reference_voltage_is_neutral_plus_offset(offset in -1.0f32..1.0) {
        let ph = PhCalibration::REFERENCE.with_offset(offset);
        prop_assert_eq!(ph.ph_from_voltage(2.5), 7.0 + offset);
    }

    #[test]
    fn turbidity_never_rises_with_voltage(v1 in -1.0f32..4.0, v2 in -1.0f32..4.0) {
        prop_assume!(v1 < v2);
        let t = TurbidityCalibration::REFERENCE;
        prop_assert!(t.turbidity_from_voltage(v1) >= t.turbidity_from_voltage(v2));
    }

    #[test]
    fn turbidity_saturates_outside_clear_and_murky(v in -1.0f32..4.0) {
        let t = TurbidityCalibration::REFERENCE;
        let ntu = t.turbidity_from_voltage(v);
        if v >= 2.7 {
            prop_assert_eq!(ntu, 0.0);
        } else if v <= 1.2 {
            prop_assert_eq!(ntu, 1000.0);
        } else {
            prop_assert!(ntu > 0.0 && ntu < 1000.0);
        }
    }

    #[test]
    fn tds_never_negative(v in -5.0f32..5.0, temp in 0.0f32..40.0) {
        let tds = TdsCalibration { temperature_c: temp, ..TdsCalibration::REFERENCE };
        prop_assert!(tds.ppm_from_voltage(v) >= 0.0);
    }

    #[test]
    fn median_of_three_ignores_one_outlier(
        d in 2.0f32..400.0,
        outlier in -100.0f32..1000.0,
        position in 0usize..3,
    ) {
        let mut samples = [d; 3];
        samples[position] = outlier;
        let f = run_filter(FilterStrategy::MEDIAN_OF_THREE, QuantityKind::Distance, &samples);
        prop_assert_eq!(f, Filtered::Measured(d));
    }

    #[test]
    fn mean_uses_only_in_range_samples(
        good in proptest::collection::vec(0.0f32..14.0, 0..=5),
        bad in proptest::collection::vec(prop_oneof![-50.0f32..-0.01, 14.01f32..50.0], 5),
    ) {
        let mut samples = good.clone();
        samples.extend(bad.iter().take(5 - good.len()));
        let f = run_filter(FilterStrategy::MEAN_OF_FIVE, QuantityKind::Ph, &samples);

        if good.is_empty() {
            prop_assert_eq!(f, Filtered::Fallback(7.0));
        } else {
            let expected = good.iter().sum::<f32>() / good.len() as f32;
            prop_assert!((f.value() - expected).abs() < 1e-4);
            prop_assert!(!f.is_fallback());
        }
    }

    #[test]
    fn sendable_iff_every_reading_in_range(
        ph in -5.0f32..20.0,
        tds in -100.0f32..25_000.0,
        turbidity in -50.0f32..1200.0,
        distance in 0.0f32..450.0,
    ) {
        let readings = [
            PhysicalReading::measured(QuantityKind::Ph, ph),
            PhysicalReading::measured(QuantityKind::Tds, tds),
            PhysicalReading::measured(QuantityKind::Turbidity, turbidity),
            PhysicalReading::measured(QuantityKind::Distance, distance),
        ];
        let derived = DerivedQuantities::compute(&readings, &CalibrationProfile::REFERENCE_PROBE);
        let set = ReadingSet::assemble(1, 0, readings, derived);

        let failed: Vec<QuantityKind> = readings
            .iter()
            .filter(|r| !validators::is_valid(r.kind(), r.value()))
            .map(|r| r.kind())
            .collect();

        prop_assert_eq!(set.is_sendable(), failed.is_empty());
        prop_assert_eq!(set.salinity_ppt().is_some(), validators::is_valid(QuantityKind::Tds, tds));
        for kind in QuantityKind::ALL {
            let named = set.reason().contains(&format!("{} out of range", kind.name()));
            prop_assert_eq!(named, failed.contains(&kind));
        }
    }
}
