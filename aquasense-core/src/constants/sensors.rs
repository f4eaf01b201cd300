//! Probe Conversion Constants and Plausibility Windows
//!
//! Values match the reference probe set: an analog pH board, a gravity TDS
//! probe, an optical turbidity module and an HC-SR04 class ultrasonic ranger,
//! all read through a 12-bit ADC with a 3.3 V reference.

// ===== ADC =====

/// ADC reference voltage (V).
pub const ADC_FULL_SCALE_V: f32 = 3.3;

/// Largest count of the 12-bit converter.
pub const ADC_MAX_COUNT: u16 = 4095;

// ===== pH =====

/// Lower bound of the pH plausibility window.
pub const PH_MIN: f32 = 0.0;

/// Upper bound of the pH plausibility window.
pub const PH_MAX: f32 = 14.0;

/// Neutral pH, reported by the probe at its reference voltage.
pub const PH_NEUTRAL: f32 = 7.0;

/// Probe output at pH 7 (V).
pub const PH_REFERENCE_VOLTAGE_V: f32 = 2.5;

/// Probe sensitivity (V per pH unit). Output falls as pH rises.
pub const PH_SLOPE_V_PER_PH: f32 = 0.18;

/// Additive trim applied after conversion.
pub const PH_OFFSET: f32 = 0.0;

/// Buffer solution used for the acidic point of a two-point calibration.
pub const PH_ACID_BUFFER: f32 = 4.0;

/// Reported when no pH sample survives rejection.
pub const PH_FALLBACK: f32 = PH_NEUTRAL;

// ===== TDS =====

/// Lower bound of the TDS plausibility window (ppm).
pub const TDS_MIN_PPM: f32 = 0.0;

/// Upper bound of the TDS plausibility window (ppm).
pub const TDS_MAX_PPM: f32 = 20_000.0;

/// Probe cell constant.
pub const TDS_K_VALUE: f32 = 0.5;

/// Temperature at which the polynomial was fitted (°C).
pub const TDS_REFERENCE_TEMP_C: f32 = 25.0;

/// Fractional conductivity change per °C away from the reference.
pub const TDS_TEMP_COEFFICIENT_PER_C: f32 = 0.02;

/// Cubic term of the voltage-to-ppm polynomial.
pub const TDS_POLY_CUBIC: f32 = 133.42;

/// Quadratic term of the voltage-to-ppm polynomial (subtracted).
pub const TDS_POLY_QUADRATIC: f32 = 255.86;

/// Linear term of the voltage-to-ppm polynomial.
pub const TDS_POLY_LINEAR: f32 = 857.39;

/// Reported when no TDS sample survives rejection (ppm).
pub const TDS_FALLBACK_PPM: f32 = 0.0;

// ===== TURBIDITY =====

/// Lower bound of the turbidity plausibility window (NTU).
pub const TURBIDITY_MIN_NTU: f32 = 0.0;

/// Upper bound of the turbidity plausibility window (NTU).
pub const TURBIDITY_MAX_NTU: f32 = 1000.0;

/// Module output in clear water (V). At or above this reads 0 NTU.
pub const TURBIDITY_CLEAR_VOLTAGE_V: f32 = 2.7;

/// Module output in saturated murky water (V). At or below this reads full scale.
pub const TURBIDITY_MURKY_VOLTAGE_V: f32 = 1.2;

/// Full scale of the percentage turbidity model.
pub const TURBIDITY_PERCENT_MAX: f32 = 100.0;

/// Reported when no turbidity sample survives rejection (NTU).
pub const TURBIDITY_FALLBACK_NTU: f32 = 0.0;

// ===== ULTRASONIC =====

/// Lower bound of the ranger's usable window (cm).
pub const DISTANCE_MIN_CM: f32 = 2.0;

/// Upper bound of the ranger's usable window (cm).
pub const DISTANCE_MAX_CM: f32 = 400.0;

/// Speed of sound in air at room temperature (cm/µs).
pub const SOUND_SPEED_CM_PER_US: f32 = 0.034;

/// Sentinel reported when the median distance is implausible (cm).
pub const DISTANCE_INVALID_CM: f32 = 0.0;

/// Interior height of the reference tank (cm).
pub const TANK_HEIGHT_CM: f32 = 100.0;

/// Depth of the ranger face below the tank rim (cm).
pub const SENSOR_OFFSET_CM: f32 = 5.0;

// ===== SALINITY =====

/// Empirical TDS-to-salinity factor (ppt per 1000 ppm).
pub const SALINITY_K: f32 = 0.57;
