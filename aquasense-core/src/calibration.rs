//! Calibration models: raw samples to physical units
//!
//! Each probe has a small model turning a voltage (or pulse width) into its
//! physical quantity. The models are pure functions of the sample and the
//! [`CalibrationProfile`] constants.
//!
//! ## Models
//!
//! ```text
//! pH         pH  = 7 + (V_ref − V) / slope + offset
//! TDS        Vc  = V / (1 + 0.02·(T − 25))
//!            ppm = (133.42·Vc³ − 255.86·Vc² + 857.39·Vc) · K, floored at 0
//! Turbidity  V ≥ V_clear → 0 NTU, V ≤ V_murky → 1000 NTU, linear between
//! Distance   cm  = pulse_µs · 0.034 / 2
//! ```
//!
//! pH may alternatively be calibrated from two buffer solutions, and
//! turbidity may be reported as an ADC-relative percentage. Both variants are
//! selected through the profile.
//!
//! ## Loading
//!
//! Profiles are `const` presets adjusted with `with_*` builders. Hosted
//! builds may load them from JSON once at startup:
//!
//! ```rust
//! # #[cfg(feature = "std")] {
//! use aquasense_core::CalibrationProfile;
//!
//! let profile = CalibrationProfile::from_json(r#"{
//!     "ph": { "model": { "two_point": { "ph4_voltage_v": 3.04, "ph7_voltage_v": 2.5 } }, "offset": 0.0 },
//!     "tds": { "k_value": 0.5, "temperature_c": 25.0 },
//!     "turbidity": { "voltage_ntu": { "clear_voltage_v": 2.7, "murky_voltage_v": 1.2 } },
//!     "distance": { "sound_speed_cm_per_us": 0.034 },
//!     "tank": { "height_cm": 100.0, "sensor_offset_cm": 5.0 },
//!     "salinity_k": 0.57
//! }"#).unwrap();
//! assert!((profile.ph.ph_from_voltage(2.5) - 7.0).abs() < 1e-6);
//! # }
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    constants::sensors::{
        PH_ACID_BUFFER, PH_NEUTRAL, PH_OFFSET, PH_REFERENCE_VOLTAGE_V, PH_SLOPE_V_PER_PH,
        SALINITY_K, SENSOR_OFFSET_CM, SOUND_SPEED_CM_PER_US, TANK_HEIGHT_CM,
        TDS_K_VALUE, TDS_POLY_CUBIC, TDS_POLY_LINEAR, TDS_POLY_QUADRATIC,
        TDS_REFERENCE_TEMP_C, TDS_TEMP_COEFFICIENT_PER_C, TURBIDITY_CLEAR_VOLTAGE_V,
        TURBIDITY_MAX_NTU, TURBIDITY_MIN_NTU, TURBIDITY_MURKY_VOLTAGE_V,
        TURBIDITY_PERCENT_MAX, ADC_FULL_SCALE_V,
    },
    errors::ConfigError,
    frontend::{Channel, RawSample},
};

/// How the pH line is defined
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PhModel {
    /// Probe voltage at pH 7 and sensitivity in V per pH unit
    Reference {
        /// Output at pH 7 (V)
        reference_voltage_v: f32,
        /// Volts per pH unit; output falls as pH rises
        slope_v_per_ph: f32,
    },
    /// Voltages measured in pH 4 and pH 7 buffer solutions
    TwoPoint {
        /// Output in the pH 4 buffer (V)
        ph4_voltage_v: f32,
        /// Output in the pH 7 buffer (V)
        ph7_voltage_v: f32,
    },
}

/// pH probe calibration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PhCalibration {
    /// Line definition
    pub model: PhModel,
    /// Additive trim applied after conversion
    pub offset: f32,
}

impl PhCalibration {
    /// Reference board: 2.5 V at pH 7, 0.18 V per pH unit
    pub const REFERENCE: Self = Self {
        model: PhModel::Reference {
            reference_voltage_v: PH_REFERENCE_VOLTAGE_V,
            slope_v_per_ph: PH_SLOPE_V_PER_PH,
        },
        offset: PH_OFFSET,
    };

    /// Calibration from pH 4 and pH 7 buffer voltages
    pub const fn two_point(ph4_voltage_v: f32, ph7_voltage_v: f32) -> Self {
        Self {
            model: PhModel::TwoPoint { ph4_voltage_v, ph7_voltage_v },
            offset: PH_OFFSET,
        }
    }

    /// Replace the trim
    pub const fn with_offset(mut self, offset: f32) -> Self {
        self.offset = offset;
        self
    }

    /// Voltage at pH 7 and volts per pH unit
    pub fn line(&self) -> (f32, f32) {
        match self.model {
            PhModel::Reference { reference_voltage_v, slope_v_per_ph } => {
                (reference_voltage_v, slope_v_per_ph)
            }
            PhModel::TwoPoint { ph4_voltage_v, ph7_voltage_v } => (
                ph7_voltage_v,
                (ph4_voltage_v - ph7_voltage_v) / (PH_NEUTRAL - PH_ACID_BUFFER),
            ),
        }
    }

    /// Convert a probe voltage to pH
    pub fn ph_from_voltage(&self, volts: f32) -> f32 {
        let (reference, slope) = self.line();
        PH_NEUTRAL + (reference - volts) / slope + self.offset
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let (reference, slope) = self.line();
        if !reference.is_finite() || !self.offset.is_finite() {
            return Err(ConfigError::InvalidConstant {
                field: "ph",
                reason: "constants must be finite",
            });
        }
        if !slope.is_finite() || slope <= 0.0 {
            return Err(ConfigError::InvalidConstant {
                field: "ph",
                reason: "slope must be positive (pH 4 voltage above pH 7 voltage)",
            });
        }
        Ok(())
    }
}

impl Default for PhCalibration {
    fn default() -> Self {
        Self::REFERENCE
    }
}

/// TDS probe calibration with temperature compensation
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TdsCalibration {
    /// Probe cell constant
    pub k_value: f32,
    /// Water temperature used for compensation (°C)
    pub temperature_c: f32,
}

impl TdsCalibration {
    /// Reference probe at 25 °C
    pub const REFERENCE: Self = Self {
        k_value: TDS_K_VALUE,
        temperature_c: TDS_REFERENCE_TEMP_C,
    };

    /// Conductivity correction for the configured temperature
    pub fn compensation_coefficient(&self) -> f32 {
        1.0 + TDS_TEMP_COEFFICIENT_PER_C * (self.temperature_c - TDS_REFERENCE_TEMP_C)
    }

    /// Probe voltage corrected to the reference temperature
    pub fn compensated_voltage(&self, volts: f32) -> f32 {
        volts / self.compensation_coefficient()
    }

    /// Convert a probe voltage to ppm
    ///
    /// Negative polynomial results are floored at 0; NaN passes through so
    /// validation can reject it.
    pub fn ppm_from_voltage(&self, volts: f32) -> f32 {
        let v = self.compensated_voltage(volts);
        let ppm = (TDS_POLY_CUBIC * v * v * v - TDS_POLY_QUADRATIC * v * v + TDS_POLY_LINEAR * v)
            * self.k_value;
        if ppm < 0.0 { 0.0 } else { ppm }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.k_value.is_finite() || self.k_value <= 0.0 {
            return Err(ConfigError::InvalidConstant {
                field: "tds.k_value",
                reason: "must be positive",
            });
        }
        let coefficient = self.compensation_coefficient();
        if !coefficient.is_finite() || coefficient <= 0.0 {
            return Err(ConfigError::InvalidConstant {
                field: "tds.temperature_c",
                reason: "compensation coefficient must be positive",
            });
        }
        Ok(())
    }
}

impl Default for TdsCalibration {
    fn default() -> Self {
        Self::REFERENCE
    }
}

/// Turbidity mapping
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TurbidityCalibration {
    /// Piecewise linear NTU between a clear and a murky voltage
    VoltageNtu {
        /// Output in clear water (V)
        clear_voltage_v: f32,
        /// Output in saturated murky water (V)
        murky_voltage_v: f32,
    },
    /// Percentage of ADC full scale, 0 % at full scale and 100 % at 0 V
    AdcPercent {
        /// Voltage at full scale (V)
        full_scale_v: f32,
    },
}

impl TurbidityCalibration {
    /// Reference module: 2.7 V clear, 1.2 V murky
    pub const REFERENCE: Self = Self::VoltageNtu {
        clear_voltage_v: TURBIDITY_CLEAR_VOLTAGE_V,
        murky_voltage_v: TURBIDITY_MURKY_VOLTAGE_V,
    };

    /// Percentage model on a 3.3 V converter
    pub const ADC_PERCENT: Self = Self::AdcPercent { full_scale_v: ADC_FULL_SCALE_V };

    /// Convert a module voltage to turbidity
    pub fn turbidity_from_voltage(&self, volts: f32) -> f32 {
        match *self {
            Self::VoltageNtu { clear_voltage_v, murky_voltage_v } => {
                if volts >= clear_voltage_v {
                    TURBIDITY_MIN_NTU
                } else if volts <= murky_voltage_v {
                    TURBIDITY_MAX_NTU
                } else {
                    (clear_voltage_v - volts) / (clear_voltage_v - murky_voltage_v)
                        * TURBIDITY_MAX_NTU
                }
            }
            Self::AdcPercent { full_scale_v } => {
                ((1.0 - volts / full_scale_v) * TURBIDITY_PERCENT_MAX)
                    .clamp(0.0, TURBIDITY_PERCENT_MAX)
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            Self::VoltageNtu { clear_voltage_v, murky_voltage_v } => {
                if !clear_voltage_v.is_finite() || !murky_voltage_v.is_finite() {
                    return Err(ConfigError::InvalidConstant {
                        field: "turbidity",
                        reason: "voltages must be finite",
                    });
                }
                if clear_voltage_v <= murky_voltage_v {
                    return Err(ConfigError::InvalidConstant {
                        field: "turbidity",
                        reason: "clear voltage must exceed murky voltage",
                    });
                }
            }
            Self::AdcPercent { full_scale_v } => {
                if !full_scale_v.is_finite() || full_scale_v <= 0.0 {
                    return Err(ConfigError::InvalidConstant {
                        field: "turbidity.full_scale_v",
                        reason: "must be positive",
                    });
                }
            }
        }
        Ok(())
    }
}

impl Default for TurbidityCalibration {
    fn default() -> Self {
        Self::REFERENCE
    }
}

/// Ultrasonic time-of-flight conversion
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DistanceCalibration {
    /// Speed of sound (cm/µs)
    pub sound_speed_cm_per_us: f32,
}

impl DistanceCalibration {
    /// Air at room temperature
    pub const REFERENCE: Self = Self { sound_speed_cm_per_us: SOUND_SPEED_CM_PER_US };

    /// One-way distance for a round-trip echo time. A 0 µs timeout maps to 0 cm.
    pub fn distance_from_pulse(&self, pulse_us: u32) -> f32 {
        pulse_us as f32 * self.sound_speed_cm_per_us / 2.0
    }
}

impl Default for DistanceCalibration {
    fn default() -> Self {
        Self::REFERENCE
    }
}

/// Tank the ranger looks down into
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TankGeometry {
    /// Interior height (cm)
    pub height_cm: f32,
    /// Ranger face below the tank rim (cm)
    pub sensor_offset_cm: f32,
}

impl TankGeometry {
    /// Reference 100 cm tank with the ranger 5 cm below the rim
    pub const REFERENCE: Self = Self {
        height_cm: TANK_HEIGHT_CM,
        sensor_offset_cm: SENSOR_OFFSET_CM,
    };
}

impl Default for TankGeometry {
    fn default() -> Self {
        Self::REFERENCE
    }
}

/// Every constant the calibration models need
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CalibrationProfile {
    /// pH probe
    pub ph: PhCalibration,
    /// TDS probe
    pub tds: TdsCalibration,
    /// Turbidity module
    pub turbidity: TurbidityCalibration,
    /// Ultrasonic ranger
    pub distance: DistanceCalibration,
    /// Tank for fill level
    pub tank: TankGeometry,
    /// Salinity factor (ppt per 1000 ppm TDS)
    pub salinity_k: f32,
}

impl CalibrationProfile {
    /// Constants of the deployed reference probe set
    pub const REFERENCE_PROBE: Self = Self {
        ph: PhCalibration::REFERENCE,
        tds: TdsCalibration::REFERENCE,
        turbidity: TurbidityCalibration::REFERENCE,
        distance: DistanceCalibration::REFERENCE,
        tank: TankGeometry::REFERENCE,
        salinity_k: SALINITY_K,
    };

    /// Replace the pH calibration
    pub const fn with_ph(mut self, ph: PhCalibration) -> Self {
        self.ph = ph;
        self
    }

    /// Replace the TDS calibration
    pub const fn with_tds(mut self, tds: TdsCalibration) -> Self {
        self.tds = tds;
        self
    }

    /// Set the water temperature used for TDS compensation
    pub const fn with_water_temperature(mut self, temperature_c: f32) -> Self {
        self.tds.temperature_c = temperature_c;
        self
    }

    /// Replace the turbidity mapping
    pub const fn with_turbidity(mut self, turbidity: TurbidityCalibration) -> Self {
        self.turbidity = turbidity;
        self
    }

    /// Replace the ranger calibration
    pub const fn with_distance(mut self, distance: DistanceCalibration) -> Self {
        self.distance = distance;
        self
    }

    /// Replace the tank geometry
    pub const fn with_tank(mut self, tank: TankGeometry) -> Self {
        self.tank = tank;
        self
    }

    /// Replace the salinity factor
    pub const fn with_salinity_k(mut self, salinity_k: f32) -> Self {
        self.salinity_k = salinity_k;
        self
    }

    /// Convert a raw sample from `channel` to its physical value
    ///
    /// A sample of the wrong shape for the channel (a voltage on the ranger,
    /// a pulse on an analog probe) converts to NaN, which never validates.
    pub fn convert(&self, channel: Channel, sample: RawSample) -> f32 {
        match (channel, sample) {
            (Channel::Ph, RawSample::Voltage(v)) => self.ph.ph_from_voltage(v),
            (Channel::Tds, RawSample::Voltage(v)) => self.tds.ppm_from_voltage(v),
            (Channel::Turbidity, RawSample::Voltage(v)) => self.turbidity.turbidity_from_voltage(v),
            (Channel::Distance, RawSample::PulseWidth(us)) => self.distance.distance_from_pulse(us),
            _ => f32::NAN,
        }
    }

    /// Check that no constant makes a conversion degenerate
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ph.validate()?;
        self.tds.validate()?;
        self.turbidity.validate()?;

        let speed = self.distance.sound_speed_cm_per_us;
        if !speed.is_finite() || speed <= 0.0 {
            return Err(ConfigError::InvalidConstant {
                field: "distance.sound_speed_cm_per_us",
                reason: "must be positive",
            });
        }
        if !self.tank.height_cm.is_finite()
            || !self.tank.sensor_offset_cm.is_finite()
            || self.tank.height_cm <= 0.0
            || self.tank.sensor_offset_cm < 0.0
            || self.tank.sensor_offset_cm >= self.tank.height_cm
        {
            return Err(ConfigError::InvalidConstant {
                field: "tank",
                reason: "offset must lie in [0, height)",
            });
        }
        if !self.salinity_k.is_finite() || self.salinity_k <= 0.0 {
            return Err(ConfigError::InvalidConstant {
                field: "salinity_k",
                reason: "must be positive",
            });
        }
        Ok(())
    }

    /// Parse and validate a profile from JSON
    #[cfg(feature = "std")]
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let profile: Self = serde_json::from_str(json).map_err(|e| ConfigError::Parse {
            line: e.line(),
            column: e.column(),
        })?;
        profile.validate()?;
        Ok(profile)
    }
}

impl Default for CalibrationProfile {
    fn default() -> Self {
        Self::REFERENCE_PROBE
    }
}
