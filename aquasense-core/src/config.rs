//! Acquisition schedule and filter configuration

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    constants::{
        buffers::{DEFAULT_ESCALATION_THRESHOLD, MAX_FILTER_SAMPLES},
        time::{DEFAULT_HEALTH_CHECK_PERIOD_MS, DEFAULT_SAMPLE_PERIOD_MS},
    },
    errors::ConfigError,
    filter::FilterStrategy,
    reading::QuantityKind,
};

/// How often to sample, how to filter, when to give up on the sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AcquisitionConfig {
    /// Minimum time between cycle starts (ms)
    pub sample_period_ms: u64,
    /// Minimum time between connectivity checks (ms)
    pub health_period_ms: u64,
    /// Consecutive sink failures tolerated before escalation
    pub escalation_threshold: u32,
    /// Filter for the pH probe
    pub ph_filter: FilterStrategy,
    /// Filter for the TDS probe
    pub tds_filter: FilterStrategy,
    /// Filter for the turbidity module
    pub turbidity_filter: FilterStrategy,
    /// Filter for the ultrasonic ranger
    pub distance_filter: FilterStrategy,
}

impl AcquisitionConfig {
    /// Reference firmware schedule: 3 s cycles, 10 s link checks,
    /// mean-of-5 on analog probes, median-of-3 on distance
    pub const REFERENCE: Self = Self {
        sample_period_ms: DEFAULT_SAMPLE_PERIOD_MS,
        health_period_ms: DEFAULT_HEALTH_CHECK_PERIOD_MS,
        escalation_threshold: DEFAULT_ESCALATION_THRESHOLD,
        ph_filter: FilterStrategy::MEAN_OF_FIVE,
        tds_filter: FilterStrategy::MEAN_OF_FIVE,
        turbidity_filter: FilterStrategy::MEAN_OF_FIVE,
        distance_filter: FilterStrategy::MEDIAN_OF_THREE,
    };

    /// Validated config with custom periods and reference filters
    pub fn new_with_periods(
        sample_period_ms: u64,
        health_period_ms: u64,
    ) -> Result<Self, ConfigError> {
        let config = Self { sample_period_ms, health_period_ms, ..Self::REFERENCE };
        config.validate()?;
        Ok(config)
    }

    /// Replace the escalation threshold
    pub const fn with_escalation_threshold(mut self, threshold: u32) -> Self {
        self.escalation_threshold = threshold;
        self
    }

    /// Replace the filter for one quantity
    pub fn with_filter(mut self, kind: QuantityKind, filter: FilterStrategy) -> Self {
        match kind {
            QuantityKind::Ph => self.ph_filter = filter,
            QuantityKind::Tds => self.tds_filter = filter,
            QuantityKind::Turbidity => self.turbidity_filter = filter,
            QuantityKind::Distance => self.distance_filter = filter,
        }
        self
    }

    /// Filter used for `kind`
    pub fn filter_for(&self, kind: QuantityKind) -> FilterStrategy {
        match kind {
            QuantityKind::Ph => self.ph_filter,
            QuantityKind::Tds => self.tds_filter,
            QuantityKind::Turbidity => self.turbidity_filter,
            QuantityKind::Distance => self.distance_filter,
        }
    }

    /// Settle time of one full cycle (ms)
    pub fn cycle_burst_ms(&self) -> u64 {
        QuantityKind::ALL
            .iter()
            .map(|kind| self.filter_for(*kind).burst_ms())
            .sum()
    }

    /// Check periods and filters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_period_ms == 0 {
            return Err(ConfigError::InvalidConstant {
                field: "sample_period_ms",
                reason: "must be positive",
            });
        }
        if self.health_period_ms == 0 {
            return Err(ConfigError::InvalidConstant {
                field: "health_period_ms",
                reason: "must be positive",
            });
        }
        for kind in QuantityKind::ALL {
            let filter = self.filter_for(kind);
            let samples = match filter {
                FilterStrategy::MeanWithRejection { samples, .. }
                | FilterStrategy::MedianOfN { samples, .. } => usize::from(samples),
            };
            if samples == 0 || samples > MAX_FILTER_SAMPLES {
                return Err(ConfigError::SampleCount {
                    field: "filter.samples",
                    samples,
                    max: MAX_FILTER_SAMPLES,
                });
            }
            if matches!(filter, FilterStrategy::MedianOfN { .. }) && samples % 2 == 0 {
                return Err(ConfigError::InvalidConstant {
                    field: "filter.samples",
                    reason: "median needs an odd sample count",
                });
            }
            if filter.settle_ms() < filter.min_settle_ms() {
                return Err(ConfigError::InvalidConstant {
                    field: "filter.settle_ms",
                    reason: "below the probe settle time",
                });
            }
        }
        if self.cycle_burst_ms() >= self.sample_period_ms {
            return Err(ConfigError::InvalidConstant {
                field: "sample_period_ms",
                reason: "shorter than one acquisition burst",
            });
        }
        Ok(())
    }

    /// Parse and validate a config from JSON; missing fields take reference values
    #[cfg(feature = "std")]
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|e| ConfigError::Parse {
            line: e.line(),
            column: e.column(),
        })?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self::REFERENCE
    }
}
