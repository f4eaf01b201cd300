//! Noise-reduction filters
//!
//! Every physical reading is the result of a short burst of samples:
//!
//! - **Mean with rejection** (analog probes): take N samples, drop those
//!   outside the plausibility window, average the rest. If nothing survives,
//!   report the quantity's fallback value.
//! - **Median of N** (ultrasonic): take N samples, sort, pick the middle. A
//!   single spike or timeout in three samples cannot move the result. An
//!   implausible median reports the fallback, 0 cm for distance.
//!
//! A settle delay follows each sample so the probe output can recover.
//! Samples are held in a fixed stack buffer; no allocation.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use heapless::Vec;

use crate::{
    constants::{
        buffers::{MAX_FILTER_SAMPLES, MEAN_FILTER_SAMPLES, MEDIAN_FILTER_SAMPLES},
        time::{MEAN_FILTER_SETTLE_MS, MEDIAN_FILTER_SETTLE_MS},
    },
    reading::QuantityKind,
    time::Delay,
    validators,
};

/// Result of filtering one burst
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Filtered {
    /// Derived from at least one sample
    Measured(f32),
    /// No usable sample; the quantity's fallback value
    Fallback(f32),
}

impl Filtered {
    /// Reported value
    pub fn value(&self) -> f32 {
        match *self {
            Self::Measured(v) | Self::Fallback(v) => v,
        }
    }

    /// Whether the value is a fallback
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }

    /// Value, unless it is a fallback
    pub fn measured(&self) -> Option<f32> {
        match *self {
            Self::Measured(v) => Some(v),
            Self::Fallback(_) => None,
        }
    }
}

/// How a burst of samples is reduced to one value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FilterStrategy {
    /// Average of the in-range samples
    MeanWithRejection {
        /// Samples per burst
        samples: u8,
        /// Delay after each sample (ms)
        settle_ms: u32,
    },
    /// Middle value of the sorted samples
    ///
    /// Configs reject even counts. Applied directly with an even count, the
    /// upper of the two middle values is taken.
    MedianOfN {
        /// Samples per burst
        samples: u8,
        /// Delay after each sample (ms)
        settle_ms: u32,
    },
}

impl FilterStrategy {
    /// Five samples, 10 ms apart
    pub const MEAN_OF_FIVE: Self = Self::MeanWithRejection {
        samples: MEAN_FILTER_SAMPLES,
        settle_ms: MEAN_FILTER_SETTLE_MS,
    };

    /// Three samples, 50 ms apart
    pub const MEDIAN_OF_THREE: Self = Self::MedianOfN {
        samples: MEDIAN_FILTER_SAMPLES,
        settle_ms: MEDIAN_FILTER_SETTLE_MS,
    };

    /// Samples per burst, clamped to `1..=MAX_FILTER_SAMPLES`
    pub fn samples(&self) -> usize {
        let n = match *self {
            Self::MeanWithRejection { samples, .. } | Self::MedianOfN { samples, .. } => samples,
        };
        usize::from(n).clamp(1, MAX_FILTER_SAMPLES)
    }

    /// Delay after each sample (ms)
    pub fn settle_ms(&self) -> u32 {
        match *self {
            Self::MeanWithRejection { settle_ms, .. } | Self::MedianOfN { settle_ms, .. } => {
                settle_ms
            }
        }
    }

    /// Shortest settle delay the strategy tolerates (ms)
    pub fn min_settle_ms(&self) -> u32 {
        match self {
            Self::MeanWithRejection { .. } => MEAN_FILTER_SETTLE_MS,
            Self::MedianOfN { .. } => MEDIAN_FILTER_SETTLE_MS,
        }
    }

    /// Total settle time for one burst (ms)
    pub fn burst_ms(&self) -> u64 {
        self.samples() as u64 * u64::from(self.settle_ms())
    }

    /// Run one burst for `kind`, pulling physical samples from `next`
    pub fn apply<S, D>(&self, kind: QuantityKind, next: S, delay: &mut D) -> Filtered
    where
        S: FnMut() -> f32,
        D: Delay + ?Sized,
    {
        match self {
            Self::MeanWithRejection { .. } => self.mean_with_rejection(kind, next, delay),
            Self::MedianOfN { .. } => self.median(kind, next, delay),
        }
    }

    fn mean_with_rejection<S, D>(&self, kind: QuantityKind, mut next: S, delay: &mut D) -> Filtered
    where
        S: FnMut() -> f32,
        D: Delay + ?Sized,
    {
        let mut sum = 0.0f32;
        let mut kept = 0u32;
        for _ in 0..self.samples() {
            let value = next();
            if validators::is_valid(kind, value) {
                sum += value;
                kept += 1;
            }
            delay.delay_ms(self.settle_ms());
        }

        if kept == 0 {
            log_debug!("{}: all {} samples rejected", kind.name(), self.samples() as u32);
            Filtered::Fallback(kind.fallback())
        } else {
            Filtered::Measured(sum / kept as f32)
        }
    }

    fn median<S, D>(&self, kind: QuantityKind, mut next: S, delay: &mut D) -> Filtered
    where
        S: FnMut() -> f32,
        D: Delay + ?Sized,
    {
        let mut buf: Vec<f32, MAX_FILTER_SAMPLES> = Vec::new();
        for _ in 0..self.samples() {
            // samples() never exceeds the buffer capacity.
            let _ = buf.push(next());
            delay.delay_ms(self.settle_ms());
        }

        buf.sort_unstable_by(f32::total_cmp);
        let median = buf[buf.len() / 2];

        if validators::is_valid(kind, median) {
            Filtered::Measured(median)
        } else {
            log_debug!("{}: median {} implausible", kind.name(), median);
            Filtered::Fallback(kind.fallback())
        }
    }
}
