//! Acquisition core for AquaSense water-quality stations
//!
//! Samples pH, TDS, turbidity and ultrasonic distance through an analog
//! frontend, converts them with calibration models, filters noise, rejects
//! implausible values, derives salinity and fill level, and hands complete
//! reading sets to a telemetry sink on a fixed schedule.
//!
//! Key constraints:
//! - Runs on a single-core microcontroller without an allocator
//! - One cycle at a time, driven by a cooperative poll loop
//! - A set is only sent when every reading is plausible
//!
//! ```no_run
//! use aquasense_core::{
//!     AcquisitionConfig, CalibrationProfile, ManualClock, Orchestrator,
//!     frontend::{AnalogFrontend, Channel, RawSample},
//!     sink::{Ack, TelemetrySink},
//!     ReadingSet, SinkError,
//! };
//!
//! struct Bench;
//! impl AnalogFrontend for Bench {
//!     fn sample(&mut self, channel: Channel) -> RawSample {
//!         match channel {
//!             Channel::Distance => RawSample::PulseWidth(2941),
//!             _ => RawSample::Voltage(2.5),
//!         }
//!     }
//! }
//!
//! struct Print;
//! impl TelemetrySink for Print {
//!     fn publish(&mut self, set: ReadingSet) -> Result<Ack, SinkError> {
//!         println!("pH {}", set.ph().value());
//!         Ok(Ack)
//!     }
//! }
//!
//! let clock = ManualClock::new(0);
//! let mut station = Orchestrator::new(
//!     Bench,
//!     &clock,
//!     clock.delay(),
//!     Print,
//!     CalibrationProfile::REFERENCE_PROBE,
//!     AcquisitionConfig::REFERENCE,
//! );
//! loop {
//!     station.poll();
//!     clock.advance_ms(100);
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[macro_use]
mod macros;

pub mod calibration;
pub mod config;
pub mod constants;
pub mod derived;
pub mod errors;
pub mod filter;
pub mod frontend;
pub mod orchestrator;
pub mod quality;
pub mod reading;
pub mod sink;
pub mod time;
pub mod traits;
pub mod validators;

// Public API
pub use calibration::CalibrationProfile;
pub use config::AcquisitionConfig;
pub use errors::{ConfigError, SinkError, ValidationError, ValidationResult};
pub use filter::{FilterStrategy, Filtered};
pub use orchestrator::{CycleOutcome, CycleReport, Orchestrator, PollOutcome};
pub use quality::{QualityAssessment, QualityCategory};
pub use reading::{PhysicalReading, QuantityKind, ReadingSet};
pub use sink::{Ack, ConnectivityMonitor, LinkStatus, TelemetrySink};
pub use time::{Delay, ManualClock, TimeSource, Timestamp};
pub use traits::Validator;

#[cfg(feature = "std")]
pub use time::{MonotonicClock, StdDelay};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
