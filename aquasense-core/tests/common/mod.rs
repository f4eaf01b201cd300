//! Shared fixtures for integration tests
//!
//! - [`ScriptedFrontend`]: replays per-channel raw samples, repeating a
//!   steady value once a script runs out
//! - [`RecordingSink`]: keeps every published set, can be told to fail
//! - [`ScriptedMonitor`]: replays link states
//! - helpers turning physical targets into raw samples
//! - [`capture_logs`]: records log lines emitted on the calling thread

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::sync::Once;

use aquasense_core::{
    constants::sensors::{PH_NEUTRAL, PH_REFERENCE_VOLTAGE_V, PH_SLOPE_V_PER_PH, SOUND_SPEED_CM_PER_US},
    frontend::{AnalogFrontend, Channel, RawSample},
    sink::{Ack, ConnectivityMonitor, LinkStatus, TelemetrySink},
    ReadingSet, SinkError,
};

/// Voltage the reference pH probe outputs at `ph`
pub fn volts_for_ph(ph: f32) -> f32 {
    PH_REFERENCE_VOLTAGE_V - (ph - PH_NEUTRAL) * PH_SLOPE_V_PER_PH
}

/// Echo width the reference ranger measures at `cm`
pub fn pulse_for_distance(cm: f32) -> u32 {
    (cm * 2.0 / SOUND_SPEED_CM_PER_US).round() as u32
}

/// TDS probe voltage giving 367.475 ppm at 25 °C
pub const TDS_ONE_VOLT: f32 = 1.0;

/// Turbidity voltage giving 500 NTU on the reference module
pub const TURBIDITY_HALF_SCALE_V: f32 = 1.95;

/// Frontend replaying scripted samples
#[derive(Debug, Default)]
pub struct ScriptedFrontend {
    scripts: HashMap<Channel, VecDeque<RawSample>>,
    steady: HashMap<Channel, RawSample>,
    taken: HashMap<Channel, usize>,
}

impl ScriptedFrontend {
    /// Healthy water: pH 7.5, ~367 ppm, 500 NTU, 50 cm
    pub fn healthy() -> Self {
        Self::default()
            .with_steady(Channel::Ph, RawSample::Voltage(volts_for_ph(7.5)))
            .with_steady(Channel::Tds, RawSample::Voltage(TDS_ONE_VOLT))
            .with_steady(Channel::Turbidity, RawSample::Voltage(TURBIDITY_HALF_SCALE_V))
            .with_steady(Channel::Distance, RawSample::PulseWidth(pulse_for_distance(50.0)))
    }

    /// Sample returned once a channel's script is exhausted
    pub fn with_steady(mut self, channel: Channel, sample: RawSample) -> Self {
        self.steady.insert(channel, sample);
        self
    }

    /// Replace the steady sample of a channel
    pub fn set_steady(&mut self, channel: Channel, sample: RawSample) {
        self.steady.insert(channel, sample);
    }

    /// Queue samples on a channel ahead of the steady value
    pub fn script(&mut self, channel: Channel, samples: impl IntoIterator<Item = RawSample>) {
        self.scripts.entry(channel).or_default().extend(samples);
    }

    /// Samples taken on a channel so far
    pub fn taken(&self, channel: Channel) -> usize {
        self.taken.get(&channel).copied().unwrap_or(0)
    }
}

impl AnalogFrontend for ScriptedFrontend {
    fn sample(&mut self, channel: Channel) -> RawSample {
        *self.taken.entry(channel).or_default() += 1;
        if let Some(sample) = self.scripts.get_mut(&channel).and_then(VecDeque::pop_front) {
            return sample;
        }
        match self.steady.get(&channel) {
            Some(sample) => *sample,
            None if channel.is_pulse() => RawSample::TIMEOUT,
            None => RawSample::Voltage(0.0),
        }
    }
}

/// Sink recording every published set
#[derive(Debug)]
pub struct RecordingSink {
    pub published: Vec<ReadingSet>,
    pub attempts: usize,
    pub ready: bool,
    failures: VecDeque<SinkError>,
    fail_always: Option<SinkError>,
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self {
            published: Vec::new(),
            attempts: 0,
            ready: true,
            failures: VecDeque::new(),
            fail_always: None,
        }
    }
}

impl RecordingSink {
    /// Fail the next `n` publishes with `err`
    pub fn fail_next(&mut self, n: usize, err: SinkError) {
        self.failures.extend(std::iter::repeat(err).take(n));
    }

    /// Fail every publish until cleared
    pub fn fail_always(&mut self, err: Option<SinkError>) {
        self.fail_always = err;
    }
}

impl TelemetrySink for RecordingSink {
    fn publish(&mut self, readings: ReadingSet) -> Result<Ack, SinkError> {
        self.attempts += 1;
        if let Some(err) = self.failures.pop_front().or(self.fail_always) {
            return Err(err);
        }
        self.published.push(readings);
        Ok(Ack)
    }

    fn is_ready(&self) -> bool {
        self.ready
    }
}

/// Monitor replaying link states, `Up` once the script runs out
#[derive(Debug, Default)]
pub struct ScriptedMonitor {
    pub states: VecDeque<LinkStatus>,
    pub checks: usize,
}

impl ScriptedMonitor {
    pub fn new(states: impl IntoIterator<Item = LinkStatus>) -> Self {
        Self { states: states.into_iter().collect(), checks: 0 }
    }
}

impl ConnectivityMonitor for ScriptedMonitor {
    fn check(&mut self) -> LinkStatus {
        self.checks += 1;
        self.states.pop_front().unwrap_or(LinkStatus::Up)
    }
}

/// Assert two floats agree within `tol`
pub fn assert_close(actual: f32, expected: f32, tol: f32) {
    assert!(
        (actual - expected).abs() <= tol,
        "expected {} ± {}, got {}",
        expected,
        tol,
        actual
    );
}

thread_local! {
    static CAPTURED: RefCell<Option<Vec<(log::Level, String)>>> = RefCell::new(None);
}

struct ThreadCapture;

impl log::Log for ThreadCapture {
    fn enabled(&self, _: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        CAPTURED.with(|captured| {
            if let Some(lines) = captured.borrow_mut().as_mut() {
                lines.push((record.level(), record.args().to_string()));
            }
        });
    }

    fn flush(&self) {}
}

static LOGGER: ThreadCapture = ThreadCapture;
static INSTALL: Once = Once::new();

/// Run `f`, returning its result and the log lines it emitted on this thread
pub fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, Vec<(log::Level, String)>) {
    INSTALL.call_once(|| {
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(log::LevelFilter::Trace);
    });
    CAPTURED.with(|captured| *captured.borrow_mut() = Some(Vec::new()));
    let result = f();
    let lines = CAPTURED.with(|captured| captured.borrow_mut().take()).unwrap_or_default();
    (result, lines)
}
