//! Analog frontend: raw samples from the probes
//!
//! The acquisition core never touches hardware directly. It asks an
//! [`AnalogFrontend`] for one [`RawSample`] per call on a [`Channel`]:
//!
//! ```text
//! Channel::Ph / Tds / Turbidity  →  RawSample::Voltage(V)
//! Channel::Distance              →  RawSample::PulseWidth(µs), 0 on timeout
//! ```
//!
//! [`SensorFrontend`] is the reference implementation for boards with a
//! multi-channel ADC ([`AdcReader`]) and an HC-SR04 class ranger wired to two
//! GPIOs ([`EchoPins`]). Tests substitute scripted frontends.

use crate::{
    constants::{
        sensors::{ADC_FULL_SCALE_V, ADC_MAX_COUNT},
        time::{ECHO_TIMEOUT_US, TRIGGER_PULSE_US, TRIGGER_SETTLE_US},
    },
    time::{Delay, MicrosSource},
};

/// Input channel of the frontend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// pH probe, analog voltage
    Ph,
    /// TDS probe, analog voltage
    Tds,
    /// Turbidity module, analog voltage
    Turbidity,
    /// Ultrasonic ranger, echo pulse width
    Distance,
}

impl Channel {
    /// Whether this channel yields pulse widths rather than voltages
    pub const fn is_pulse(&self) -> bool {
        matches!(self, Self::Distance)
    }

    /// Short name for logs
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Ph => "ph",
            Self::Tds => "tds",
            Self::Turbidity => "turbidity",
            Self::Distance => "distance",
        }
    }
}

/// One unprocessed sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawSample {
    /// Analog voltage in volts
    Voltage(f32),
    /// Echo pulse width in microseconds, 0 on timeout
    PulseWidth(u32),
}

impl RawSample {
    /// Pulse sample reported when no echo arrived in time
    pub const TIMEOUT: Self = Self::PulseWidth(0);

    /// Voltage, if this is an analog sample
    pub fn volts(&self) -> Option<f32> {
        match self {
            Self::Voltage(v) => Some(*v),
            Self::PulseWidth(_) => None,
        }
    }

    /// Pulse width, if this is a ranging sample
    pub fn micros(&self) -> Option<u32> {
        match self {
            Self::PulseWidth(us) => Some(*us),
            Self::Voltage(_) => None,
        }
    }
}

/// Source of raw samples
///
/// Each call returns exactly one sample. A ranging timeout is
/// `RawSample::PulseWidth(0)`, never an error.
pub trait AnalogFrontend {
    /// Take one sample on `channel`
    fn sample(&mut self, channel: Channel) -> RawSample;
}

impl<T: AnalogFrontend + ?Sized> AnalogFrontend for &mut T {
    fn sample(&mut self, channel: Channel) -> RawSample {
        (**self).sample(channel)
    }
}

/// Linear ADC count to voltage conversion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdcConverter {
    full_scale_v: f32,
    max_count: u16,
}

impl AdcConverter {
    /// 12-bit converter with a 3.3 V reference
    pub const ESP32_12BIT: Self = Self::new(ADC_FULL_SCALE_V, ADC_MAX_COUNT);

    /// Create a converter
    pub const fn new(full_scale_v: f32, max_count: u16) -> Self {
        Self { full_scale_v, max_count }
    }

    /// Convert a count to volts. Counts above full scale saturate.
    pub fn counts_to_volts(&self, count: u16) -> f32 {
        if self.max_count == 0 {
            return 0.0;
        }
        let count = count.min(self.max_count);
        f32::from(count) * self.full_scale_v / f32::from(self.max_count)
    }

    /// Nearest count for a voltage, clamped to the converter's range
    pub fn volts_to_counts(&self, volts: f32) -> u16 {
        if self.full_scale_v <= 0.0 || !volts.is_finite() {
            return 0;
        }
        let scaled = libm::roundf(volts / self.full_scale_v * f32::from(self.max_count));
        scaled.clamp(0.0, f32::from(self.max_count)) as u16
    }
}

impl Default for AdcConverter {
    fn default() -> Self {
        Self::ESP32_12BIT
    }
}

/// Multi-channel ADC driver
pub trait AdcReader {
    /// Driver error
    type Error;

    /// Read the raw count on an analog channel
    fn read_counts(&mut self, channel: Channel) -> Result<u16, Self::Error>;
}

/// GPIO pair driving an ultrasonic ranger
pub trait EchoPins {
    /// Drive the trigger line
    fn set_trigger(&mut self, high: bool);

    /// Current level of the echo line
    fn echo_is_high(&mut self) -> bool;
}

/// HC-SR04 style ranger measuring echo pulse width
#[derive(Debug)]
pub struct UltrasonicRanger<P, C, D> {
    pins: P,
    clock: C,
    delay: D,
    timeout_us: u32,
}

impl<P, C, D> UltrasonicRanger<P, C, D>
where
    P: EchoPins,
    C: MicrosSource,
    D: Delay,
{
    /// Create a ranger with the default 30 ms echo timeout
    pub fn new(pins: P, clock: C, delay: D) -> Self {
        Self { pins, clock, delay, timeout_us: ECHO_TIMEOUT_US }
    }

    /// Override the echo timeout
    pub fn with_timeout_us(mut self, timeout_us: u32) -> Self {
        self.timeout_us = timeout_us;
        self
    }

    /// Fire one trigger pulse and time the echo
    ///
    /// Returns the echo high time in microseconds, or 0 if the echo did not
    /// rise and fall within the timeout.
    pub fn measure_pulse_us(&mut self) -> u32 {
        self.pins.set_trigger(false);
        self.delay.delay_us(TRIGGER_SETTLE_US);
        self.pins.set_trigger(true);
        self.delay.delay_us(TRIGGER_PULSE_US);
        self.pins.set_trigger(false);

        let start = self.clock.now_us();
        let deadline = start.saturating_add(u64::from(self.timeout_us));

        // A stale echo from the previous ping must end first.
        if !self.wait_for_echo(false, deadline) {
            return 0;
        }
        if !self.wait_for_echo(true, deadline) {
            return 0;
        }
        let rise = self.clock.now_us();
        if !self.wait_for_echo(false, deadline) {
            return 0;
        }
        let width = self.clock.now_us().saturating_sub(rise);
        u32::try_from(width).unwrap_or(0)
    }

    fn wait_for_echo(&mut self, high: bool, deadline: u64) -> bool {
        while self.pins.echo_is_high() != high {
            if self.clock.now_us() >= deadline {
                return false;
            }
        }
        true
    }

    /// Release the pins, clock and delay
    pub fn release(self) -> (P, C, D) {
        (self.pins, self.clock, self.delay)
    }
}

/// Reference frontend: ADC for the analog probes, GPIO ranger for distance
#[derive(Debug)]
pub struct SensorFrontend<A, P, C, D> {
    adc: A,
    converter: AdcConverter,
    ranger: UltrasonicRanger<P, C, D>,
}

impl<A, P, C, D> SensorFrontend<A, P, C, D>
where
    A: AdcReader,
    P: EchoPins,
    C: MicrosSource,
    D: Delay,
{
    /// Combine an ADC and a ranger
    pub fn new(adc: A, converter: AdcConverter, ranger: UltrasonicRanger<P, C, D>) -> Self {
        Self { adc, converter, ranger }
    }
}

impl<A, P, C, D> AnalogFrontend for SensorFrontend<A, P, C, D>
where
    A: AdcReader,
    P: EchoPins,
    C: MicrosSource,
    D: Delay,
{
    fn sample(&mut self, channel: Channel) -> RawSample {
        if channel.is_pulse() {
            return RawSample::PulseWidth(self.ranger.measure_pulse_us());
        }
        // A failed conversion reads as 0 V, which every probe model maps
        // outside its plausibility window or to its floor.
        let count = match self.adc.read_counts(channel) {
            Ok(count) => count,
            Err(_) => {
                log_warn!("ADC read failed on channel {}", channel.name());
                0
            }
        };
        RawSample::Voltage(self.converter.counts_to_volts(count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::{ManualClock, ManualDelay};

    #[test]
    fn adc_conversion_matches_reference_board() {
        let adc = AdcConverter::ESP32_12BIT;
        assert_eq!(adc.counts_to_volts(0), 0.0);
        assert!((adc.counts_to_volts(4095) - 3.3).abs() < 1e-6);
        assert!((adc.counts_to_volts(3102) - 2.4998).abs() < 1e-3);
        assert_eq!(adc.counts_to_volts(5000), adc.counts_to_volts(4095));
    }

    #[test]
    fn volts_to_counts_clamps() {
        let adc = AdcConverter::ESP32_12BIT;
        assert_eq!(adc.volts_to_counts(3.3), 4095);
        assert_eq!(adc.volts_to_counts(5.0), 4095);
        assert_eq!(adc.volts_to_counts(-1.0), 0);
        assert_eq!(adc.volts_to_counts(f32::NAN), 0);
    }

    /// Echo line simulated against a shared manual clock: goes high
    /// `rise_after_us` after trigger release and stays high for `width_us`.
    struct SimEcho<'a> {
        clock: &'a ManualClock,
        released_at: Option<u64>,
        rise_after_us: u64,
        width_us: Option<u64>,
    }

    impl EchoPins for SimEcho<'_> {
        fn set_trigger(&mut self, high: bool) {
            if !high && self.released_at.is_none() && self.clock.now_us() > 0 {
                self.released_at = Some(self.clock.now_us());
            }
        }

        fn echo_is_high(&mut self) -> bool {
            // Every poll costs one microsecond of simulated time.
            self.clock.advance_us(1);
            let (Some(released), Some(width)) = (self.released_at, self.width_us) else {
                return false;
            };
            let t = self.clock.now_us();
            let rise = released + self.rise_after_us;
            t >= rise && t < rise + width
        }
    }

    fn ranger<'a>(
        clock: &'a ManualClock,
        width_us: Option<u64>,
    ) -> UltrasonicRanger<SimEcho<'a>, &'a ManualClock, ManualDelay<'a>> {
        let pins = SimEcho { clock, released_at: None, rise_after_us: 200, width_us };
        UltrasonicRanger::new(pins, clock, clock.delay())
    }

    #[test]
    fn measures_echo_width() {
        let clock = ManualClock::new(0);
        let mut ranger = ranger(&clock, Some(1176));
        let width = ranger.measure_pulse_us();
        assert!((1175..=1177).contains(&width), "width {}", width);
    }

    #[test]
    fn missing_echo_times_out_to_zero() {
        let clock = ManualClock::new(0);
        let mut ranger = ranger(&clock, None);
        assert_eq!(ranger.measure_pulse_us(), 0);
        assert!(clock.now_us() >= u64::from(ECHO_TIMEOUT_US));
    }

    #[test]
    fn overlong_echo_times_out_to_zero() {
        let clock = ManualClock::new(0);
        let mut ranger = ranger(&clock, Some(40_000));
        assert_eq!(ranger.measure_pulse_us(), 0);
    }

    struct FailingAdc;

    impl AdcReader for FailingAdc {
        type Error = ();

        fn read_counts(&mut self, _channel: Channel) -> Result<u16, ()> {
            Err(())
        }
    }

    #[test]
    fn adc_failure_reads_zero_volts() {
        let clock = ManualClock::new(0);
        let mut frontend =
            SensorFrontend::new(FailingAdc, AdcConverter::default(), ranger(&clock, None));
        assert_eq!(frontend.sample(Channel::Ph), RawSample::Voltage(0.0));
        assert_eq!(frontend.sample(Channel::Distance), RawSample::TIMEOUT);
    }
}
