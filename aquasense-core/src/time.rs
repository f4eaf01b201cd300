//! Time management for the acquisition loop
//!
//! Provides the clock and delay abstractions the orchestrator and the
//! ultrasonic ranger are written against:
//! - [`TimeSource`]: millisecond monotonic time for scheduling
//! - [`MicrosSource`]: microsecond time for pulse-width measurement
//! - [`Delay`]: blocking settle delays between samples
//!
//! Platform code implements these over hardware timers. [`ManualClock`]
//! implements all three for deterministic tests and simulations, and
//! [`MonotonicClock`]/[`StdDelay`] cover hosted builds.

use core::cell::Cell;

use crate::constants::time::US_PER_MS;

/// Timestamp in milliseconds since device boot
pub type Timestamp = u64;

/// Source of time for the system
pub trait TimeSource {
    /// Get current timestamp in milliseconds
    fn now(&self) -> Timestamp;

    /// Check if this source provides wall clock time (vs monotonic)
    fn is_wall_clock(&self) -> bool;

    /// Get precision in milliseconds
    fn precision_ms(&self) -> u32;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now(&self) -> Timestamp {
        (**self).now()
    }

    fn is_wall_clock(&self) -> bool {
        (**self).is_wall_clock()
    }

    fn precision_ms(&self) -> u32 {
        (**self).precision_ms()
    }
}

/// Microsecond counter used to time echo pulses
pub trait MicrosSource {
    /// Microseconds since an arbitrary fixed origin
    fn now_us(&self) -> u64;
}

impl<T: MicrosSource + ?Sized> MicrosSource for &T {
    fn now_us(&self) -> u64 {
        (**self).now_us()
    }
}

/// Blocking delay provider
pub trait Delay {
    /// Block for `ms` milliseconds
    fn delay_ms(&mut self, ms: u32);

    /// Block for `us` microseconds
    fn delay_us(&mut self, us: u32);
}

impl<T: Delay + ?Sized> Delay for &mut T {
    fn delay_ms(&mut self, ms: u32) {
        (**self).delay_ms(ms)
    }

    fn delay_us(&mut self, us: u32) {
        (**self).delay_us(us)
    }
}

/// Milliseconds elapsed from `earlier` to `later`, zero if the clock stepped back
pub fn elapsed_ms(earlier: Timestamp, later: Timestamp) -> u64 {
    later.saturating_sub(earlier)
}

/// Host monotonic clock (requires std)
///
/// Starts at 0 when constructed.
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl MonotonicClock {
    /// Start a clock at zero
    pub fn new() -> Self {
        Self { origin: std::time::Instant::now() }
    }
}

#[cfg(feature = "std")]
impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl TimeSource for MonotonicClock {
    fn now(&self) -> Timestamp {
        self.origin.elapsed().as_millis() as Timestamp
    }

    fn is_wall_clock(&self) -> bool {
        false
    }

    fn precision_ms(&self) -> u32 {
        1
    }
}

#[cfg(feature = "std")]
impl MicrosSource for MonotonicClock {
    fn now_us(&self) -> u64 {
        self.origin.elapsed().as_micros() as u64
    }
}

/// Thread-sleeping delay (requires std)
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy, Default)]
pub struct StdDelay;

#[cfg(feature = "std")]
impl Delay for StdDelay {
    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }

    fn delay_us(&mut self, us: u32) {
        std::thread::sleep(std::time::Duration::from_micros(u64::from(us)));
    }
}

/// Manually driven clock for tests and simulation
///
/// Time only moves when [`advance_ms`](Self::advance_ms) is called or a
/// [`ManualDelay`] borrowed from it is used. Shared by reference, so the
/// orchestrator and a test can hold it at the same time.
#[derive(Debug, Default)]
pub struct ManualClock {
    micros: Cell<u64>,
}

impl ManualClock {
    /// Create a clock reading `ms` milliseconds
    pub fn new(ms: Timestamp) -> Self {
        Self { micros: Cell::new(ms * US_PER_MS) }
    }

    /// Jump to an absolute time
    pub fn set_ms(&self, ms: Timestamp) {
        self.micros.set(ms * US_PER_MS);
    }

    /// Move forward by `ms` milliseconds
    pub fn advance_ms(&self, ms: u64) {
        self.advance_us(ms * US_PER_MS);
    }

    /// Move forward by `us` microseconds
    pub fn advance_us(&self, us: u64) {
        self.micros.set(self.micros.get().saturating_add(us));
    }

    /// Delay provider that advances this clock instead of blocking
    pub fn delay(&self) -> ManualDelay<'_> {
        ManualDelay { clock: self }
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> Timestamp {
        self.micros.get() / US_PER_MS
    }

    fn is_wall_clock(&self) -> bool {
        false
    }

    fn precision_ms(&self) -> u32 {
        1
    }
}

impl MicrosSource for ManualClock {
    fn now_us(&self) -> u64 {
        self.micros.get()
    }
}

/// Delay that advances a [`ManualClock`]
#[derive(Debug, Clone, Copy)]
pub struct ManualDelay<'a> {
    clock: &'a ManualClock,
}

impl Delay for ManualDelay<'_> {
    fn delay_ms(&mut self, ms: u32) {
        self.clock.advance_ms(u64::from(ms));
    }

    fn delay_us(&mut self, us: u32) {
        self.clock.advance_us(u64::from(us));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::new(1000);
        assert_eq!(clock.now(), 1000);

        clock.advance_ms(500);
        assert_eq!(clock.now(), 1500);
        assert_eq!(clock.now_us(), 1_500_000);
    }

    #[test]
    fn manual_delay_moves_shared_clock() {
        let clock = ManualClock::new(0);
        let mut delay = clock.delay();

        delay.delay_ms(10);
        delay.delay_us(2);
        assert_eq!(clock.now(), 10);
        assert_eq!(clock.now_us(), 10_002);
    }

    #[test]
    fn sub_millisecond_advances_accumulate() {
        let clock = ManualClock::new(0);
        for _ in 0..4 {
            clock.advance_us(250);
        }
        assert_eq!(clock.now(), 1);
    }

    #[test]
    fn elapsed_saturates() {
        assert_eq!(elapsed_ms(100, 350), 250);
        assert_eq!(elapsed_ms(350, 100), 0);
    }

    #[test]
    fn reference_impl_delegates() {
        let clock = ManualClock::new(42);
        let by_ref = &clock;
        assert_eq!(TimeSource::now(&by_ref), 42);
        assert!(!by_ref.is_wall_clock());
    }
}
