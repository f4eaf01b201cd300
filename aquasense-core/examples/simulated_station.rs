//! Simulated Station Example
//!
//! Runs the acquisition loop against a simulated pond for one minute of
//! virtual time and prints every reading set the sink receives.
//!
//! ## What You'll Learn
//!
//! - Implementing `AnalogFrontend` and `TelemetrySink`
//! - Driving the orchestrator from a cooperative loop
//! - How spikes, ranger timeouts and sink outages show up in the output
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example simulated_station
//! ```

use aquasense_core::{
    frontend::{AnalogFrontend, Channel, RawSample},
    sink::{Ack, TelemetrySink},
    AcquisitionConfig, CalibrationProfile, CycleOutcome, ManualClock, Orchestrator, ReadingSet,
    SinkError,
};

/// Pond with slowly drifting chemistry and a noisy, occasionally glitching frontend
struct SimulatedPond {
    seed: u32,
    samples: u32,
}

impl SimulatedPond {
    fn new() -> Self {
        Self { seed: 0x5eed, samples: 0 }
    }

    fn noise(&mut self, amplitude: f32) -> f32 {
        self.seed = self.seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        let unit = (self.seed >> 16) as f32 / 65_535.0;
        (unit * 2.0 - 1.0) * amplitude
    }
}

impl AnalogFrontend for SimulatedPond {
    fn sample(&mut self, channel: Channel) -> RawSample {
        self.samples += 1;
        let drift = self.samples as f32 / 2000.0;
        match channel {
            // Every 23rd sample is an ADC glitch reading 0 V.
            Channel::Ph if self.samples % 23 == 0 => RawSample::Voltage(0.0),
            Channel::Ph => RawSample::Voltage(2.41 - drift * 0.1 + self.noise(0.01)),
            Channel::Tds => RawSample::Voltage(0.9 + drift * 0.05 + self.noise(0.02)),
            Channel::Turbidity => RawSample::Voltage(2.2 + self.noise(0.05)),
            // The ranger loses its echo now and then.
            Channel::Distance if self.samples % 7 == 0 => RawSample::TIMEOUT,
            Channel::Distance => RawSample::PulseWidth((2940.0 + self.noise(30.0)) as u32),
        }
    }
}

/// Sink printing each set, with a simulated outage
struct ConsoleSink {
    offline_cycles: std::ops::RangeInclusive<u32>,
}

impl TelemetrySink for ConsoleSink {
    fn publish(&mut self, set: ReadingSet) -> Result<Ack, SinkError> {
        if self.offline_cycles.contains(&set.cycle()) {
            return Err(SinkError::Transport { reason: "uplink offline" });
        }
        println!(
            "  #{:<3} pH {:>5.2}  TDS {:>7.1} ppm  turbidity {:>6.1} NTU  distance {:>5.1} cm",
            set.cycle(),
            set.ph().value(),
            set.tds().value(),
            set.turbidity().value(),
            set.distance().value(),
        );
        if let (Some(salinity), Some(level)) = (set.salinity_ppt(), set.fill_level_cm()) {
            println!("       salinity {:.3} ppt  fill level {:.1} cm", salinity, level);
        }
        if let Some(quality) = set.quality() {
            println!(
                "       quality {:.2} ({}) via rule {}",
                quality.score,
                quality.category.name(),
                quality.dominant.number()
            );
        }
        Ok(Ack)
    }
}

fn main() {
    println!("AquaSense Simulated Station");
    println!("===========================\n");

    let profile = CalibrationProfile::REFERENCE_PROBE.with_water_temperature(27.0);
    let config = AcquisitionConfig::REFERENCE;
    println!("Sample period: {} ms", config.sample_period_ms);
    println!("Burst settle time: {} ms\n", config.cycle_burst_ms());

    let clock = ManualClock::new(0);
    let sink = ConsoleSink { offline_cycles: 8..=10 };
    let mut station = Orchestrator::new(
        SimulatedPond::new(),
        &clock,
        clock.delay(),
        sink,
        profile,
        config,
    );

    while aquasense_core::TimeSource::now(&clock) < 60_000 {
        let outcome = station.poll();
        if let Some(report) = outcome.cycle {
            match report.outcome {
                CycleOutcome::Published => {}
                CycleOutcome::Suppressed => println!("  #{:<3} suppressed", report.cycle),
                CycleOutcome::SinkFailed(err) => println!("  #{:<3} sink failed: {}", report.cycle, err),
            }
        }
        if let Some(link) = outcome.link {
            println!("  link check: {:?}", link);
        }
        clock.advance_ms(100);
    }

    let stats = station.state().stats();
    println!("\nSummary");
    println!("-------");
    println!("  cycles:     {}", stats.cycles_run);
    println!("  published:  {}", stats.sets_published);
    println!("  suppressed: {}", stats.sets_suppressed);
    println!("  failures:   {}", stats.sink_failures);
}
