//! Acquisition cycle orchestrator
//!
//! ## Overview
//!
//! The orchestrator is the cooperative main loop of a station. Each call to
//! [`Orchestrator::poll`] is non-blocking apart from an acquisition burst and
//! evaluates two independent schedules:
//!
//! ```text
//! poll ─┬─ health due?  ── monitor.check()                 (every 10 s)
//!       └─ sample due and sink ready?
//!              └─ run_cycle: pH → TDS → turbidity → distance
//!                   → derive → verdict → publish or suppress → escalate?
//! ```
//!
//! A schedule is due when strictly more than its period has elapsed since it
//! last ran. The first acquisition fires on the first poll; the first health
//! check one period after construction.
//!
//! ## Cycle Phases
//!
//! ```text
//! Idle ──(sample due, sink ready)──► Acquiring ──(set published or dropped)──► Idle
//! ```
//!
//! Only one cycle can be in flight: `run_cycle` takes `&mut self` and
//! completes before returning.
//!
//! ## Failure Handling
//!
//! - Implausible readings suppress the set; the reason is logged.
//! - Sink errors are counted; the consecutive count resets on success.
//! - When consecutive failures exceed the threshold the cycle report carries
//!   an [`Escalation`] and the state is flagged. What to do about it (restart,
//!   power-cycle the modem) is the platform's decision.
//! - Every cycle ends with one info line summarizing the readings, the
//!   verdict and the sink outcome.

use crate::{
    calibration::CalibrationProfile,
    config::AcquisitionConfig,
    derived::DerivedQuantities,
    errors::SinkError,
    frontend::AnalogFrontend,
    quality::QualityAssessment,
    reading::{PhysicalReading, QuantityKind, ReadingSet},
    sink::{AlwaysUp, ConnectivityMonitor, LinkStatus, TelemetrySink},
    time::{elapsed_ms, Delay, TimeSource, Timestamp},
    validators::Reason,
};

/// Orchestrator phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Waiting for the next due schedule
    #[default]
    Idle,
    /// Sampling and publishing a cycle
    Acquiring,
}

/// Counters across the orchestrator's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CycleStats {
    /// Cycles started
    pub cycles_run: u32,
    /// Sets accepted by the sink
    pub sets_published: u32,
    /// Sets not sent because a reading was implausible
    pub sets_suppressed: u32,
    /// Publish attempts that failed
    pub sink_failures: u32,
    /// Failures since the last successful publish
    pub consecutive_sink_failures: u32,
    /// Connectivity checks that found the link down
    pub link_down_checks: u32,
}

/// Scheduler and supervision state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OrchestratorState {
    phase: Phase,
    last_sample_at: Option<Timestamp>,
    last_health_at: Option<Timestamp>,
    last_link: Option<LinkStatus>,
    escalated: bool,
    stats: CycleStats,
}

impl OrchestratorState {
    /// Current phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Start time of the latest cycle
    pub fn last_sample_at(&self) -> Option<Timestamp> {
        self.last_sample_at
    }

    /// Time of the latest connectivity check, or construction time
    pub fn last_health_at(&self) -> Option<Timestamp> {
        self.last_health_at
    }

    /// Result of the latest connectivity check
    pub fn last_link(&self) -> Option<LinkStatus> {
        self.last_link
    }

    /// Whether sink failures have ever exceeded the threshold
    pub fn is_escalated(&self) -> bool {
        self.escalated
    }

    /// Lifetime counters
    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }
}

/// What happened to a cycle's reading set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Sink accepted the set
    Published,
    /// Set was not sent because a reading was implausible
    Suppressed,
    /// Sink rejected the set
    SinkFailed(SinkError),
}

impl CycleOutcome {
    /// Short label used in the cycle summary
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Published => "published",
            Self::Suppressed => "suppressed",
            Self::SinkFailed(SinkError::Transport { .. }) => "sink failed: transport",
            Self::SinkFailed(SinkError::Auth) => "sink failed: auth",
            Self::SinkFailed(SinkError::Quota) => "sink failed: quota",
            Self::SinkFailed(SinkError::Rejected { .. }) => "sink failed: rejected",
        }
    }
}

/// Signal that the sink has failed too often in a row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Escalation {
    /// Failures since the last success
    pub consecutive_failures: u32,
    /// Configured tolerance
    pub threshold: u32,
}

/// Summary of one cycle
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    /// 1-based cycle number
    pub cycle: u32,
    /// Cycle start time
    pub started_at: Timestamp,
    /// The four readings in acquisition order
    pub readings: [PhysicalReading; QuantityKind::COUNT],
    /// Whether the set passed validation
    pub sendable: bool,
    /// Fate of the set
    pub outcome: CycleOutcome,
    /// Present when sink failures exceeded the threshold
    pub escalation: Option<Escalation>,
}

/// Result of one [`Orchestrator::poll`]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PollOutcome {
    /// Report of the cycle run during this poll
    pub cycle: Option<CycleReport>,
    /// Result of the connectivity check run during this poll
    pub link: Option<LinkStatus>,
}

impl PollOutcome {
    /// Escalation raised during this poll, if any
    pub fn escalation(&self) -> Option<Escalation> {
        self.cycle.as_ref().and_then(|c| c.escalation)
    }
}

/// Cooperative acquisition loop
pub struct Orchestrator<F, C, D, S, M = AlwaysUp> {
    frontend: F,
    clock: C,
    delay: D,
    sink: S,
    monitor: M,
    profile: CalibrationProfile,
    config: AcquisitionConfig,
    state: OrchestratorState,
}

impl<F, C, D, S> Orchestrator<F, C, D, S, AlwaysUp>
where
    F: AnalogFrontend,
    C: TimeSource,
    D: Delay,
    S: TelemetrySink,
{
    /// Create an orchestrator without a connectivity monitor
    ///
    /// `profile` and `config` are used as given; validate them first when
    /// they come from outside the firmware image.
    pub fn new(
        frontend: F,
        clock: C,
        delay: D,
        sink: S,
        profile: CalibrationProfile,
        config: AcquisitionConfig,
    ) -> Self {
        let state = OrchestratorState {
            last_health_at: Some(clock.now()),
            ..OrchestratorState::default()
        };
        Self {
            frontend,
            clock,
            delay,
            sink,
            monitor: AlwaysUp,
            profile,
            config,
            state,
        }
    }
}

impl<F, C, D, S, M> Orchestrator<F, C, D, S, M>
where
    F: AnalogFrontend,
    C: TimeSource,
    D: Delay,
    S: TelemetrySink,
    M: ConnectivityMonitor,
{
    /// The connectivity monitor
    pub fn monitor(&self) -> &M {
        &self.monitor
    }

    /// Attach a connectivity monitor
    pub fn with_monitor<M2: ConnectivityMonitor>(self, monitor: M2) -> Orchestrator<F, C, D, S, M2> {
        Orchestrator {
            frontend: self.frontend,
            clock: self.clock,
            delay: self.delay,
            sink: self.sink,
            monitor,
            profile: self.profile,
            config: self.config,
            state: self.state,
        }
    }

    /// Scheduler state and counters
    pub fn state(&self) -> &OrchestratorState {
        &self.state
    }

    /// Active calibration
    pub fn profile(&self) -> &CalibrationProfile {
        &self.profile
    }

    /// Active schedule
    pub fn config(&self) -> &AcquisitionConfig {
        &self.config
    }

    /// The frontend
    pub fn frontend(&self) -> &F {
        &self.frontend
    }

    /// The frontend, mutably
    pub fn frontend_mut(&mut self) -> &mut F {
        &mut self.frontend
    }

    /// The sink
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// The sink, mutably
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Run whichever schedules are due
    pub fn poll(&mut self) -> PollOutcome {
        let now = self.clock.now();
        let mut outcome = PollOutcome::default();

        if is_due(self.state.last_health_at, now, self.config.health_period_ms) {
            self.state.last_health_at = Some(now);
            outcome.link = Some(self.check_link());
        }

        if self.sink.is_ready()
            && is_due(self.state.last_sample_at, now, self.config.sample_period_ms)
        {
            self.state.last_sample_at = Some(now);
            outcome.cycle = Some(self.run_cycle(now));
        }

        outcome
    }

    fn check_link(&mut self) -> LinkStatus {
        let status = self.monitor.check();
        match status {
            LinkStatus::Up => log_debug!("link check: up"),
            LinkStatus::Reconnected => log_info!("link check: reconnected"),
            LinkStatus::Down => {
                self.state.stats.link_down_checks += 1;
                log_warn!("link check: down, retrying next period");
            }
        }
        self.state.last_link = Some(status);
        status
    }

    /// Acquire, validate and publish one reading set now
    ///
    /// Bypasses the schedule; [`poll`](Self::poll) calls this when a cycle is due.
    pub fn run_cycle(&mut self, started_at: Timestamp) -> CycleReport {
        self.state.phase = Phase::Acquiring;
        self.state.stats.cycles_run += 1;
        let cycle = self.state.stats.cycles_run;

        let readings = QuantityKind::ALL.map(|kind| self.acquire(kind));
        let derived = DerivedQuantities::compute(&readings, &self.profile);
        let set = ReadingSet::assemble(cycle, started_at, readings, derived);
        let sendable = set.is_sendable();
        let salinity = set.salinity_ppt();
        let quality = set.quality().copied();
        let mut reason = Reason::new();
        // Same capacity as the set's own reason buffer.
        let _ = reason.push_str(set.reason());

        let outcome = if sendable {
            match self.sink.publish(set) {
                Ok(_) => {
                    self.state.stats.sets_published += 1;
                    self.state.stats.consecutive_sink_failures = 0;
                    CycleOutcome::Published
                }
                Err(err) => {
                    self.state.stats.sink_failures += 1;
                    self.state.stats.consecutive_sink_failures += 1;
                    log_warn!(
                        "cycle {}: sink failed ({} in a row)",
                        cycle,
                        self.state.stats.consecutive_sink_failures
                    );
                    CycleOutcome::SinkFailed(err)
                }
            }
        } else {
            self.state.stats.sets_suppressed += 1;
            log_warn!("cycle {}: set suppressed: {}", cycle, set.reason());
            CycleOutcome::Suppressed
        };

        log_summary(cycle, &readings, salinity, quality.as_ref(), sendable, &reason, &outcome);

        let escalation = self.check_escalation();
        self.state.phase = Phase::Idle;

        CycleReport { cycle, started_at, readings, sendable, outcome, escalation }
    }

    fn acquire(&mut self, kind: QuantityKind) -> PhysicalReading {
        let channel = kind.channel();
        let profile = &self.profile;
        let frontend = &mut self.frontend;
        let filtered = self.config.filter_for(kind).apply(
            kind,
            || profile.convert(channel, frontend.sample(channel)),
            &mut self.delay,
        );
        PhysicalReading::from_filtered(kind, filtered)
    }

    fn check_escalation(&mut self) -> Option<Escalation> {
        let consecutive = self.state.stats.consecutive_sink_failures;
        let threshold = self.config.escalation_threshold;
        if consecutive > threshold {
            self.state.escalated = true;
            log_error!(
                "sink failed {} times in a row (threshold {}), escalating",
                consecutive,
                threshold
            );
            Some(Escalation { consecutive_failures: consecutive, threshold })
        } else {
            None
        }
    }
}

fn is_due(last: Option<Timestamp>, now: Timestamp, period_ms: u64) -> bool {
    match last {
        None => true,
        Some(at) => elapsed_ms(at, now) > period_ms,
    }
}

/// One info line per cycle, written once the sink outcome is known
#[cfg_attr(not(any(feature = "log", feature = "defmt")), allow(unused_variables))]
fn log_summary(
    cycle: u32,
    readings: &[PhysicalReading; QuantityKind::COUNT],
    salinity: Option<f32>,
    quality: Option<&QualityAssessment>,
    sendable: bool,
    reason: &str,
    outcome: &CycleOutcome,
) {
    let [ph, tds, turbidity, distance] = readings;
    log_info!(
        "cycle {}: pH {} (valid {}, fallback {}), TDS {} ppm (valid {}, fallback {}), \
         turbidity {} NTU (valid {}, fallback {}), distance {} cm (valid {}, fallback {}), \
         salinity {} ppt, quality {} ({}), sendable {}, reason \"{}\", outcome: {}",
        cycle,
        ph.value(),
        ph.is_valid(),
        ph.is_fallback(),
        tds.value(),
        tds.is_valid(),
        tds.is_fallback(),
        turbidity.value(),
        turbidity.is_valid(),
        turbidity.is_fallback(),
        distance.value(),
        distance.is_valid(),
        distance.is_fallback(),
        salinity.unwrap_or(f32::NAN),
        quality.map_or(f32::NAN, |q| q.score),
        quality.map_or("unknown", |q| q.category.name()),
        sendable,
        reason,
        outcome.label()
    );
}
