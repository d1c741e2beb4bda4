//! Report Scheduling
//!
//! ## Overview
//!
//! Once per wake the scheduler answers two questions: *should this reading
//! go to the cloud now*, and *is there any point staying awake at all*.
//!
//! Two policies are supported, selected by configuration:
//!
//! - **Interval**: report when the regular interval has elapsed, when the
//!   daily hard ceiling has elapsed, when the distance moved by at least the
//!   hysteresis threshold, or when a human pressed a button to wake the
//!   device.
//! - **Fixed clock**: report at two fixed daily checkpoints (within a short
//!   acceptance window after each), with the daily ceiling as the fallback
//!   when the wall clock was never synced, plus the same hysteresis and
//!   manual-wake triggers.
//!
//! A timer wake where nothing is due is a no-op wake: the decision carries
//! `skip_interaction` so the orchestrator can put the device straight back
//! to sleep without lighting the display or polling buttons.
//!
//! ## Hysteresis reference
//!
//! The delta is measured against the last *reported* distance (see
//! [`PersistedState::reference_distance`]); using the last measured value
//! instead would let slow drift escape in sub-threshold steps forever.

use crate::constants::{
    CHECKPOINT_WINDOW_MIN, DEFAULT_MIN_REPORT_INTERVAL_SECS, DEFAULT_REPORT_INTERVAL_SECS,
    EVENING_CHECKPOINT_MIN, MORNING_CHECKPOINT_MIN,
};
use crate::cycle::WakeReason;
use crate::state::PersistedState;
use crate::time::Timestamp;

/// Which scheduling policy the monitor runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportPolicy {
    /// Elapsed-time cadence
    #[default]
    Interval,
    /// Fixed daily wall-clock checkpoints
    FixedClock,
}

/// Elapsed-time cadence parameters, from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    /// Regular report interval (seconds)
    pub report_interval_secs: u64,
    /// Hard ceiling: never go longer than this without reporting (seconds)
    pub min_report_interval_secs: u64,
}

impl Default for Cadence {
    fn default() -> Self {
        Self {
            report_interval_secs: DEFAULT_REPORT_INTERVAL_SECS,
            min_report_interval_secs: DEFAULT_MIN_REPORT_INTERVAL_SECS,
        }
    }
}

/// Which condition won the decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportReason {
    /// Regular interval elapsed
    IntervalElapsed,
    /// Daily hard ceiling elapsed
    DailyCeiling,
    /// Distance moved by at least the hysteresis threshold
    HysteresisExceeded,
    /// Wall clock is inside a checkpoint acceptance window
    Checkpoint,
    /// Device was woken by a button press
    ManualWake,
    /// Nothing is due
    NotDue,
}

impl ReportReason {
    /// Short static description for logs and the diagnostic feed.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportReason::IntervalElapsed => "interval elapsed",
            ReportReason::DailyCeiling => "daily ceiling elapsed",
            ReportReason::HysteresisExceeded => "hysteresis exceeded",
            ReportReason::Checkpoint => "at checkpoint",
            ReportReason::ManualWake => "manual wake",
            ReportReason::NotDue => "not due",
        }
    }
}

/// The scheduler's answer for this wake cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportDecision {
    /// Post the reading this cycle
    pub should_report: bool,
    /// Winning condition, for logs and diagnostics
    pub reason: ReportReason,
    /// Timer wake with nothing due: skip display and buttons, go back to
    /// sleep immediately
    pub skip_interaction: bool,
}

/// Decide whether to report, given the cycle's inputs.
///
/// `wall_minutes` is the maintained wall clock's minutes past midnight, or
/// `None` if it was never synced. `now` and `state.last_report_time` are
/// uptime seconds; if persisted state predates a power loss the elapsed
/// time saturates to zero and the cadence restarts from here, which costs
/// at most one regular interval.
pub fn decide(
    policy: ReportPolicy,
    cadence: &Cadence,
    now: Timestamp,
    wall_minutes: Option<u16>,
    state: &PersistedState,
    current_cm: f32,
    wake: WakeReason,
) -> ReportDecision {
    let elapsed = now.saturating_sub(state.last_report_time);

    let delta = match state.reference_distance() {
        Some(reference) => libm::fabsf(current_cm - reference),
        None => 0.0,
    };
    let hysteresis_due = delta > 0.0 && delta >= state.hysteresis;

    let reason = match policy {
        ReportPolicy::Interval => {
            if elapsed >= cadence.report_interval_secs {
                ReportReason::IntervalElapsed
            } else if elapsed >= cadence.min_report_interval_secs {
                ReportReason::DailyCeiling
            } else if hysteresis_due {
                ReportReason::HysteresisExceeded
            } else if wake == WakeReason::Button {
                ReportReason::ManualWake
            } else {
                ReportReason::NotDue
            }
        }
        ReportPolicy::FixedClock => {
            if wall_minutes.map_or(false, at_checkpoint) {
                ReportReason::Checkpoint
            } else if elapsed >= cadence.min_report_interval_secs {
                // Clock sync failed or drifted past both windows; the daily
                // ceiling keeps data flowing regardless.
                ReportReason::DailyCeiling
            } else if hysteresis_due {
                ReportReason::HysteresisExceeded
            } else if wake == WakeReason::Button {
                ReportReason::ManualWake
            } else {
                ReportReason::NotDue
            }
        }
    };

    let should_report = reason != ReportReason::NotDue;
    log::debug!(
        "schedule: elapsed={}s delta={:.1}cm -> {}",
        elapsed,
        delta,
        reason.as_str()
    );

    ReportDecision {
        should_report,
        reason,
        skip_interaction: wake == WakeReason::Timer && !should_report,
    }
}

/// Whether `minutes` falls inside a checkpoint acceptance window.
///
/// Windows open *at* the checkpoint: the sleep planner aims the wake at the
/// checkpoint minute, so the device arrives at or shortly after it, never
/// before.
pub fn at_checkpoint(minutes: u16) -> bool {
    [MORNING_CHECKPOINT_MIN, EVENING_CHECKPOINT_MIN]
        .iter()
        .any(|&cp| minutes >= cp && minutes - cp <= CHECKPOINT_WINDOW_MIN)
}
