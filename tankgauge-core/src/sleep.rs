//! Sleep Planning
//!
//! The terminal act of every wake cycle: compute when to wake next and
//! which pins may cut the sleep short. Deep sleep itself is not resumable
//! code — the host tears the process down and boots fresh into the next
//! cycle — so the planner's output is a plain data plan, not a suspension.

use heapless::Vec;

use crate::buttons::{ActiveLevel, BoardProfile, MAX_BUTTONS};
use crate::constants::{SECONDS_PER_MINUTE, UNSYNCED_CLOCK_SLEEP_SECS};
use crate::scheduler::{Cadence, ReportPolicy};
use crate::state::PersistedState;
use crate::time::{Timestamp, WallClock};

/// One edge-triggered wake source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WakeTrigger {
    /// Host pin identifier
    pub pin: u8,
    /// Trigger level, matching the button's active polarity
    pub level: ActiveLevel,
}

/// What the host arms before entering deep sleep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextWakePlan {
    /// Time-based wake, seconds from now; always armed
    pub sleep_secs: u64,
    /// Edge-triggered wakes, one per button the board still exposes
    pub triggers: Vec<WakeTrigger, MAX_BUTTONS>,
}

/// Compute the next wake for the given policy.
pub fn plan(
    policy: ReportPolicy,
    cadence: &Cadence,
    now: Timestamp,
    state: &PersistedState,
    wall: &WallClock,
    profile: BoardProfile,
) -> NextWakePlan {
    let sleep_secs = match policy {
        ReportPolicy::Interval => interval_sleep(cadence, now, state),
        ReportPolicy::FixedClock => checkpoint_sleep(wall, now),
    };

    let triggers = profile
        .wake_buttons()
        .iter()
        .map(|b| WakeTrigger {
            pin: b.pin,
            level: b.active,
        })
        .collect();

    log::info!("sleeping for {}s", sleep_secs);
    NextWakePlan {
        sleep_secs,
        triggers,
    }
}

/// Sleep until the regular interval, but never past the daily ceiling.
fn interval_sleep(cadence: &Cadence, now: Timestamp, state: &PersistedState) -> u64 {
    let elapsed = now.saturating_sub(state.last_report_time);
    match cadence.min_report_interval_secs.checked_sub(elapsed) {
        Some(until_ceiling) if until_ceiling > 0 => {
            cadence.report_interval_secs.min(until_ceiling)
        }
        // Ceiling already behind us; the wake itself will report.
        _ => cadence.report_interval_secs,
    }
}

/// Sleep until the nearer daily checkpoint, or a long fallback when the
/// wall clock was never synced.
fn checkpoint_sleep(wall: &WallClock, now: Timestamp) -> u64 {
    use crate::constants::{EVENING_CHECKPOINT_MIN, MINUTES_PER_DAY, MORNING_CHECKPOINT_MIN};

    let Some(minutes) = wall.minutes_of_day(now) else {
        return UNSYNCED_CLOCK_SLEEP_SECS;
    };

    let until = [MORNING_CHECKPOINT_MIN, EVENING_CHECKPOINT_MIN]
        .iter()
        .map(|&cp| {
            if cp > minutes {
                cp - minutes
            } else {
                // At or past the checkpoint: next occurrence is tomorrow.
                cp + MINUTES_PER_DAY - minutes
            }
        })
        .min()
        .unwrap_or(MINUTES_PER_DAY);

    u64::from(until) * u64::from(SECONDS_PER_MINUTE)
}
