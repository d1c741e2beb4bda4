//! Time management for the duty-cycled monitor
//!
//! Provides the clock abstractions one wake cycle needs:
//! - Continuously-running uptime seconds (survives deep sleep)
//! - Explicit pauses, the only suspension points of the cooperative loop
//! - Maintained wall-clock minutes for the fixed-checkpoint report policy

/// Timestamp in seconds of device uptime.
///
/// The host capability must keep this running across deep sleep (RTC-backed
/// on real boards); it resets only on power loss. Interval scheduling is
/// written against this clock, never against wall time.
pub type Timestamp = u64;

/// Source of uptime for the cycle.
pub trait TimeSource {
    /// Get current uptime in seconds
    fn now(&self) -> Timestamp;
}

/// Explicit fixed-duration pause.
///
/// Sensor settle time, button debounce, and the interaction poll tick all
/// go through this trait so tests can advance a fake clock instead of
/// sleeping for real.
pub trait Delay {
    /// Block for roughly `ms` milliseconds
    fn pause_ms(&mut self, ms: u32);
}

/// Process clock (requires std)
#[cfg(feature = "std")]
#[derive(Debug, Clone, Default)]
pub struct SystemTime;

#[cfg(feature = "std")]
impl TimeSource for SystemTime {
    fn now(&self) -> Timestamp {
        use std::time::{SystemTime as StdSystemTime, UNIX_EPOCH};

        StdSystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

/// Thread-sleep pauses (requires std)
#[cfg(feature = "std")]
#[derive(Debug, Clone, Default)]
pub struct ThreadDelay;

#[cfg(feature = "std")]
impl Delay for ThreadDelay {
    fn pause_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(ms as u64));
    }
}

/// Fixed time source for testing
#[derive(Debug, Clone)]
pub struct FixedTime {
    secs: Timestamp,
}

impl FixedTime {
    /// Create a source pinned at `secs`
    pub fn new(secs: Timestamp) -> Self {
        Self { secs }
    }

    /// Pin the source to a new value
    pub fn set(&mut self, secs: Timestamp) {
        self.secs = secs;
    }

    /// Move the source forward
    pub fn advance(&mut self, secs: u64) {
        self.secs += secs;
    }
}

impl TimeSource for FixedTime {
    fn now(&self) -> Timestamp {
        self.secs
    }
}

/// Pause that does nothing, for tests and simulations.
#[derive(Debug, Clone, Default)]
pub struct NoopDelay;

impl Delay for NoopDelay {
    fn pause_ms(&mut self, _ms: u32) {}
}

/// Maintained wall-clock time for the fixed-checkpoint policy.
///
/// The device has no battery-backed calendar; wall time is synced
/// opportunistically whenever the radio happens to be up, then extrapolated
/// from uptime. An unsynced clock answers `None`, which routes the scheduler
/// to its elapsed-time fallback and the sleep planner to the long fallback
/// duration.
#[derive(Debug, Clone, Copy, Default)]
pub struct WallClock {
    sync: Option<SyncPoint>,
}

#[derive(Debug, Clone, Copy)]
struct SyncPoint {
    minutes_of_day: u16,
    at: Timestamp,
}

impl WallClock {
    /// A clock that has never seen a network sync
    pub fn unsynced() -> Self {
        Self { sync: None }
    }

    /// Record a sync: wall time was `minutes_of_day` at uptime `at`
    pub fn sync(&mut self, minutes_of_day: u16, at: Timestamp) {
        self.sync = Some(SyncPoint {
            minutes_of_day: minutes_of_day % crate::constants::MINUTES_PER_DAY,
            at,
        });
    }

    /// Whether a sync has ever happened
    pub fn is_synced(&self) -> bool {
        self.sync.is_some()
    }

    /// Current minutes past midnight, extrapolated from the last sync
    pub fn minutes_of_day(&self, now: Timestamp) -> Option<u16> {
        let sync = self.sync?;
        let elapsed_min = now.saturating_sub(sync.at) / u64::from(crate::constants::SECONDS_PER_MINUTE);
        let minutes =
            (u64::from(sync.minutes_of_day) + elapsed_min) % u64::from(crate::constants::MINUTES_PER_DAY);
        Some(minutes as u16)
    }
}
