//! Constants for the tankgauge monitor
//!
//! Every fixed number in the system lives here with its unit in the name.
//! Values that are *configuration* (report cadence, awake window, hysteresis
//! bounds, feed names) have their defaults here but are overridable through
//! [`crate::config::MonitorConfig`]; the rest are protocol or hardware facts.

// ===== TIME UNIT CONVERSIONS =====

/// Seconds per minute.
pub const SECONDS_PER_MINUTE: u32 = 60;

/// Minutes per hour.
pub const MINUTES_PER_HOUR: u32 = 60;

/// Hours per day.
pub const HOURS_PER_DAY: u32 = 24;

/// Minutes per day.
pub const MINUTES_PER_DAY: u16 = (MINUTES_PER_HOUR * HOURS_PER_DAY) as u16;

/// Seconds per hour.
pub const SECONDS_PER_HOUR: u32 = SECONDS_PER_MINUTE * MINUTES_PER_HOUR;

// ===== SENSOR ACQUISITION =====

/// Samples taken per reading; the aggregate is the median of the valid set.
pub const SENSOR_SAMPLES: usize = 10;

/// Pause between samples (milliseconds), clear of the sensor cycle time.
pub const SAMPLE_PAUSE_MS: u32 = 100;

/// Bounded retries while polling data-ready on the gated sensor variant.
pub const DATA_READY_RETRIES: u8 = 10;

/// Pause between data-ready polls (milliseconds).
pub const DATA_READY_POLL_MS: u32 = 10;

/// Shortest distance accepted as an in-band sample (centimeters).
///
/// Anything closer is a reflection off the sensor housing, not the surface
/// being measured.
pub const MIN_VALID_DISTANCE_CM: f32 = 5.0;

/// Out-of-range limit for the one-shot sensor variant (centimeters).
pub const ONESHOT_OUT_OF_RANGE_CM: f32 = 400.0;

/// Out-of-range limit for the gated long-range variant (centimeters).
pub const GATED_OUT_OF_RANGE_CM: f32 = 800.0;

/// Distance substituted when no reading and no history exist (centimeters).
pub const FALLBACK_DISTANCE_CM: f32 = 100.0;

// ===== REPORT CADENCE (defaults) =====

/// Default regular report interval: 3 hours.
pub const DEFAULT_REPORT_INTERVAL_SECS: u64 = 3 * SECONDS_PER_HOUR as u64;

/// Default hard ceiling between reports: 24 hours.
pub const DEFAULT_MIN_REPORT_INTERVAL_SECS: u64 = 24 * SECONDS_PER_HOUR as u64;

/// Morning checkpoint of the fixed-clock policy, minutes past midnight (10:00).
pub const MORNING_CHECKPOINT_MIN: u16 = 10 * MINUTES_PER_HOUR as u16;

/// Evening checkpoint of the fixed-clock policy, minutes past midnight (18:00).
pub const EVENING_CHECKPOINT_MIN: u16 = 18 * MINUTES_PER_HOUR as u16;

/// Acceptance window after a checkpoint (minutes).
pub const CHECKPOINT_WINDOW_MIN: u16 = 10;

/// Sleep duration when the wall clock was never synced: 12 hours.
pub const UNSYNCED_CLOCK_SLEEP_SECS: u64 = 12 * SECONDS_PER_HOUR as u64;

// ===== HYSTERESIS (defaults) =====

/// Default change threshold that triggers an out-of-schedule report (cm).
pub const DEFAULT_HYSTERESIS_CM: f32 = 2.0;

/// Lowest hysteresis a user may dial in (cm).
pub const DEFAULT_MIN_HYSTERESIS_CM: f32 = 0.5;

/// Highest hysteresis a user may dial in (cm).
pub const DEFAULT_MAX_HYSTERESIS_CM: f32 = 10.0;

/// Step applied per button press when adjusting hysteresis (cm).
pub const HYSTERESIS_STEP_CM: f32 = 0.5;

// ===== INTERACTION WINDOW =====

/// Default seconds to stay awake for button interaction.
pub const DEFAULT_AWAKE_TIME_SECS: u64 = 30;

/// Poll tick of the interaction loop (milliseconds).
pub const POLL_TICK_MS: u32 = 100;

/// Pause after a detected press; doubles as hardware debounce (milliseconds).
pub const DEBOUNCE_PAUSE_MS: u32 = 300;

// ===== STATE =====

/// Previous readings retained in the persisted history.
pub const MAX_STORED_READINGS: usize = 5;

// ===== RECOVERY =====

/// Delay before the host restarts after an unrecovered fault (seconds).
pub const RESTART_DELAY_SECS: u32 = 10;

// ===== BOOT STORAGE GUARD =====

/// Settle time before sampling the guard buttons at boot (milliseconds).
pub const BOOT_GUARD_SETTLE_MS: u32 = 1_500;

/// Seconds a guard button must be held to keep storage read-only.
pub const BOOT_GUARD_HOLD_SECS: u32 = 2;

// ===== TRANSPORT =====

/// HTTP request timeout (seconds); a hung POST is bounded by this, not by
/// any watchdog in the core.
pub const HTTP_TIMEOUT_SECS: u64 = 15;
