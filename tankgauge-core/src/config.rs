//! Configuration surface
//!
//! Everything operators can change without reflashing comes in through the
//! environment, each key optional with a sensible default. Missing
//! credentials warn — the device still measures, displays, and persists;
//! it just cannot report. A malformed number warns and keeps the default
//! rather than refusing to boot.

use std::env;
use std::str::FromStr;

use crate::buttons::BoardProfile;
use crate::constants;
use crate::scheduler::{Cadence, ReportPolicy};
use crate::state::HysteresisBounds;
use crate::store::StateDefaults;

/// Runtime configuration, resolved once per wake.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    /// Adafruit IO account name
    pub aio_username: String,
    /// Adafruit IO API key
    pub aio_key: String,
    /// Primary feed receiving distance readings
    pub feed: String,
    /// Feed receiving diagnostic notes
    pub error_feed: String,
    /// Suffix appended to the primary feed for battery levels
    pub battery_feed_suffix: String,
    /// WiFi network name
    pub wifi_ssid: String,
    /// WiFi passphrase
    pub wifi_password: String,
    /// Regular report interval (seconds)
    pub report_interval_secs: u64,
    /// Hard ceiling between reports (seconds)
    pub min_report_interval_secs: u64,
    /// Interaction window length (seconds)
    pub awake_time_secs: u64,
    /// Hysteresis applied on cold start (cm)
    pub default_hysteresis: f32,
    /// Lowest user-adjustable hysteresis (cm)
    pub min_hysteresis: f32,
    /// Highest user-adjustable hysteresis (cm)
    pub max_hysteresis: f32,
    /// Scheduling policy
    pub policy: ReportPolicy,
    /// Board wiring variant
    pub board: BoardProfile,
    /// Whether a display is fitted
    pub has_display: bool,
    /// Path of the persisted state file
    pub state_path: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            aio_username: String::new(),
            aio_key: String::new(),
            feed: "oil-tank-depth".into(),
            error_feed: "error".into(),
            battery_feed_suffix: "battery".into(),
            wifi_ssid: String::new(),
            wifi_password: String::new(),
            report_interval_secs: constants::DEFAULT_REPORT_INTERVAL_SECS,
            min_report_interval_secs: constants::DEFAULT_MIN_REPORT_INTERVAL_SECS,
            awake_time_secs: constants::DEFAULT_AWAKE_TIME_SECS,
            default_hysteresis: constants::DEFAULT_HYSTERESIS_CM,
            min_hysteresis: constants::DEFAULT_MIN_HYSTERESIS_CM,
            max_hysteresis: constants::DEFAULT_MAX_HYSTERESIS_CM,
            policy: ReportPolicy::Interval,
            board: BoardProfile::FullButton,
            has_display: true,
            state_path: "state.json".into(),
        }
    }
}

impl MonitorConfig {
    /// Resolve configuration from the environment.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let mut cfg = Self {
            aio_username: string_var("ADAFRUIT_AIO_USERNAME", &defaults.aio_username),
            aio_key: string_var("ADAFRUIT_AIO_KEY", &defaults.aio_key),
            feed: string_var("ADAFRUIT_AIO_FEED_NAME", &defaults.feed),
            error_feed: string_var("ADAFRUIT_AIO_ERROR_FEED_NAME", &defaults.error_feed),
            battery_feed_suffix: string_var(
                "ADAFRUIT_AIO_BATTERY_FEED_SUFFIX",
                &defaults.battery_feed_suffix,
            ),
            wifi_ssid: string_var("CIRCUITPY_WIFI_SSID", &defaults.wifi_ssid),
            wifi_password: string_var("CIRCUITPY_WIFI_PASSWORD", &defaults.wifi_password),
            report_interval_secs: parsed_var(
                "DISTANCE_MONITOR_REPORT_INTERVAL",
                defaults.report_interval_secs,
            ),
            min_report_interval_secs: parsed_var(
                "DISTANCE_MONITOR_MIN_REPORT_INTERVAL",
                defaults.min_report_interval_secs,
            ),
            awake_time_secs: parsed_var("DISTANCE_MONITOR_AWAKE_TIME", defaults.awake_time_secs),
            default_hysteresis: parsed_var(
                "DISTANCE_MONITOR_DEFAULT_HYSTERESIS",
                defaults.default_hysteresis,
            ),
            min_hysteresis: parsed_var(
                "DISTANCE_MONITOR_MIN_HYSTERESIS",
                defaults.min_hysteresis,
            ),
            max_hysteresis: parsed_var(
                "DISTANCE_MONITOR_MAX_HYSTERESIS",
                defaults.max_hysteresis,
            ),
            policy: match string_var("DISTANCE_MONITOR_POLICY", "interval").as_str() {
                "fixed-clock" => ReportPolicy::FixedClock,
                "interval" => ReportPolicy::Interval,
                other => {
                    log::warn!("unknown policy '{}', using interval", other);
                    ReportPolicy::Interval
                }
            },
            board: match string_var("DISTANCE_MONITOR_BOARD", "full-button").as_str() {
                "single-button" => BoardProfile::SingleButton,
                "full-button" => BoardProfile::FullButton,
                other => {
                    log::warn!("unknown board '{}', using full-button", other);
                    BoardProfile::FullButton
                }
            },
            has_display: parsed_var("DISTANCE_MONITOR_DISPLAY", true),
            state_path: string_var("DISTANCE_MONITOR_STATE_PATH", &defaults.state_path),
        };

        for (key, value) in [
            ("ADAFRUIT_AIO_USERNAME", &cfg.aio_username),
            ("ADAFRUIT_AIO_KEY", &cfg.aio_key),
            ("CIRCUITPY_WIFI_SSID", &cfg.wifi_ssid),
        ] {
            if value.is_empty() {
                log::warn!("{} not set", key);
            }
        }

        // A misordered pair would make every clamp nonsensical.
        if cfg.min_hysteresis > cfg.max_hysteresis {
            log::warn!("hysteresis bounds inverted, using defaults");
            cfg.min_hysteresis = defaults.min_hysteresis;
            cfg.max_hysteresis = defaults.max_hysteresis;
        }
        cfg.default_hysteresis = cfg.hysteresis_bounds().clamp(cfg.default_hysteresis);

        cfg
    }

    /// Clamp range for user hysteresis adjustments.
    pub fn hysteresis_bounds(&self) -> HysteresisBounds {
        HysteresisBounds {
            min_cm: self.min_hysteresis,
            max_cm: self.max_hysteresis,
        }
    }

    /// Elapsed-time cadence parameters.
    pub fn cadence(&self) -> Cadence {
        Cadence {
            report_interval_secs: self.report_interval_secs,
            min_report_interval_secs: self.min_report_interval_secs,
        }
    }

    /// Defaults handed to the state store on load.
    pub fn state_defaults(&self) -> StateDefaults {
        StateDefaults {
            hysteresis: self.default_hysteresis,
            bounds: self.hysteresis_bounds(),
        }
    }
}

fn string_var(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parsed_var<T: FromStr + Copy>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            log::warn!("invalid value for {}: '{}', using default", key, raw);
            default
        }),
        Err(_) => default,
    }
}
