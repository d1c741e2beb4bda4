//! State Persistence
//!
//! ## Overview
//!
//! The persisted record lives in one small JSON file on whatever durable
//! storage the board offers. The contract is asymmetric on purpose:
//!
//! - **Load never fails.** A missing file, unreadable medium, parse error,
//!   or nonsense field values all mean the same thing — cold start — and
//!   produce the default state. Unknown extra fields are ignored so a newer
//!   firmware's file loads on an older one.
//! - **Save can fail, quietly.** The file is written beside its final name
//!   and renamed into place, so a torn write costs at most one cold start.
//!   A read-only medium (the boot-time storage guard, or a mounted USB
//!   host) is reported as [`StoreError::ReadOnly`] and the cycle continues
//!   without persisting.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror_no_std::Error;

use crate::state::{HysteresisBounds, PersistedState, ReadingHistory};
use crate::time::Timestamp;

/// Why a save did not happen.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Storage is mounted read-only; state is skipped this cycle
    #[error("storage is read-only")]
    ReadOnly,

    /// Some other I/O failure
    #[error("state write failed: {0}")]
    Io(#[from] io::Error),

    /// State could not be serialized (should not happen for these fields)
    #[error("state encode failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Defaults applied when loading finds nothing usable.
#[derive(Debug, Clone, Copy)]
pub struct StateDefaults {
    /// Hysteresis of a cold-start state (cm)
    pub hysteresis: f32,
    /// Clamp range applied to a loaded hysteresis value
    pub bounds: HysteresisBounds,
}

/// On-disk shape of the persisted record.
///
/// `last_reported_distance` arrived after the first firmware shipped, so it
/// is optional and falls back to `last_distance` — old files keep working.
#[derive(Debug, Serialize, Deserialize)]
struct StateFile {
    #[serde(default)]
    last_report_time: Timestamp,
    #[serde(default)]
    last_distance: f32,
    #[serde(default)]
    last_reported_distance: Option<f32>,
    #[serde(default)]
    past_readings: Vec<f32>,
    #[serde(default)]
    hysteresis: Option<f32>,
}

/// Loads and saves the persisted state record.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    /// Store backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the record, or the default state on any failure.
    pub fn load(&self, defaults: &StateDefaults) -> PersistedState {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                log::info!("no state file ({}), starting fresh", e.kind());
                return PersistedState::cold_start(defaults.hysteresis);
            }
        };

        let file: StateFile = match serde_json::from_str(&raw) {
            Ok(file) => file,
            Err(e) => {
                log::warn!("invalid state file ({}), starting fresh", e);
                return PersistedState::cold_start(defaults.hysteresis);
            }
        };

        match validate(file, defaults) {
            Some(state) => {
                log::info!(
                    "loaded state: last report at {}s, distance {:.1}cm, hysteresis {:.1}cm",
                    state.last_report_time,
                    state.last_distance,
                    state.hysteresis
                );
                state
            }
            None => {
                log::warn!("state file failed validation, starting fresh");
                PersistedState::cold_start(defaults.hysteresis)
            }
        }
    }

    /// Write the record, replacing the previous file atomically-enough.
    pub fn save(&self, state: &PersistedState) -> Result<(), StoreError> {
        let file = StateFile {
            last_report_time: state.last_report_time,
            last_distance: state.last_distance,
            last_reported_distance: Some(state.last_reported_distance),
            past_readings: state.past_readings.iter().collect(),
            hysteresis: Some(state.hysteresis),
        };
        let json = serde_json::to_string(&file)?;

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, &json).map_err(classify_io)?;
        fs::rename(&tmp, &self.path).map_err(classify_io)?;
        Ok(())
    }
}

/// Distinguish "the medium refuses writes" from other I/O trouble.
fn classify_io(e: io::Error) -> StoreError {
    match e.kind() {
        io::ErrorKind::PermissionDenied => StoreError::ReadOnly,
        _ if e.raw_os_error() == Some(30) => StoreError::ReadOnly, // EROFS
        _ => StoreError::Io(e),
    }
}

/// Reject files whose numbers make no sense; clamp what is merely out of
/// bounds.
fn validate(file: StateFile, defaults: &StateDefaults) -> Option<PersistedState> {
    let finite_non_negative =
        |v: f32| -> bool { v.is_finite() && v >= 0.0 };

    if !finite_non_negative(file.last_distance) {
        return None;
    }
    let last_reported = file.last_reported_distance.unwrap_or(file.last_distance);
    if !finite_non_negative(last_reported) {
        return None;
    }
    if file.past_readings.iter().any(|v| !finite_non_negative(*v)) {
        return None;
    }

    let hysteresis = match file.hysteresis {
        Some(h) if h.is_finite() => defaults.bounds.clamp(h),
        Some(_) => return None,
        None => defaults.hysteresis,
    };

    Some(PersistedState {
        last_report_time: file.last_report_time,
        last_distance: file.last_distance,
        last_reported_distance: last_reported,
        past_readings: ReadingHistory::from_slice(&file.past_readings),
        hysteresis,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> StateDefaults {
        StateDefaults {
            hysteresis: 2.0,
            bounds: HysteresisBounds::default(),
        }
    }

    fn store_in(dir: &tempfile::TempDir) -> StateStore {
        StateStore::new(dir.path().join("state.json"))
    }

    #[test]
    fn missing_file_is_a_cold_start() {
        let dir = tempfile::tempdir().unwrap();
        let state = store_in(&dir).load(&defaults());

        assert_eq!(state, PersistedState::cold_start(2.0));
    }

    #[test]
    fn save_then_load_round_trips_all_fields() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let mut state = PersistedState::cold_start(2.0);
        state.last_report_time = 12_345;
        state.last_distance = 87.5;
        state.last_reported_distance = 88.0;
        state.hysteresis = 3.5;
        for cm in [80.0, 81.5, 83.0] {
            state.past_readings.push_front(cm);
        }

        store.save(&state).unwrap();
        assert_eq!(store.load(&defaults()), state);
    }

    #[test]
    fn invalid_json_is_a_cold_start() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "{not json").unwrap();

        let state = store.load(&defaults());
        assert_eq!(state.hysteresis, 2.0);
        assert_eq!(state.last_distance, 0.0);
        assert_eq!(state.last_report_time, 0);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(
            store.path(),
            r#"{"last_report_time": 7, "last_distance": 42.0, "firmware": "v9", "extra": [1,2]}"#,
        )
        .unwrap();

        let state = store.load(&defaults());
        assert_eq!(state.last_report_time, 7);
        assert_eq!(state.last_distance, 42.0);
        // Optional field defaults to last_distance for pre-upgrade files.
        assert_eq!(state.last_reported_distance, 42.0);
    }

    #[test]
    fn nonsense_numbers_are_a_cold_start() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), r#"{"last_distance": -3.0}"#).unwrap();

        assert_eq!(store.load(&defaults()), PersistedState::cold_start(2.0));
    }

    #[test]
    fn out_of_bounds_hysteresis_is_clamped_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), r#"{"hysteresis": 99.0}"#).unwrap();

        let state = store.load(&defaults());
        assert_eq!(state.hysteresis, HysteresisBounds::default().max_cm);
    }

    #[test]
    fn oversized_history_is_truncated_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(
            store.path(),
            r#"{"past_readings": [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]}"#,
        )
        .unwrap();

        let state = store.load(&defaults());
        assert_eq!(state.past_readings.len(), crate::constants::MAX_STORED_READINGS);
        assert_eq!(state.past_readings.as_slice(), &[1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn read_only_medium_is_classified() {
        let e = io::Error::from(io::ErrorKind::PermissionDenied);
        assert!(matches!(classify_io(e), StoreError::ReadOnly));
    }
}
