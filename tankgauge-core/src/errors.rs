//! Error Types for the Wake Cycle
//!
//! ## Design Philosophy
//!
//! The monitor's error system follows the same rules as the rest of the
//! crate:
//!
//! 1. **Small Size**: Error variants carry at most a status byte or a
//!    `&'static str` reason. They travel through hot polling loops and may
//!    be forwarded to the diagnostic feed, so no heap, no `String`.
//!
//! 2. **Copy Semantics**: Errors implement `Copy` so sampling loops can
//!    record and continue without move gymnastics.
//!
//! 3. **Convergent Handling**: Per the error taxonomy, every failure ends in
//!    one of two places — "continue degraded" (sensor, store, transport) or
//!    "restart" (anything unclassified, via [`CycleError`]). Nothing hangs.
//!
//! ## Error Categories
//!
//! ### Sensor acquisition
//! [`SensorError`] covers the ranging hardware: device discovery, data-ready
//! polling, per-sample range status, and the all-samples-failed case. These
//! are recovered locally by the orchestrator (last-known-good distance, then
//! a hardcoded default) and are never fatal on their own.
//!
//! ### Cycle level
//! [`CycleError`] is what escapes to the top-level guard. A probe failure at
//! bring-up is the one sensor condition with no degraded continuation (the
//! original firmware raised straight out of sensor init); `Fault` is the
//! catch-all for a capability violating its contract.

use thiserror_no_std::Error;

/// Errors from the ranging sensor capability.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// No supported ranging device answered the probe
    #[error("no supported distance sensor found")]
    NoDevice,

    /// Bus transaction with the device failed
    #[error("sensor bus error")]
    Bus,

    /// Data-ready never asserted within the bounded retries
    #[error("sensor data not ready")]
    NotReady,

    /// Device flagged the measurement as unusable
    #[error("range status error: {0}")]
    RangeStatus(u8),

    /// A full sampling pass produced zero readings
    #[error("no distance readings obtained")]
    NoSamples,
}

#[cfg(feature = "defmt")]
impl defmt::Format for SensorError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            SensorError::NoDevice => defmt::write!(fmt, "no ranging device"),
            SensorError::Bus => defmt::write!(fmt, "sensor bus error"),
            SensorError::NotReady => defmt::write!(fmt, "data not ready"),
            SensorError::RangeStatus(s) => defmt::write!(fmt, "range status {}", s),
            SensorError::NoSamples => defmt::write!(fmt, "no samples"),
        }
    }
}

/// Errors that abort the wake cycle and route through the restart path.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleError {
    /// Sensor bring-up failed; there is nothing to measure with
    #[error("sensor probe failed: {0}")]
    Probe(SensorError),

    /// A collaborator broke its contract in a way the cycle cannot absorb
    #[error("cycle fault: {0}")]
    Fault(&'static str),
}

impl From<SensorError> for CycleError {
    fn from(e: SensorError) -> Self {
        CycleError::Probe(e)
    }
}
