//! Core engine for the tankgauge duty-cycled distance monitor
//!
//! One wake cycle: load persisted state, take a distance reading, decide
//! whether the change is worth reporting, optionally push it to a cloud
//! feed, give a human a bounded window to interact with the on-device
//! buttons, persist state, and hand the host a plan for the next wake.
//!
//! Key constraints:
//! - Single-threaded cooperative polling, no async runtime
//! - Deep sleep is a process exit; every cycle is a fresh start
//! - No failure path may hang the device: continue degraded or restart
//!
//! ```no_run
//! use tankgauge_core::{scheduler, state::PersistedState, cycle::WakeReason};
//!
//! let state = PersistedState::cold_start(2.0);
//! let decision = scheduler::decide(
//!     scheduler::ReportPolicy::Interval,
//!     &scheduler::Cadence::default(),
//!     3_600,
//!     None,
//!     &state,
//!     120.0,
//!     WakeReason::Timer,
//! );
//! assert!(!decision.should_report);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod boot;
pub mod buttons;
pub mod constants;
pub mod cycle;
pub mod display;
pub mod errors;
pub mod scheduler;
pub mod sensor;
pub mod sleep;
pub mod state;
pub mod time;
pub mod uplink;
pub mod window;

#[cfg(feature = "std")]
pub mod config;
#[cfg(feature = "std")]
pub mod store;

// Public API
pub use cycle::{CycleOutcome, WakeContext, WakeReason};
pub use errors::{CycleError, SensorError};
pub use scheduler::{ReportDecision, ReportPolicy, ReportReason};
pub use sensor::{RangeSensor, Reading, SensorReader};
pub use sleep::NextWakePlan;
pub use state::{HysteresisBounds, PersistedState, ReadingHistory};
pub use time::{Delay, TimeSource, Timestamp};

/// Crate version, stamped into the uplink user agent.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
