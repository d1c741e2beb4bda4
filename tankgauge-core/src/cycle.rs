//! Wake-Cycle Orchestration
//!
//! ## Overview
//!
//! One call to [`Orchestrator::run_cycle`] is one life of the process:
//!
//! ```text
//! load state -> read sensor -> decide -> (report) -> interaction window
//!            -> save state -> plan next wake -> return plan to host
//! ```
//!
//! The host tears the process down, arms the plan's alarms, and enters deep
//! sleep; the next wake is a fresh start with state reloaded from storage.
//! There is no global mutable state: the orchestrator owns the
//! [`PersistedState`] for the duration of the cycle and collaborators
//! borrow it.
//!
//! ## Degraded continuations
//!
//! Sensor trouble falls back to the last known good distance, then to a
//! hardcoded default. A failed report is retried naturally at the next
//! wake. A read-only store skips persistence. None of these abort the
//! cycle. What *does* abort — a failed sensor probe at bring-up, or a
//! panic out of a capability — lands in [`run_guarded`], which paints a
//! fault screen and tells the host to restart after a short delay.

use crate::time::Timestamp;

/// Why the device is awake right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeReason {
    /// Cold boot or power-on
    Startup,
    /// Edge-triggered pin alarm from a button
    Button,
    /// Time-based alarm
    Timer,
}

/// Ephemeral per-wake context, reconstructed every cycle.
#[derive(Debug, Clone, Copy)]
pub struct WakeContext {
    /// What ended the previous sleep
    pub reason: WakeReason,
    /// Uptime when the cycle started (seconds)
    pub woke_at: Timestamp,
}

/// What the host should do after the cycle returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Arm the plan's alarms and enter deep sleep
    Sleep(crate::sleep::NextWakePlan),
    /// Something unrecoverable happened; reboot after the delay
    Restart {
        /// Seconds to leave the fault visible before rebooting
        delay_secs: u32,
    },
}

#[cfg(feature = "std")]
pub use self::orchestrator::{run_guarded, CyclePorts, Orchestrator};

#[cfg(feature = "std")]
mod orchestrator {
    use super::{CycleOutcome, WakeContext};
    use crate::buttons::{BoardProfile, ButtonPad};
    use crate::config::MonitorConfig;
    use crate::constants::{FALLBACK_DISTANCE_CM, RESTART_DELAY_SECS};
    use crate::display::DisplaySink;
    use crate::errors::CycleError;
    use crate::scheduler::{self, Cadence, ReportPolicy};
    use crate::sensor::{BatteryGauge, RangeSensor, Reading, SensorReader};
    use crate::sleep::{self, NextWakePlan};
    use crate::state::HysteresisBounds;
    use crate::store::{StateStore, StoreError};
    use crate::time::{Delay, TimeSource, WallClock};
    use crate::uplink::Uplink;
    use crate::window::InteractionWindow;

    /// Borrowed capabilities for one wake cycle.
    pub struct CyclePorts<'a, S, B, D, U, T, P>
    where
        S: RangeSensor,
        B: ButtonPad,
        D: DisplaySink,
        U: Uplink,
        T: TimeSource,
        P: Delay,
    {
        /// Ranging device selected by the startup probe
        pub sensor: &'a mut S,
        /// Button bank
        pub buttons: &'a mut B,
        /// Display, or [`crate::display::NullDisplay`] when absent
        pub display: &'a mut D,
        /// Cloud reporting capability
        pub uplink: &'a mut U,
        /// Continuously-running uptime clock
        pub time: &'a T,
        /// Pause source
        pub delay: &'a mut P,
        /// Battery gauge, if the board has one
        pub battery: Option<&'a mut dyn BatteryGauge>,
    }

    /// Sequences one full wake cycle.
    #[derive(Debug, Clone, Copy)]
    pub struct Orchestrator {
        /// Scheduling policy
        pub policy: ReportPolicy,
        /// Elapsed-time cadence
        pub cadence: Cadence,
        /// Hysteresis clamp range
        pub bounds: HysteresisBounds,
        /// Cold-start hysteresis (cm)
        pub default_hysteresis: f32,
        /// Interaction window length (seconds)
        pub awake_secs: u64,
        /// Board wiring
        pub profile: BoardProfile,
        /// Multi-sample reader policy
        pub reader: SensorReader,
    }

    impl Orchestrator {
        /// Orchestrator configured from the environment surface.
        pub fn from_config(cfg: &MonitorConfig) -> Self {
            Self {
                policy: cfg.policy,
                cadence: cfg.cadence(),
                bounds: cfg.hysteresis_bounds(),
                default_hysteresis: cfg.default_hysteresis,
                awake_secs: cfg.awake_time_secs,
                profile: cfg.board,
                reader: SensorReader::default(),
            }
        }

        /// Run one wake cycle and return the next wake plan.
        pub fn run_cycle<S, B, D, U, T, P>(
            &self,
            store: &StateStore,
            ports: &mut CyclePorts<'_, S, B, D, U, T, P>,
            ctx: &WakeContext,
            wall: &WallClock,
        ) -> Result<NextWakePlan, CycleError>
        where
            S: RangeSensor,
            B: ButtonPad,
            D: DisplaySink,
            U: Uplink,
            T: TimeSource,
            P: Delay,
        {
            log::info!("wake: {:?} at {}s", ctx.reason, ctx.woke_at);

            let mut state = store.load(&crate::store::StateDefaults {
                hysteresis: self.default_hysteresis,
                bounds: self.bounds,
            });

            let reading = self.reader.read(ports.sensor, ports.delay);
            let (current, note) = match reading {
                Reading::Valid(cm) => (cm, None),
                Reading::Questionable(cm) => (
                    cm,
                    Some(format!("using mean of questionable readings: {:.1}cm", cm)),
                ),
                Reading::Invalid => {
                    if state.last_distance > 0.0 {
                        log::warn!(
                            "no reading, using last known distance {:.1}cm",
                            state.last_distance
                        );
                        (
                            state.last_distance,
                            Some("no distance readings obtained".to_string()),
                        )
                    } else {
                        log::warn!("no reading and no history, using default");
                        (
                            FALLBACK_DISTANCE_CM,
                            Some("no distance readings obtained".to_string()),
                        )
                    }
                }
            };

            state.remember_previous();

            let now = ports.time.now();
            let decision = scheduler::decide(
                self.policy,
                &self.cadence,
                now,
                wall.minutes_of_day(now),
                &state,
                current,
                ctx.reason,
            );

            if !decision.skip_interaction {
                ports
                    .display
                    .show_layout(current, &state.past_readings, state.hysteresis);
            }

            if decision.should_report {
                log::info!("reporting {:.1}cm ({})", current, decision.reason.as_str());
                if ports.uplink.send_reading(current) {
                    state.mark_reported(ports.time.now(), current);
                    self.report_battery(ports);
                } else {
                    log::warn!("report failed, next wake will retry");
                }
            }

            // Sensor diagnostics ride along only when the link is already up;
            // they are not worth a radio power-up of their own.
            if let Some(note) = &note {
                if ports.uplink.online() {
                    ports.uplink.send_note(note);
                }
            }

            state.update_last_distance(current);

            if !decision.skip_interaction {
                let window = InteractionWindow {
                    awake_secs: self.awake_secs,
                    profile: self.profile,
                    bounds: self.bounds,
                };
                window.run(
                    &mut state,
                    current,
                    ports.buttons,
                    ports.display,
                    ports.uplink,
                    ports.time,
                    ports.delay,
                );
            } else {
                log::info!("nothing due on timer wake, returning to sleep");
            }

            match store.save(&state) {
                Ok(()) => log::debug!("state saved"),
                Err(StoreError::ReadOnly) => {
                    log::warn!("read-only filesystem, state won't be saved")
                }
                Err(e) => log::warn!("error saving state: {}", e),
            }

            let plan = sleep::plan(
                self.policy,
                &self.cadence,
                ports.time.now(),
                &state,
                wall,
                self.profile,
            );

            ports.uplink.power_down();
            ports.buttons.release();
            ports.display.blank();

            Ok(plan)
        }

        fn report_battery<S, B, D, U, T, P>(&self, ports: &mut CyclePorts<'_, S, B, D, U, T, P>)
        where
            S: RangeSensor,
            B: ButtonPad,
            D: DisplaySink,
            U: Uplink,
            T: TimeSource,
            P: Delay,
        {
            if let Some(gauge) = ports.battery.as_mut() {
                if let Some(percent) = gauge.read_percent() {
                    if !ports.uplink.send_battery(percent) {
                        log::warn!("battery report failed");
                    }
                }
            }
        }
    }

    /// Run a cycle under the top-level fault guard.
    ///
    /// Converts a cycle error or a panic out of a capability into a fault
    /// screen plus a restart instruction; the happy path passes the wake
    /// plan through untouched.
    pub fn run_guarded<D, F>(display: &mut D, cycle: F) -> CycleOutcome
    where
        D: DisplaySink,
        F: FnOnce() -> Result<NextWakePlan, CycleError>,
    {
        match std::panic::catch_unwind(std::panic::AssertUnwindSafe(cycle)) {
            Ok(Ok(plan)) => CycleOutcome::Sleep(plan),
            Ok(Err(e)) => {
                log::error!("critical error: {}", e);
                display.show_fault("ERROR", &e.to_string());
                CycleOutcome::Restart {
                    delay_secs: RESTART_DELAY_SECS,
                }
            }
            Err(panic) => {
                let detail = panic
                    .downcast_ref::<&str>()
                    .copied()
                    .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
                    .unwrap_or("unknown panic");
                log::error!("critical error: panic: {}", detail);
                display.show_fault("ERROR", detail);
                CycleOutcome::Restart {
                    delay_secs: RESTART_DELAY_SECS,
                }
            }
        }
    }
}
