//! Interaction Window
//!
//! After the measurement half of the cycle, the device stays awake for a
//! bounded window so a human can read the screen and press buttons. One
//! state, one countdown: every poll tick refreshes the countdown field and
//! samples each configured button once. A detected press acts, then pauses
//! long enough to double as hardware debounce.
//!
//! A forced report resets the countdown deadline whether or not the post
//! succeeded — someone standing at the device should not have it go dark
//! mid-interaction. The only exit is deadline expiry.

use crate::buttons::{BoardProfile, ButtonPad, ButtonRole};
use crate::constants::{DEBOUNCE_PAUSE_MS, POLL_TICK_MS};
use crate::display::DisplaySink;
use crate::state::{HysteresisBounds, PersistedState};
use crate::time::{Delay, TimeSource};
use crate::uplink::Uplink;

/// Bounded button-polling loop.
#[derive(Debug, Clone, Copy)]
pub struct InteractionWindow {
    /// Seconds of wakefulness granted per entry (and per forced report)
    pub awake_secs: u64,
    /// Board wiring to poll
    pub profile: BoardProfile,
    /// Clamp range for hysteresis adjustments
    pub bounds: HysteresisBounds,
}

impl InteractionWindow {
    /// Poll buttons until the deadline passes, mutating `state` in place.
    ///
    /// The pauses taken through `delay` are what advances time here; a
    /// `Delay` that consumes no real time must be paired with a
    /// `TimeSource` it advances, or the deadline never arrives.
    pub fn run<B, S, U, T, D>(
        &self,
        state: &mut PersistedState,
        current_cm: f32,
        pad: &mut B,
        display: &mut S,
        uplink: &mut U,
        time: &T,
        delay: &mut D,
    ) where
        B: ButtonPad,
        S: DisplaySink,
        U: Uplink,
        T: TimeSource,
        D: Delay,
    {
        let buttons = self.profile.buttons();
        let mut deadline = time.now() + self.awake_secs;

        loop {
            let now = time.now();
            if now >= deadline {
                break;
            }
            display.update_countdown(deadline - now);

            for button in buttons.iter() {
                if !pad.is_pressed(button.pin) {
                    continue;
                }

                match button.role {
                    ButtonRole::LowerHysteresis => {
                        state.lower_hysteresis(&self.bounds);
                        log::info!("hysteresis decreased to {:.1}cm", state.hysteresis);
                        display.update_hysteresis(state.hysteresis);
                    }
                    ButtonRole::RaiseHysteresis => {
                        state.raise_hysteresis(&self.bounds);
                        log::info!("hysteresis increased to {:.1}cm", state.hysteresis);
                        display.update_hysteresis(state.hysteresis);
                    }
                    ButtonRole::ForceReport => {
                        log::info!("manual report requested");
                        if uplink.send_reading(current_cm) {
                            state.mark_reported(time.now(), current_cm);
                        } else {
                            log::warn!("manual report failed");
                        }
                        // Extend wakefulness regardless of the outcome.
                        deadline = time.now() + self.awake_secs;
                    }
                }

                delay.pause_ms(DEBOUNCE_PAUSE_MS);
            }

            delay.pause_ms(POLL_TICK_MS);
        }
    }
}
