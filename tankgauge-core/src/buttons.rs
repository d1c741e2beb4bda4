//! Button Wiring and Board Profiles
//!
//! The monitor ships on two board variants: the full three-button board and
//! a cut-down single-button one. Instead of probing pins at runtime, the
//! variant is selected once by configuration and a [`BoardProfile`] answers
//! every wiring question: which buttons exist, what each one does, its
//! active polarity, and which ones get re-armed as wake sources.
//!
//! Button reads go through the [`ButtonPad`] capability so the core never
//! touches GPIO directly; the host must be able to [`release`]
//! (`ButtonPad::release`) its exclusive hold before sleeping, because the
//! same physical pins are claimed again as edge-triggered wake sources.

use heapless::Vec;

/// Electrical level at which a button reads as pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveLevel {
    /// Pressed pulls the pin high
    High,
    /// Pressed pulls the pin low
    Low,
}

/// What a button does when pressed inside the interaction window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonRole {
    /// Step the hysteresis threshold down
    LowerHysteresis,
    /// Step the hysteresis threshold up
    RaiseHysteresis,
    /// Report immediately, regardless of the scheduler's decision
    ForceReport,
}

/// One physical button: pin, meaning, polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonSpec {
    /// Host pin identifier
    pub pin: u8,
    /// Action bound to the button
    pub role: ButtonRole,
    /// Polarity at which the button reads pressed
    pub active: ActiveLevel,
}

/// Maximum buttons any profile wires up.
pub const MAX_BUTTONS: usize = 3;

/// Edge-sampled button input capability.
///
/// One sample per poll tick is sufficient; the window's post-press pause
/// provides debounce.
pub trait ButtonPad {
    /// Whether the button on `pin` currently reads pressed
    fn is_pressed(&mut self, pin: u8) -> bool;

    /// Drop any exclusive pin holds so wake triggers can claim them
    fn release(&mut self);
}

/// Board variant, selected once at startup by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoardProfile {
    /// Three buttons: hysteresis down (D0, active low), hysteresis up (D1,
    /// active high), force report (D2, active high)
    #[default]
    FullButton,
    /// One button (D0, active low) that forces a report
    SingleButton,
}

impl BoardProfile {
    /// Buttons polled during the interaction window.
    pub fn buttons(&self) -> Vec<ButtonSpec, MAX_BUTTONS> {
        let mut v = Vec::new();
        match self {
            BoardProfile::FullButton => {
                let _ = v.push(ButtonSpec {
                    pin: 0,
                    role: ButtonRole::LowerHysteresis,
                    active: ActiveLevel::Low,
                });
                let _ = v.push(ButtonSpec {
                    pin: 1,
                    role: ButtonRole::RaiseHysteresis,
                    active: ActiveLevel::High,
                });
                let _ = v.push(ButtonSpec {
                    pin: 2,
                    role: ButtonRole::ForceReport,
                    active: ActiveLevel::High,
                });
            }
            BoardProfile::SingleButton => {
                let _ = v.push(ButtonSpec {
                    pin: 0,
                    role: ButtonRole::ForceReport,
                    active: ActiveLevel::Low,
                });
            }
        }
        v
    }

    /// Buttons re-armed as edge-triggered wake sources before sleep.
    ///
    /// The full board's D0 doubles as the enter-sleep gesture and cannot be
    /// re-armed on this wiring; the single-button board arms its only
    /// button.
    pub fn wake_buttons(&self) -> Vec<ButtonSpec, MAX_BUTTONS> {
        let mut v = self.buttons();
        if matches!(self, BoardProfile::FullButton) {
            v.remove(0);
        }
        v
    }
}
