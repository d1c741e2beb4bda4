//! Interaction Window Walkthrough
//!
//! Drives the bounded button-polling loop on its own: a user steps the
//! hysteresis threshold down twice, then forces a report, which resets the
//! countdown and extends the window.
//!
//! Run with: cargo run --example 02_interaction_window

use std::cell::Cell;
use std::rc::Rc;

use tankgauge_core::buttons::{BoardProfile, ButtonPad};
use tankgauge_core::display::DisplaySink;
use tankgauge_core::state::{HysteresisBounds, PersistedState, ReadingHistory};
use tankgauge_core::time::{Delay, TimeSource, Timestamp};
use tankgauge_core::uplink::Uplink;
use tankgauge_core::window::InteractionWindow;

#[derive(Clone)]
struct SimClock(Rc<Cell<u64>>);

impl TimeSource for SimClock {
    fn now(&self) -> Timestamp {
        self.0.get() / 1_000
    }
}

struct SimDelay(SimClock);

impl Delay for SimDelay {
    fn pause_ms(&mut self, ms: u32) {
        self.0 .0.set(self.0 .0.get() + u64::from(ms));
    }
}

/// Scripted user: presses (pin, from_ms, until_ms) tuples.
struct ScriptedUser {
    clock: SimClock,
    presses: Vec<(u8, u64, u64)>,
}

impl ButtonPad for ScriptedUser {
    fn is_pressed(&mut self, pin: u8) -> bool {
        let now = self.clock.0.get();
        self.presses
            .iter()
            .any(|&(p, from, until)| p == pin && now >= from && now < until)
    }

    fn release(&mut self) {}
}

struct CountdownPanel {
    last_shown: Cell<u64>,
}

impl DisplaySink for CountdownPanel {
    fn show_layout(&mut self, _: f32, _: &ReadingHistory, _: f32) {}
    fn update_current(&mut self, _: f32) {}
    fn update_history(&mut self, _: &ReadingHistory) {}

    fn update_hysteresis(&mut self, cm: f32) {
        println!("  [panel] hysteresis -> {:.1}cm", cm);
    }

    fn update_countdown(&mut self, seconds_remaining: u64) {
        // Only narrate changes, the way a real panel only redraws changes.
        if self.last_shown.get() != seconds_remaining {
            println!("  [panel] sleep in {}s", seconds_remaining);
            self.last_shown.set(seconds_remaining);
        }
    }

    fn show_fault(&mut self, _: &str, _: &str) {}
    fn blank(&mut self) {}
}

struct PrintUplink;

impl Uplink for PrintUplink {
    fn send_reading(&mut self, cm: f32) -> bool {
        println!("  [cloud] POST oil-tank-depth = {:.1}", cm);
        true
    }

    fn send_battery(&mut self, _percent: f32) -> bool {
        true
    }

    fn send_note(&mut self, _note: &str) {}

    fn online(&self) -> bool {
        true
    }

    fn power_down(&mut self) {}
}

fn main() {
    let clock = SimClock(Rc::new(Cell::new(0)));
    let mut delay = SimDelay(clock.clone());

    // D0 twice early on (hysteresis down), then D2 at 2.5s (force report).
    let mut user = ScriptedUser {
        clock: clock.clone(),
        presses: vec![(0, 0, 100), (0, 600, 700), (2, 2_500, 2_600)],
    };

    let mut panel = CountdownPanel {
        last_shown: Cell::new(u64::MAX),
    };
    let mut uplink = PrintUplink;
    let mut state = PersistedState::cold_start(2.0);

    let window = InteractionWindow {
        awake_secs: 4,
        profile: BoardProfile::FullButton,
        bounds: HysteresisBounds::default(),
    };

    println!("window opens for {}s, current level 87.5cm", window.awake_secs);
    window.run(
        &mut state,
        87.5,
        &mut user,
        &mut panel,
        &mut uplink,
        &clock,
        &mut delay,
    );

    println!(
        "window closed at {:.1}s with hysteresis {:.1}cm, last report at {}s",
        clock.0.get() as f64 / 1_000.0,
        state.hysteresis,
        state.last_report_time
    );
}
