//! Simulated Wake Cycles
//!
//! Runs two complete wake cycles against simulated hardware:
//!
//! 1. A cold start: no state file, nothing due, the device just measures,
//!    shows its panel, persists, and plans the next wake.
//! 2. A later timer wake where the level has dropped past the hysteresis
//!    threshold, so the reading is reported.
//!
//! Everything hardware-shaped is a small inline fake; time advances through
//! the pauses the cycle takes, so the whole thing runs instantly.
//!
//! Run with: cargo run --example 01_simulated_cycle

use std::cell::Cell;
use std::rc::Rc;

use tankgauge_core::buttons::{BoardProfile, ButtonPad};
use tankgauge_core::cycle::{run_guarded, CycleOutcome, CyclePorts, Orchestrator, WakeContext, WakeReason};
use tankgauge_core::display::DisplaySink;
use tankgauge_core::errors::SensorError;
use tankgauge_core::scheduler::{Cadence, ReportPolicy};
use tankgauge_core::sensor::{RangeSensor, SensorReader};
use tankgauge_core::state::{HysteresisBounds, ReadingHistory};
use tankgauge_core::store::StateStore;
use tankgauge_core::time::{Delay, TimeSource, Timestamp, WallClock};
use tankgauge_core::uplink::Uplink;

/// Shared millisecond clock; the delay advances it instead of sleeping.
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

/// Tank level that answers the same distance every sample.
struct SteadyTank(f32);

impl RangeSensor for SteadyTank {
    fn sample(&mut self) -> Result<f32, SensorError> {
        Ok(self.0)
    }

    fn out_of_range_cm(&self) -> f32 {
        400.0
    }
}

struct NoButtons;

impl ButtonPad for NoButtons {
    fn is_pressed(&mut self, _pin: u8) -> bool {
        false
    }

    fn release(&mut self) {
        println!("  [pins] button holds released for wake triggers");
    }
}

/// Panel that prints the field updates it receives.
struct PrintPanel;

impl DisplaySink for PrintPanel {
    fn show_layout(&mut self, current_cm: f32, history: &ReadingHistory, hysteresis_cm: f32) {
        println!(
            "  [panel] current {:.1}cm | past {:?} | hysteresis {:.1}cm",
            current_cm,
            history.as_slice(),
            hysteresis_cm
        );
    }

    fn update_current(&mut self, cm: f32) {
        println!("  [panel] current -> {:.1}cm", cm);
    }

    fn update_history(&mut self, history: &ReadingHistory) {
        println!("  [panel] past -> {:?}", history.as_slice());
    }

    fn update_hysteresis(&mut self, cm: f32) {
        println!("  [panel] hysteresis -> {:.1}cm", cm);
    }

    fn update_countdown(&mut self, _seconds_remaining: u64) {}

    fn show_fault(&mut self, headline: &str, detail: &str) {
        println!("  [panel] {}: {}", headline, detail);
    }

    fn blank(&mut self) {
        println!("  [panel] blanked for sleep");
    }
}

/// Uplink that prints instead of touching a network.
struct PrintUplink;

impl Uplink for PrintUplink {
    fn send_reading(&mut self, cm: f32) -> bool {
        println!("  [cloud] POST oil-tank-depth = {:.1}", cm);
        true
    }

    fn send_battery(&mut self, percent: f32) -> bool {
        println!("  [cloud] POST oil-tank-depth-battery = {:.1}", percent);
        true
    }

    fn send_note(&mut self, note: &str) {
        println!("  [cloud] POST error = {:?}", note);
    }

    fn online(&self) -> bool {
        true
    }

    fn power_down(&mut self) {
        println!("  [radio] powered down");
    }
}

fn run_one(
    orch: &Orchestrator,
    store: &StateStore,
    clock: &SimClock,
    level_cm: f32,
    reason: WakeReason,
) {
    let mut sensor = SteadyTank(level_cm);
    let mut buttons = NoButtons;
    let mut display = PrintPanel;
    // The guard gets its own handle so it can paint a fault even when the
    // cycle died holding the main one.
    let mut fault_panel = PrintPanel;
    let mut uplink = PrintUplink;
    let mut delay = SimDelay(clock.clone());
    let ctx = WakeContext {
        reason,
        woke_at: clock.now(),
    };

    let outcome = run_guarded(&mut fault_panel, || {
        let mut ports = CyclePorts {
            sensor: &mut sensor,
            buttons: &mut buttons,
            display: &mut display,
            uplink: &mut uplink,
            time: clock,
            delay: &mut delay,
            battery: None,
        };
        orch.run_cycle(store, &mut ports, &ctx, &WallClock::unsynced())
    });

    match outcome {
        CycleOutcome::Sleep(plan) => println!(
            "  -> sleep {}s, {} edge trigger(s) armed\n",
            plan.sleep_secs,
            plan.triggers.len()
        ),
        CycleOutcome::Restart { delay_secs } => {
            println!("  -> restart in {}s\n", delay_secs)
        }
    }
}

fn main() {
    let state_path = std::env::temp_dir().join("tankgauge-example-state.json");
    let _ = std::fs::remove_file(&state_path);
    let store = StateStore::new(&state_path);

    let orch = Orchestrator {
        policy: ReportPolicy::Interval,
        cadence: Cadence::default(),
        bounds: HysteresisBounds::default(),
        default_hysteresis: 2.0,
        awake_secs: 2,
        profile: BoardProfile::FullButton,
        reader: SensorReader::default(),
    };

    let clock = SimClock(Rc::new(Cell::new(60_000)));

    println!("=== cycle 1: cold start, level 87.5cm ===");
    run_one(&orch, &store, &clock, 87.5, WakeReason::Startup);

    // Three hours pass in deep sleep; the oil level drops 4cm.
    clock.0.set(clock.0.get() + 10_800_000);

    println!("=== cycle 2: timer wake, level 91.5cm (burned oil) ===");
    run_one(&orch, &store, &clock, 91.5, WakeReason::Timer);

    let _ = std::fs::remove_file(&state_path);
}
