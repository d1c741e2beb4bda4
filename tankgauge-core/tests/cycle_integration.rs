//! Integration tests for the full wake cycle
//!
//! Each test runs one complete cycle — load, measure, decide, report,
//! interact, persist, plan — against scripted capabilities and a real
//! state file in a temp directory.

mod common;

use common::{
    FixedBattery, RecordingDisplay, RecordingUplink, ScriptedSensor, SimClock, SimDelay,
    TimedPress,
};

use tankgauge_core::buttons::BoardProfile;
use tankgauge_core::cycle::{CyclePorts, Orchestrator, WakeContext, WakeReason};
use tankgauge_core::scheduler::{Cadence, ReportPolicy};
use tankgauge_core::sensor::SensorReader;
use tankgauge_core::state::{HysteresisBounds, PersistedState};
use tankgauge_core::store::{StateDefaults, StateStore};
use tankgauge_core::time::WallClock;

fn orchestrator(policy: ReportPolicy, awake_secs: u64) -> Orchestrator {
    Orchestrator {
        policy,
        cadence: Cadence::default(),
        bounds: HysteresisBounds::default(),
        default_hysteresis: 2.0,
        awake_secs,
        profile: BoardProfile::FullButton,
        reader: SensorReader::default(),
    }
}

fn defaults() -> StateDefaults {
    StateDefaults {
        hysteresis: 2.0,
        bounds: HysteresisBounds::default(),
    }
}

/// State that has reported `cm` once, `at` seconds of uptime.
fn reported_state(cm: f32, at: u64) -> PersistedState {
    let mut state = PersistedState::cold_start(2.0);
    state.last_report_time = at;
    state.last_distance = cm;
    state.last_reported_distance = cm;
    state
}

struct Rig {
    clock: SimClock,
    sensor: ScriptedSensor,
    buttons: TimedPress,
    display: RecordingDisplay,
    uplink: RecordingUplink,
}

impl Rig {
    fn new(start_secs: u64, sensor: ScriptedSensor) -> Self {
        let clock = SimClock::starting_at_secs(start_secs);
        Self {
            buttons: TimedPress::never(clock.clone()),
            clock,
            sensor,
            display: RecordingDisplay::default(),
            uplink: RecordingUplink::accepting(),
        }
    }

    fn run(
        &mut self,
        orch: &Orchestrator,
        store: &StateStore,
        reason: WakeReason,
        wall: &WallClock,
    ) -> tankgauge_core::sleep::NextWakePlan {
        let mut delay = SimDelay(self.clock.clone());
        let ctx = WakeContext {
            reason,
            woke_at: self.clock.ms() / 1_000,
        };
        let mut ports = CyclePorts {
            sensor: &mut self.sensor,
            buttons: &mut self.buttons,
            display: &mut self.display,
            uplink: &mut self.uplink,
            time: &self.clock,
            delay: &mut delay,
            battery: None,
        };
        orch.run_cycle(store, &mut ports, &ctx, wall)
            .expect("cycle should complete")
    }
}

#[test]
fn cold_start_measures_persists_and_plans() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(dir.path().join("state.json"));
    let orch = orchestrator(ReportPolicy::Interval, 1);
    let mut rig = Rig::new(60, ScriptedSensor::steady(100.0));

    let plan = rig.run(&orch, &store, WakeReason::Startup, &WallClock::unsynced());

    // Nothing due yet, so nothing reported — but the UI ran.
    assert!(rig.uplink.readings.is_empty());
    assert_eq!(rig.display.layouts.len(), 1);
    assert_eq!(rig.display.layouts[0].0, 100.0);
    assert!(rig.display.layouts[0].1.is_empty());
    assert!(rig.display.hysteresis_updates.borrow().is_empty());

    // The cycle ends with everything put away.
    assert!(rig.display.blanked.get());
    assert!(rig.buttons.released.get());
    assert!(rig.uplink.powered_down);

    // Regular interval; two wake buttons armed on the full board.
    assert_eq!(plan.sleep_secs, 10_800);
    assert_eq!(plan.triggers.len(), 2);

    let reloaded = store.load(&defaults());
    assert_eq!(reloaded.last_distance, 100.0);
    assert_eq!(reloaded.last_report_time, 0);
}

#[test]
fn timer_wake_with_nothing_due_skips_interaction() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(dir.path().join("state.json"));
    store.save(&reported_state(50.0, 950)).unwrap();

    let orch = orchestrator(ReportPolicy::Interval, 1);
    // 0.5cm below the 2.0cm threshold.
    let mut rig = Rig::new(1_000, ScriptedSensor::steady(50.5));

    let plan = rig.run(&orch, &store, WakeReason::Timer, &WallClock::unsynced());

    assert!(rig.uplink.readings.is_empty());
    // Display and buttons were never engaged on the no-op wake.
    assert!(rig.display.layouts.is_empty());
    assert_eq!(rig.display.countdowns.get(), 0);
    assert!(rig.display.blanked.get());
    assert_eq!(plan.sleep_secs, 10_800);

    // The measurement still advanced the stored state.
    let reloaded = store.load(&defaults());
    assert_eq!(reloaded.last_distance, 50.5);
    assert_eq!(reloaded.past_readings.as_slice(), &[50.0]);
}

#[test]
fn button_wake_reports_even_at_zero_delta() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(dir.path().join("state.json"));
    store.save(&reported_state(50.0, 900)).unwrap();

    let orch = orchestrator(ReportPolicy::Interval, 1);
    let mut rig = Rig::new(1_000, ScriptedSensor::steady(50.0));

    rig.run(&orch, &store, WakeReason::Button, &WallClock::unsynced());

    assert_eq!(rig.uplink.readings, vec![50.0]);
    let reloaded = store.load(&defaults());
    assert!(reloaded.last_report_time >= 1_000);
    assert_eq!(reloaded.last_reported_distance, 50.0);
}

#[test]
fn battery_rides_along_with_a_successful_report() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(dir.path().join("state.json"));
    store.save(&reported_state(50.0, 900)).unwrap();

    let orch = orchestrator(ReportPolicy::Interval, 1);
    let clock = SimClock::starting_at_secs(1_000);
    let mut sensor = ScriptedSensor::steady(50.0);
    let mut buttons = TimedPress::never(clock.clone());
    let mut display = RecordingDisplay::default();
    let mut uplink = RecordingUplink::accepting();
    let mut delay = SimDelay(clock.clone());
    let mut battery = FixedBattery(77.5);

    let ctx = WakeContext {
        reason: WakeReason::Button,
        woke_at: 1_000,
    };
    let mut ports = CyclePorts {
        sensor: &mut sensor,
        buttons: &mut buttons,
        display: &mut display,
        uplink: &mut uplink,
        time: &clock,
        delay: &mut delay,
        battery: Some(&mut battery),
    };
    orch.run_cycle(&store, &mut ports, &ctx, &WallClock::unsynced())
        .unwrap();

    assert_eq!(uplink.readings, vec![50.0]);
    assert_eq!(uplink.batteries, vec![77.5]);
}

#[test]
fn hysteresis_breach_reports_and_moves_the_reference() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(dir.path().join("state.json"));
    store.save(&reported_state(50.0, 950)).unwrap();

    let orch = orchestrator(ReportPolicy::Interval, 1);
    let mut rig = Rig::new(1_000, ScriptedSensor::steady(53.0));

    rig.run(&orch, &store, WakeReason::Timer, &WallClock::unsynced());

    assert_eq!(rig.uplink.readings, vec![53.0]);
    let reloaded = store.load(&defaults());
    assert_eq!(reloaded.last_reported_distance, 53.0);
    assert_eq!(reloaded.past_readings.as_slice(), &[50.0]);
}

#[test]
fn failed_report_keeps_the_reference_for_the_next_wake() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(dir.path().join("state.json"));
    store.save(&reported_state(50.0, 950)).unwrap();

    let orch = orchestrator(ReportPolicy::Interval, 1);
    let mut rig = Rig::new(1_000, ScriptedSensor::steady(53.0));
    rig.uplink = RecordingUplink::refusing();

    rig.run(&orch, &store, WakeReason::Timer, &WallClock::unsynced());

    assert_eq!(rig.uplink.readings, vec![53.0]);
    let reloaded = store.load(&defaults());
    // Unchanged reference: the same breach re-triggers next wake.
    assert_eq!(reloaded.last_reported_distance, 50.0);
    assert_eq!(reloaded.last_report_time, 950);
}

#[test]
fn corrupt_state_file_runs_as_cold_start() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(dir.path().join("state.json"));
    std::fs::write(store.path(), "### not json ###").unwrap();

    let orch = orchestrator(ReportPolicy::Interval, 1);
    let mut rig = Rig::new(60, ScriptedSensor::steady(80.0));

    rig.run(&orch, &store, WakeReason::Startup, &WallClock::unsynced());

    let reloaded = store.load(&defaults());
    assert_eq!(reloaded.hysteresis, 2.0);
    assert_eq!(reloaded.last_distance, 80.0);
}

#[test]
fn dead_sensor_falls_back_to_last_known_distance() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(dir.path().join("state.json"));
    store.save(&reported_state(50.0, 950)).unwrap();

    let orch = orchestrator(ReportPolicy::Interval, 1);
    let mut rig = Rig::new(1_000, ScriptedSensor::dead());

    rig.run(&orch, &store, WakeReason::Timer, &WallClock::unsynced());

    // Fallback equals the reference, so nothing reports; the failure is
    // forwarded to the diagnostic feed since the link was up.
    assert!(rig.uplink.readings.is_empty());
    assert_eq!(rig.uplink.notes, vec!["no distance readings obtained"]);

    let reloaded = store.load(&defaults());
    assert_eq!(reloaded.last_distance, 50.0);
}

#[test]
fn forced_report_from_the_window_is_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(dir.path().join("state.json"));
    let orch = orchestrator(ReportPolicy::Interval, 2);

    let clock = SimClock::starting_at_secs(60);
    let mut rig = Rig {
        buttons: TimedPress::window(clock.clone(), 2, 61_500, 61_600),
        clock: clock.clone(),
        sensor: ScriptedSensor::steady(90.0),
        display: RecordingDisplay::default(),
        uplink: RecordingUplink::accepting(),
    };

    rig.run(&orch, &store, WakeReason::Startup, &WallClock::unsynced());

    assert_eq!(rig.uplink.readings, vec![90.0]);
    let reloaded = store.load(&defaults());
    assert!(reloaded.last_report_time >= 61);
    assert_eq!(reloaded.last_reported_distance, 90.0);
}

#[test]
fn fixed_clock_reports_at_checkpoint_and_sleeps_to_the_next() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(dir.path().join("state.json"));
    store.save(&reported_state(50.0, 0)).unwrap();

    let orch = orchestrator(ReportPolicy::FixedClock, 1);
    let mut rig = Rig::new(0, ScriptedSensor::steady(50.0));

    // Wall clock synced to 10:00 right as the cycle starts.
    let mut wall = WallClock::unsynced();
    wall.sync(10 * 60, 0);

    let plan = rig.run(&orch, &store, WakeReason::Timer, &wall);

    assert_eq!(rig.uplink.readings, vec![50.0]);
    // Next stop: the 18:00 checkpoint, eight hours out.
    assert_eq!(plan.sleep_secs, 8 * 3_600);
}

#[test]
fn guard_paints_the_fault_screen_and_asks_for_a_restart() {
    use tankgauge_core::cycle::{run_guarded, CycleOutcome};
    use tankgauge_core::errors::{CycleError, SensorError};

    let mut display = RecordingDisplay::default();
    let outcome = run_guarded(&mut display, || {
        Err(CycleError::Probe(SensorError::NoDevice))
    });

    assert!(matches!(outcome, CycleOutcome::Restart { delay_secs: 10 }));
    let faults = display.faults.borrow();
    assert_eq!(faults.len(), 1);
    assert_eq!(faults[0].0, "ERROR");
    assert!(faults[0].1.contains("no supported distance sensor"));
}

#[test]
fn fixed_clock_without_sync_takes_the_long_fallback_sleep() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(dir.path().join("state.json"));
    store.save(&reported_state(50.0, 950)).unwrap();

    let orch = orchestrator(ReportPolicy::FixedClock, 1);
    let mut rig = Rig::new(1_000, ScriptedSensor::steady(50.0));

    let plan = rig.run(&orch, &store, WakeReason::Timer, &WallClock::unsynced());

    assert!(rig.uplink.readings.is_empty());
    assert_eq!(plan.sleep_secs, 12 * 3_600);
}
