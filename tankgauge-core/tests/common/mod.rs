//! Shared fakes for cycle-level tests
//!
//! Everything the orchestrator touches through a capability trait has a
//! scripted or recording stand-in here. Time is a shared millisecond cell:
//! every pause the cycle takes advances it, so deadline math runs at full
//! speed with no real sleeping.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tankgauge_core::buttons::ButtonPad;
use tankgauge_core::display::DisplaySink;
use tankgauge_core::errors::SensorError;
use tankgauge_core::sensor::{BatteryGauge, RangeSensor};
use tankgauge_core::state::ReadingHistory;
use tankgauge_core::time::{Delay, TimeSource, Timestamp};
use tankgauge_core::uplink::Uplink;

/// Shared millisecond clock.
#[derive(Clone)]
pub struct SimClock(Rc<Cell<u64>>);

impl SimClock {
    pub fn starting_at_secs(secs: u64) -> Self {
        SimClock(Rc::new(Cell::new(secs * 1_000)))
    }

    pub fn ms(&self) -> u64 {
        self.0.get()
    }
}

impl TimeSource for SimClock {
    fn now(&self) -> Timestamp {
        self.0.get() / 1_000
    }
}

/// Delay that advances the shared clock instead of sleeping.
pub struct SimDelay(pub SimClock);

impl Delay for SimDelay {
    fn pause_ms(&mut self, ms: u32) {
        self.0 .0.set(self.0 .0.get() + u64::from(ms));
    }
}

/// Replays a fixed list of sample outcomes, cycling when exhausted.
pub struct ScriptedSensor {
    samples: Vec<Result<f32, SensorError>>,
    next: Cell<usize>,
}

impl ScriptedSensor {
    pub fn steady(cm: f32) -> Self {
        Self::new(vec![Ok(cm)])
    }

    pub fn dead() -> Self {
        Self::new(vec![Err(SensorError::Bus)])
    }

    pub fn new(samples: Vec<Result<f32, SensorError>>) -> Self {
        Self {
            samples,
            next: Cell::new(0),
        }
    }
}

impl RangeSensor for ScriptedSensor {
    fn sample(&mut self) -> Result<f32, SensorError> {
        let i = self.next.get();
        self.next.set(i + 1);
        self.samples[i % self.samples.len()]
    }

    fn out_of_range_cm(&self) -> f32 {
        400.0
    }
}

/// Button pad that presses one pin while the clock is inside a window.
pub struct TimedPress {
    pub clock: SimClock,
    pub pin: u8,
    pub from_ms: u64,
    pub until_ms: u64,
    pub released: Cell<bool>,
}

impl TimedPress {
    pub fn never(clock: SimClock) -> Self {
        Self {
            clock,
            pin: u8::MAX,
            from_ms: 0,
            until_ms: 0,
            released: Cell::new(false),
        }
    }

    pub fn window(clock: SimClock, pin: u8, from_ms: u64, until_ms: u64) -> Self {
        Self {
            clock,
            pin,
            from_ms,
            until_ms,
            released: Cell::new(false),
        }
    }
}

impl ButtonPad for TimedPress {
    fn is_pressed(&mut self, pin: u8) -> bool {
        pin == self.pin && self.clock.ms() >= self.from_ms && self.clock.ms() < self.until_ms
    }

    fn release(&mut self) {
        self.released.set(true);
    }
}

/// Records every field update the cycle pushes at the screen.
#[derive(Default)]
pub struct RecordingDisplay {
    pub layouts: Vec<(f32, Vec<f32>, f32)>,
    pub countdowns: Cell<u32>,
    pub hysteresis_updates: RefCell<Vec<f32>>,
    pub faults: RefCell<Vec<(String, String)>>,
    pub blanked: Cell<bool>,
}

impl DisplaySink for RecordingDisplay {
    fn show_layout(&mut self, current_cm: f32, history: &ReadingHistory, hysteresis_cm: f32) {
        self.layouts
            .push((current_cm, history.as_slice().to_vec(), hysteresis_cm));
    }

    fn update_current(&mut self, _cm: f32) {}

    fn update_history(&mut self, _history: &ReadingHistory) {}

    fn update_hysteresis(&mut self, cm: f32) {
        self.hysteresis_updates.borrow_mut().push(cm);
    }

    fn update_countdown(&mut self, _seconds_remaining: u64) {
        self.countdowns.set(self.countdowns.get() + 1);
    }

    fn show_fault(&mut self, headline: &str, detail: &str) {
        self.faults
            .borrow_mut()
            .push((headline.to_string(), detail.to_string()));
    }

    fn blank(&mut self) {
        self.blanked.set(true);
    }
}

/// Records posts; configurable acceptance and link state.
pub struct RecordingUplink {
    pub readings: Vec<f32>,
    pub batteries: Vec<f32>,
    pub notes: Vec<String>,
    pub accept: bool,
    pub up: bool,
    pub powered_down: bool,
}

impl RecordingUplink {
    pub fn accepting() -> Self {
        Self {
            readings: Vec::new(),
            batteries: Vec::new(),
            notes: Vec::new(),
            accept: true,
            up: true,
            powered_down: false,
        }
    }

    pub fn refusing() -> Self {
        Self {
            accept: false,
            up: false,
            ..Self::accepting()
        }
    }
}

impl Uplink for RecordingUplink {
    fn send_reading(&mut self, cm: f32) -> bool {
        self.readings.push(cm);
        self.accept
    }

    fn send_battery(&mut self, percent: f32) -> bool {
        self.batteries.push(percent);
        self.accept
    }

    fn send_note(&mut self, note: &str) {
        self.notes.push(note.to_string());
    }

    fn online(&self) -> bool {
        self.up
    }

    fn power_down(&mut self) {
        self.powered_down = true;
    }
}

/// Battery gauge pinned at one level.
pub struct FixedBattery(pub f32);

impl BatteryGauge for FixedBattery {
    fn read_percent(&mut self) -> Option<f32> {
        Some(self.0)
    }
}
