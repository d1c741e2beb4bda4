//! Display sink
//!
//! Rendering belongs to the host; the core only pushes text-field updates.
//! The sink mirrors the on-screen layout: one full layout pass per wake,
//! then targeted updates as single fields change, so a tick that only moves
//! the countdown never repaints the whole panel.

use crate::state::ReadingHistory;

/// Incremental text-field sink for whatever screen the board carries.
pub trait DisplaySink {
    /// Draw the full layout once at the start of an interactive wake
    fn show_layout(&mut self, current_cm: f32, history: &ReadingHistory, hysteresis_cm: f32);

    /// Update only the current-distance field
    fn update_current(&mut self, cm: f32);

    /// Update only the past-readings fields
    fn update_history(&mut self, history: &ReadingHistory);

    /// Update only the hysteresis field
    fn update_hysteresis(&mut self, cm: f32);

    /// Update only the sleep countdown field
    fn update_countdown(&mut self, seconds_remaining: u64);

    /// Replace everything with a two-line fault screen
    fn show_fault(&mut self, headline: &str, detail: &str);

    /// Blank and power down before sleep
    fn blank(&mut self);
}

/// Sink for headless boards; every update is a no-op.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDisplay;

impl DisplaySink for NullDisplay {
    fn show_layout(&mut self, _current_cm: f32, _history: &ReadingHistory, _hysteresis_cm: f32) {}
    fn update_current(&mut self, _cm: f32) {}
    fn update_history(&mut self, _history: &ReadingHistory) {}
    fn update_hysteresis(&mut self, _cm: f32) {}
    fn update_countdown(&mut self, _seconds_remaining: u64) {}
    fn show_fault(&mut self, _headline: &str, _detail: &str) {}
    fn blank(&mut self) {}
}
