//! Boot-time storage guard
//!
//! Storage can only have one writer: either the MCU persists state, or a
//! connected PC edits configuration. Holding a button through early boot
//! keeps the medium read-only to the MCU so the PC side stays writable.
//! A decision here is why a read-only store later in the cycle must stay a
//! non-fatal condition.

use crate::buttons::ButtonPad;
use crate::constants::{BOOT_GUARD_HOLD_SECS, BOOT_GUARD_SETTLE_MS};
use crate::time::Delay;

/// Who gets write access to the storage medium this boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    /// MCU keeps storage read-only; state is not persisted
    ReadOnly,
    /// MCU may persist state
    Writable,
}

/// Sample the guard buttons and decide the storage mode.
///
/// `pins` are the buttons that arm the guard (the wake-capable ones).
/// A press must be held through the full countdown; releasing early
/// falls back to [`StorageMode::Writable`].
pub fn decide_storage_mode<B, D>(pad: &mut B, pins: &[u8], delay: &mut D) -> StorageMode
where
    B: ButtonPad,
    D: Delay,
{
    // Allow time for the user to get a finger on the button.
    delay.pause_ms(BOOT_GUARD_SETTLE_MS);

    if !any_pressed(pad, pins) {
        log::info!("no guard button pressed, storage writable to MCU");
        return StorageMode::Writable;
    }

    log::info!(
        "guard button detected, hold {}s to keep storage read-only",
        BOOT_GUARD_HOLD_SECS
    );
    for remaining in (1..=BOOT_GUARD_HOLD_SECS).rev() {
        log::info!("keeping read-only in {}s...", remaining);
        delay.pause_ms(1_000);
        if !any_pressed(pad, pins) {
            log::info!("guard button released, storage writable to MCU");
            return StorageMode::Writable;
        }
    }

    log::info!("guard held, storage stays read-only to MCU");
    StorageMode::ReadOnly
}

fn any_pressed<B: ButtonPad>(pad: &mut B, pins: &[u8]) -> bool {
    pins.iter().any(|&pin| pad.is_pressed(pin))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::NoopDelay;
    use core::cell::Cell;
    use std::rc::Rc;

    /// Shared millisecond clock: the delay advances it, the pad reads it.
    #[derive(Clone)]
    struct MsClock(Rc<Cell<u64>>);

    struct HeldUntil {
        clock: MsClock,
        until_ms: u64,
    }

    impl ButtonPad for HeldUntil {
        fn is_pressed(&mut self, _pin: u8) -> bool {
            self.clock.0.get() < self.until_ms
        }

        fn release(&mut self) {}
    }

    struct AdvancingDelay(MsClock);

    impl Delay for AdvancingDelay {
        fn pause_ms(&mut self, ms: u32) {
            self.0 .0.set(self.0 .0.get() + u64::from(ms));
        }
    }

    fn rig(until_ms: u64) -> (HeldUntil, AdvancingDelay) {
        let clock = MsClock(Rc::new(Cell::new(0)));
        (
            HeldUntil {
                clock: clock.clone(),
                until_ms,
            },
            AdvancingDelay(clock),
        )
    }

    #[test]
    fn no_press_is_writable() {
        let (mut pad, _) = rig(0);
        let mode = decide_storage_mode(&mut pad, &[1, 2], &mut NoopDelay);
        assert_eq!(mode, StorageMode::Writable);
    }

    #[test]
    fn full_hold_keeps_read_only() {
        // Held well past settle + countdown.
        let (mut pad, mut delay) = rig(10_000);
        let mode = decide_storage_mode(&mut pad, &[1, 2], &mut delay);
        assert_eq!(mode, StorageMode::ReadOnly);
    }

    #[test]
    fn early_release_is_writable() {
        // Pressed at settle, released during the countdown.
        let (mut pad, mut delay) = rig(2_000);
        let mode = decide_storage_mode(&mut pad, &[1, 2], &mut delay);
        assert_eq!(mode, StorageMode::Writable);
    }
}
