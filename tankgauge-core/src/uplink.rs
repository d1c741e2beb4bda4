//! Uplink and radio capabilities
//!
//! The cloud side of the monitor is a capability pair: [`Radio`] owns
//! bringing the network link up and down (power-hungry, so it stays down
//! except around a report), and [`Uplink`] posts values to named feeds.
//! Transport failures never propagate as errors — a failed report is a
//! `false`, the next scheduled or hysteresis-triggered wake retries
//! naturally.

/// Network link control.
pub trait Radio {
    /// Bring the link up; `false` if association or DHCP failed
    fn bring_up(&mut self) -> bool;

    /// Power the link down
    fn shut_down(&mut self);

    /// Whether the link is currently up
    fn is_up(&self) -> bool;
}

/// Radio for hosts with a standing network link (simulations, gateways).
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysOnline;

impl Radio for AlwaysOnline {
    fn bring_up(&mut self) -> bool {
        true
    }

    fn shut_down(&mut self) {}

    fn is_up(&self) -> bool {
        true
    }
}

/// Cloud reporting capability.
pub trait Uplink {
    /// Post the distance reading to the primary feed; `true` on success
    fn send_reading(&mut self, cm: f32) -> bool;

    /// Post a battery level to the battery feed; `true` on success
    fn send_battery(&mut self, percent: f32) -> bool;

    /// Best-effort diagnostic to the error feed; failures are swallowed
    fn send_note(&mut self, note: &str);

    /// Whether connectivity currently exists
    fn online(&self) -> bool;

    /// Drop connectivity to save power; next send starts from cold
    fn power_down(&mut self);
}

/// Uplink for boards that never report; every send fails quietly.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineUplink;

impl Uplink for OfflineUplink {
    fn send_reading(&mut self, _cm: f32) -> bool {
        false
    }

    fn send_battery(&mut self, _percent: f32) -> bool {
        false
    }

    fn send_note(&mut self, _note: &str) {}

    fn online(&self) -> bool {
        false
    }

    fn power_down(&mut self) {}
}
