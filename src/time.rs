//! Uptime bookkeeping for sample timestamps.
//!
//! Timestamps are whole minutes since boot. Minute resolution is a design
//! choice: the history spans days, so finer resolution would only burn
//! flash endurance without changing what the trend view can show.

use embassy_time::Instant;

/// Whole minutes since boot.
pub type Minutes = u32;

/// Monotonic uptime source used to stamp samples and drive interpolation.
pub trait UptimeClock {
    /// Current uptime, rounded down to whole minutes. Non-decreasing.
    fn uptime_minutes(&self) -> Minutes;
}

/// Uptime from the embassy monotonic timer.
pub struct SystemClock;

impl UptimeClock for SystemClock {
    fn uptime_minutes(&self) -> Minutes {
        (Instant::now().as_secs() / 60) as Minutes
    }
}
