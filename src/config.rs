//! Build-time configuration for the sampling subsystem.

use embassy_time::Duration;

/// Capacity of each temperature list (RAM, scratch, and the persisted
/// record all share this shape). Must be at least 2 so a decimated
/// timeline still has two endpoints to interpolate between.
pub const LOG_CAPACITY: usize = 100;

/// Delay between sampling cycles.
pub const SAMPLING_PERIOD: Duration = Duration::from_secs(30);
