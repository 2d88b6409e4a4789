//! Temperature sensor interface.
//!
//! Hardware access lives behind [`TemperatureSensor`] so the sampling
//! subsystem compiles and tests on hosts without a device attached.
//! Concrete drivers are feature-gated.

#[cfg(feature = "sensor-sht40")]
mod sht40;

#[cfg(feature = "sensor-sht40")]
pub use sht40::Sht40TemperatureSensor;

use thiserror_no_std::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The device did not come up at initialization.
    #[error("sensor device is not ready")]
    NotReady,
    /// Triggering a measurement failed.
    #[error("sample fetch request failed")]
    FetchFailed,
    /// The measurement could not be read back.
    #[error("sample readout failed")]
    ReadFailed,
}

/// A raw reading split into whole degrees and microdegrees, the shape
/// sensor stacks commonly report before fixed-point conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorReading {
    pub whole: i32,
    pub micros: i32,
}

/// A temperature source the sampling cycle can poll.
pub trait TemperatureSensor {
    /// Whether the underlying device answered its probe. Checked once at
    /// subsystem initialization; a sensor that is not ready is fatal.
    fn is_ready(&self) -> bool;

    /// Takes one measurement.
    fn read(&mut self) -> impl Future<Output = Result<SensorReading, SensorError>>;
}
