use embedded_hal_async::i2c::I2c;
use sht4x::Sht4xAsync;

use super::{SensorError, SensorReading, TemperatureSensor};

/// SHT40 temperature source over async I2C.
pub struct Sht40TemperatureSensor<I> {
    sensor: Sht4xAsync<I, embassy_time::Delay>,
}

impl<I: I2c> Sht40TemperatureSensor<I> {
    pub fn new(i2c: I) -> Self {
        Self {
            sensor: Sht4xAsync::<I, embassy_time::Delay>::new(i2c),
        }
    }
}

impl<I: I2c> TemperatureSensor for Sht40TemperatureSensor<I> {
    fn is_ready(&self) -> bool {
        true
    }

    async fn read(&mut self) -> Result<SensorReading, SensorError> {
        let measurement = self
            .sensor
            .measure(sht4x::Precision::High, &mut embassy_time::Delay)
            .await
            .map_err(|e| {
                log::error!("SHT40 measurement failed: {:?}", e);
                SensorError::ReadFailed
            })?;

        let celsius = measurement.temperature_celsius().to_num::<f32>();
        let whole = celsius as i32;
        let micros = ((celsius - whole as f32) * 1_000_000.0) as i32;

        Ok(SensorReading { whole, micros })
    }
}
