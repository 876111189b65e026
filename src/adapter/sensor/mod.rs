//! Sensor transport adapters.

pub mod http;
pub mod serial;
pub mod wire;

pub use http::HttpSensor;
pub use serial::SerialSensor;

use crate::config::{SensorConfig, SensorTransport};
use crate::error::Result;
use crate::port::SensorLink;

/// Build the sensor adapter named by the configuration.
pub fn build_sensor(config: &SensorConfig) -> Result<Box<dyn SensorLink>> {
    Ok(match config.transport {
        SensorTransport::Serial => Box::new(SerialSensor::new(config)),
        SensorTransport::Http => Box::new(HttpSensor::new(config)?),
    })
}
