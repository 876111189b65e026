//! Serial transport to the fingerprint device.
//!
//! Line-oriented protocol: one command token out, one newline-terminated
//! reply back. Control commands answer with a bare token (`OK`,
//! `ENROLLMENT_STARTED`, `OPERATION_CANCELLED`); queries answer with a
//! JSON document.
//!
//! The serialport crate is blocking, so every exchange runs inside
//! `block_in_place` to keep the runtime worker threads free.

use std::io::{Read, Write};
use std::time::Duration;

use async_trait::async_trait;
use serialport::{SerialPort, SerialPortType};
use tokio::task::block_in_place;
use tracing::{debug, info, warn};

use super::wire::{EnrollmentStatusReply, HealthWireReply, VerifyWireReply};
use crate::config::SensorConfig;
use crate::domain::{EnrollmentPoll, SensorHealth, VerifyReply};
use crate::port::SensorLink;

/// Fallback when no port is configured and discovery finds nothing.
const DEFAULT_PORT: &str = "COM3";

/// USB description fragments that identify the device's bridge chip.
const KNOWN_DESCRIPTIONS: &[&str] = &["cp210", "uart", "usb-serial", "usb serial"];

/// Delay after opening the port, giving the microcontroller time to
/// finish its reset before the first command.
const RESET_SETTLE: Duration = Duration::from_secs(2);

pub struct SerialSensor {
    configured_port: Option<String>,
    baud_rate: u32,
    read_timeout: Duration,
    verify_timeout: Duration,
    port: Option<Box<dyn SerialPort>>,
    initialized: bool,
}

impl SerialSensor {
    #[must_use]
    pub fn new(config: &SensorConfig) -> Self {
        Self {
            configured_port: config.port.clone(),
            baud_rate: config.baud_rate,
            read_timeout: config.read_timeout(),
            verify_timeout: config.verify_timeout(),
            port: None,
            initialized: false,
        }
    }

    fn description_matches(text: &str) -> bool {
        let lowered = text.to_ascii_lowercase();
        KNOWN_DESCRIPTIONS.iter().any(|d| lowered.contains(d))
    }

    /// Pick a port: configured path first, then a USB probe for a known
    /// bridge chip, then the platform default.
    fn resolve_port(&self) -> String {
        if let Some(path) = &self.configured_port {
            return path.clone();
        }

        match serialport::available_ports() {
            Ok(ports) => {
                for info in ports {
                    if let SerialPortType::UsbPort(usb) = &info.port_type {
                        let product = usb.product.as_deref().unwrap_or("");
                        let manufacturer = usb.manufacturer.as_deref().unwrap_or("");
                        if Self::description_matches(product)
                            || Self::description_matches(manufacturer)
                        {
                            debug!(port = %info.port_name, "discovered sensor port");
                            return info.port_name;
                        }
                    }
                }
            }
            Err(e) => warn!(error = %e, "serial port enumeration failed"),
        }

        DEFAULT_PORT.to_string()
    }

    fn open(&mut self) -> bool {
        let path = self.resolve_port();
        match serialport::new(&path, self.baud_rate)
            .timeout(self.read_timeout)
            .open()
        {
            Ok(port) => {
                info!(port = %path, baud = self.baud_rate, "serial port opened");
                self.port = Some(port);
                std::thread::sleep(RESET_SETTLE);
                true
            }
            Err(e) => {
                warn!(port = %path, error = %e, "failed to open serial port");
                false
            }
        }
    }

    /// Send one command and read one newline-terminated reply. Any I/O
    /// failure drops the connection.
    fn exchange(&mut self, command: &str, timeout: Duration) -> std::io::Result<String> {
        let port = self.port.as_mut().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotConnected, "serial port not open")
        })?;

        if let Err(e) = port.set_timeout(timeout) {
            self.drop_connection();
            return Err(std::io::Error::other(e.to_string()));
        }

        let result = (|| {
            port.write_all(command.as_bytes())?;
            port.write_all(b"\n")?;
            port.flush()?;

            let mut line = Vec::new();
            let mut byte = [0u8; 1];
            loop {
                let n = port.read(&mut byte)?;
                if n == 0 || byte[0] == b'\n' {
                    break;
                }
                if byte[0] != b'\r' {
                    line.push(byte[0]);
                }
            }
            Ok(String::from_utf8_lossy(&line).into_owned())
        })();

        match result {
            Ok(reply) => {
                debug!(command, reply = %reply, "serial exchange");
                Ok(reply)
            }
            Err(e) => {
                warn!(command, error = %e, "serial exchange failed");
                self.drop_connection();
                Err(e)
            }
        }
    }

    fn drop_connection(&mut self) {
        self.port = None;
        self.initialized = false;
    }

    fn blocking_initialize(&mut self) -> bool {
        if self.port.is_none() && !self.open() {
            return false;
        }
        match self.exchange("INIT", self.read_timeout) {
            Ok(reply) if reply == "OK" => {
                self.initialized = true;
                true
            }
            Ok(reply) => {
                warn!(reply = %reply, "unexpected reply to INIT");
                false
            }
            Err(_) => false,
        }
    }
}

#[async_trait]
impl SensorLink for SerialSensor {
    async fn initialize(&mut self) -> bool {
        block_in_place(|| self.blocking_initialize())
    }

    fn is_connected(&self) -> bool {
        self.port.is_some() && self.initialized
    }

    async fn reconnect(&mut self) -> bool {
        block_in_place(|| {
            self.drop_connection();
            self.blocking_initialize()
        })
    }

    async fn start_enrollment(&mut self) -> bool {
        block_in_place(|| {
            matches!(
                self.exchange("START_ENROLLMENT", self.read_timeout).as_deref(),
                Ok("ENROLLMENT_STARTED")
            )
        })
    }

    async fn poll_enrollment(&mut self) -> EnrollmentPoll {
        block_in_place(|| {
            match self.exchange("GET_ENROLLMENT_STATUS", self.read_timeout) {
                Ok(reply) => match serde_json::from_str::<EnrollmentStatusReply>(&reply) {
                    Ok(status) => status.into_poll(),
                    Err(e) => {
                        EnrollmentPoll::transport_error(format!("malformed status reply: {e}"))
                    }
                },
                Err(e) => EnrollmentPoll::transport_error(e.to_string()),
            }
        })
    }

    async fn verify(&mut self) -> VerifyReply {
        block_in_place(|| {
            // Verify waits on a live finger placement, so it gets the long
            // timeout.
            match self.exchange("VERIFY_FINGERPRINT", self.verify_timeout) {
                Ok(reply) => match serde_json::from_str::<VerifyWireReply>(&reply) {
                    Ok(wire) => wire.into_reply(),
                    Err(e) => VerifyReply::Error {
                        message: format!("malformed verify reply: {e}"),
                    },
                },
                Err(e) => VerifyReply::Error {
                    message: e.to_string(),
                },
            }
        })
    }

    async fn cancel(&mut self) -> bool {
        if self.port.is_none() {
            // Nothing to abort on a disconnected device.
            return true;
        }
        block_in_place(|| {
            matches!(
                self.exchange("CANCEL_OPERATION", self.read_timeout).as_deref(),
                Ok("OPERATION_CANCELLED")
            )
        })
    }

    async fn status(&mut self) -> SensorHealth {
        if self.port.is_none() {
            return SensorHealth::error("device not connected");
        }
        block_in_place(|| match self.exchange("GET_STATUS", self.read_timeout) {
            Ok(reply) => match serde_json::from_str::<HealthWireReply>(&reply) {
                Ok(wire) => wire.into_health(),
                Err(e) => SensorHealth::error(format!("malformed status reply: {e}")),
            },
            Err(e) => SensorHealth::error(e.to_string()),
        })
    }

    async fn close(&mut self) {
        if self.port.is_some() {
            info!("closing serial port");
        }
        self.drop_connection();
    }

    fn transport_name(&self) -> &'static str {
        "serial"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_known_bridge_chips() {
        assert!(SerialSensor::description_matches("CP210x UART Bridge"));
        assert!(SerialSensor::description_matches("FTDI USB-Serial Converter"));
        assert!(SerialSensor::description_matches("Generic USB Serial"));
        assert!(!SerialSensor::description_matches("Bluetooth Modem"));
    }

    #[test]
    fn configured_port_wins_over_discovery() {
        let sensor = SerialSensor::new(&SensorConfig {
            port: Some("/dev/ttyUSB7".into()),
            ..SensorConfig::default()
        });
        assert_eq!(sensor.resolve_port(), "/dev/ttyUSB7");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn cancel_on_disconnected_device_is_noop_success() {
        let mut sensor = SerialSensor::new(&SensorConfig::default());
        assert!(!sensor.is_connected());
        assert!(sensor.cancel().await);
    }
}
