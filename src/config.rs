//! Runtime configuration for the sample loop and serial transport.

use crate::error::{Result, TelemetryError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the telemetry loop.
///
/// Fixed for the lifetime of the process; the loop never renegotiates any of
/// these at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Serial port the display is attached to (e.g. "/dev/ttyUSB0", "COM3")
    pub serial_port: String,
    /// Serial baud rate
    pub baud_rate: u32,
    /// Normal tick period in milliseconds
    pub interval_ms: u64,
    /// Wait after a transport failure before the next attempt, in milliseconds
    pub backoff_ms: u64,
    /// Full-speed RPM of the CPU fan, used to scale the fan percentage.
    /// Depends on the physically installed fan, so it is configuration.
    pub cpu_fan_max_rpm: u32,
    /// Full-speed RPM of the GPU fan
    pub gpu_fan_max_rpm: u32,
    /// The three volumes reported in the DISKC/DISKD/DISKE slots,
    /// identified by mount point or drive letter
    pub volumes: [String; 3],
}

impl Default for Config {
    fn default() -> Self {
        Self {
            serial_port: "/dev/ttyUSB0".to_string(),
            baud_rate: 115_200,
            interval_ms: crate::DEFAULT_INTERVAL_MS,
            backoff_ms: crate::FAILURE_BACKOFF_MS,
            cpu_fan_max_rpm: 2250,
            gpu_fan_max_rpm: 3500,
            volumes: ["/".to_string(), "/home".to_string(), "/data".to_string()],
        }
    }
}

impl Config {
    /// Create a new configuration for the given serial endpoint.
    pub fn new(serial_port: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            serial_port: serial_port.into(),
            baud_rate,
            ..Default::default()
        }
    }

    /// Load a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Config = serde_json::from_str(&raw)
            .map_err(|e| TelemetryError::config_error(format!("invalid config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Set the serial port.
    pub fn with_serial_port(mut self, port: impl Into<String>) -> Self {
        self.serial_port = port.into();
        self
    }

    /// Set the baud rate.
    pub fn with_baud_rate(mut self, baud: u32) -> Self {
        self.baud_rate = baud;
        self
    }

    /// Set the tick period in milliseconds.
    pub fn with_interval_ms(mut self, interval_ms: u64) -> Self {
        self.interval_ms = interval_ms;
        self
    }

    /// Set the failure backoff in milliseconds.
    pub fn with_backoff_ms(mut self, backoff_ms: u64) -> Self {
        self.backoff_ms = backoff_ms;
        self
    }

    /// Set the CPU fan full-speed RPM calibration.
    pub fn with_cpu_fan_max_rpm(mut self, rpm: u32) -> Self {
        self.cpu_fan_max_rpm = rpm;
        self
    }

    /// Set the GPU fan full-speed RPM calibration.
    pub fn with_gpu_fan_max_rpm(mut self, rpm: u32) -> Self {
        self.gpu_fan_max_rpm = rpm;
        self
    }

    /// Set the three reported volumes.
    pub fn with_volumes(mut self, volumes: [String; 3]) -> Self {
        self.volumes = volumes;
        self
    }

    /// Check invariants that would otherwise only surface mid-loop.
    pub fn validate(&self) -> Result<()> {
        if self.serial_port.is_empty() {
            return Err(TelemetryError::config_error("serial_port must not be empty"));
        }
        if self.interval_ms == 0 {
            return Err(TelemetryError::config_error("interval_ms must be non-zero"));
        }
        if self.backoff_ms == 0 {
            return Err(TelemetryError::config_error("backoff_ms must be non-zero"));
        }
        if self.cpu_fan_max_rpm == 0 || self.gpu_fan_max_rpm == 0 {
            return Err(TelemetryError::config_error(
                "fan max RPM calibration must be non-zero",
            ));
        }
        Ok(())
    }
}
