//! Value types flowing through the tick pipeline.

use serde::{Deserialize, Serialize};

/// One tick's aggregated raw metric values.
///
/// Built fresh every tick and never mutated afterwards; there is no
/// cross-tick memory. Every field defaults to 0 when the corresponding
/// sensor was absent for the whole tick - absence is a valid zero reading,
/// not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// CPU package temperature in degrees Celsius
    pub cpu_temp: f32,
    /// CPU package power draw in watts
    pub cpu_power: f32,
    /// Highest per-core clock observed this tick, in MHz
    pub cpu_clock_mhz: f32,
    /// Total CPU load in percent
    pub cpu_usage: f32,
    /// CPU fan speed in RPM, read from the motherboard controller
    pub cpu_fan_rpm: f32,
    /// GPU core temperature in degrees Celsius
    pub gpu_temp: f32,
    /// GPU package power draw in watts
    pub gpu_power: f32,
    /// GPU core clock in MHz
    pub gpu_clock_mhz: f32,
    /// GPU core load in percent
    pub gpu_usage: f32,
    /// GPU fan speed in RPM
    pub gpu_fan_rpm: f32,
    /// Used RAM in percent of total
    pub ram_used_percent: f32,
    /// Highest download throughput across adapters, in bytes per second
    pub wifi_down_bps: f32,
    /// Highest upload throughput across adapters, in bytes per second
    pub wifi_up_bps: f32,
    /// Free space of the three configured volumes, in GiB
    pub disk_free_gb: [f32; 3],
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            cpu_temp: 0.0,
            cpu_power: 0.0,
            cpu_clock_mhz: 0.0,
            cpu_usage: 0.0,
            cpu_fan_rpm: 0.0,
            gpu_temp: 0.0,
            gpu_power: 0.0,
            gpu_clock_mhz: 0.0,
            gpu_usage: 0.0,
            gpu_fan_rpm: 0.0,
            ram_used_percent: 0.0,
            wifi_down_bps: 0.0,
            wifi_up_bps: 0.0,
            disk_free_gb: [0.0; 3],
        }
    }
}

/// A [`Snapshot`] after unit conversion and clamping, ready to encode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayFrame {
    /// CPU temperature in degrees Celsius
    pub cpu_temp: f32,
    /// GPU temperature in degrees Celsius
    pub gpu_temp: f32,
    /// Used RAM in percent
    pub ram_used_percent: f32,
    /// CPU package power in watts
    pub cpu_power: f32,
    /// Highest per-core CPU clock in MHz
    pub cpu_clock_mhz: f32,
    /// CPU load in percent
    pub cpu_usage: f32,
    /// CPU fan speed as a percentage of its configured maximum
    pub cpu_fan_percent: u8,
    /// GPU package power in watts
    pub gpu_power: f32,
    /// GPU clock in MHz
    pub gpu_clock_mhz: f32,
    /// GPU load in percent
    pub gpu_usage: f32,
    /// GPU fan speed as a percentage of its configured maximum
    pub gpu_fan_percent: u8,
    /// Seconds since the sample loop started
    pub uptime_secs: u64,
    /// Free space of the three configured volumes, in GiB
    pub disk_free_gb: [f32; 3],
    /// Download throughput in Mbps
    pub wifi_down_mbps: f32,
    /// Upload throughput in Mbps
    pub wifi_up_mbps: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_snapshot_is_all_zero() {
        let snapshot = Snapshot::default();
        assert_eq!(snapshot.cpu_temp, 0.0);
        assert_eq!(snapshot.gpu_fan_rpm, 0.0);
        assert_eq!(snapshot.ram_used_percent, 0.0);
        assert_eq!(snapshot.wifi_down_bps, 0.0);
        assert_eq!(snapshot.disk_free_gb, [0.0; 3]);
    }

    #[test]
    fn test_snapshot_serializes() {
        let snapshot = Snapshot {
            cpu_temp: 55.3,
            ..Default::default()
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, snapshot);
    }
}
