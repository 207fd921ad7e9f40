//! Conversion of raw snapshot values into display-ready units.

use crate::config::Config;
use crate::metrics::snapshot::{DisplayFrame, Snapshot};

/// Full-speed RPM of the two reported fans. These depend on the physically
/// installed fans, so they come from configuration rather than constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanCalibration {
    pub cpu_max_rpm: u32,
    pub gpu_max_rpm: u32,
}

impl From<&Config> for FanCalibration {
    fn from(config: &Config) -> Self {
        Self {
            cpu_max_rpm: config.cpu_fan_max_rpm,
            gpu_max_rpm: config.gpu_fan_max_rpm,
        }
    }
}

/// Fan speed as a percentage of its calibrated maximum, clamped to [0, 100].
fn fan_percent(rpm: f32, max_rpm: u32) -> u8 {
    let percent = (rpm / max_rpm as f32) * 100.0;
    percent.round().clamp(0.0, 100.0) as u8
}

/// Bytes per second to megabits per second. Unbounded upward.
fn bytes_to_mbps(bytes_per_sec: f32) -> f32 {
    bytes_per_sec * 8.0 / 1_048_576.0
}

/// Pure conversion of one snapshot into a [`DisplayFrame`].
pub fn build_frame(snapshot: &Snapshot, uptime_secs: u64, fans: &FanCalibration) -> DisplayFrame {
    DisplayFrame {
        cpu_temp: snapshot.cpu_temp,
        gpu_temp: snapshot.gpu_temp,
        ram_used_percent: snapshot.ram_used_percent,
        cpu_power: snapshot.cpu_power,
        cpu_clock_mhz: snapshot.cpu_clock_mhz,
        cpu_usage: snapshot.cpu_usage,
        cpu_fan_percent: fan_percent(snapshot.cpu_fan_rpm, fans.cpu_max_rpm),
        gpu_power: snapshot.gpu_power,
        gpu_clock_mhz: snapshot.gpu_clock_mhz,
        gpu_usage: snapshot.gpu_usage,
        gpu_fan_percent: fan_percent(snapshot.gpu_fan_rpm, fans.gpu_max_rpm),
        uptime_secs,
        disk_free_gb: snapshot.disk_free_gb,
        wifi_down_mbps: bytes_to_mbps(snapshot.wifi_down_bps),
        wifi_up_mbps: bytes_to_mbps(snapshot.wifi_up_bps),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FANS: FanCalibration = FanCalibration {
        cpu_max_rpm: 2250,
        gpu_max_rpm: 3500,
    };

    #[test]
    fn test_fan_percent_clamps() {
        assert_eq!(fan_percent(0.0, 2250), 0);
        assert_eq!(fan_percent(1125.0, 2250), 50);
        assert_eq!(fan_percent(2250.0, 2250), 100);
        // Twice the calibrated maximum still reads 100, not 200.
        assert_eq!(fan_percent(4500.0, 2250), 100);
    }

    #[test]
    fn test_fan_percent_is_monotonic() {
        let mut last = 0;
        for rpm in (0..=5000).step_by(50) {
            let percent = fan_percent(rpm as f32, 2250);
            assert!(percent >= last, "fan % dropped at {} rpm", rpm);
            last = percent;
        }
    }

    #[test]
    fn test_fan_percent_rounds_to_nearest() {
        // 1013 / 2250 = 45.02% -> 45; 1024 / 2250 = 45.51% -> 46
        assert_eq!(fan_percent(1013.0, 2250), 45);
        assert_eq!(fan_percent(1024.0, 2250), 46);
    }

    #[test]
    fn test_throughput_converts_to_mbps() {
        // 1 MiB/s = 8 Mbps under the display's 2^20 convention.
        assert_eq!(bytes_to_mbps(1_048_576.0), 8.0);
        assert_eq!(bytes_to_mbps(0.0), 0.0);
        // No upper clamp.
        assert!(bytes_to_mbps(1_000_000_000.0) > 100.0);
    }

    #[test]
    fn test_build_frame_passes_values_through() {
        let snapshot = Snapshot {
            cpu_temp: 55.3,
            cpu_fan_rpm: 1125.0,
            ram_used_percent: 42.0,
            wifi_down_bps: 524_288.0,
            ..Default::default()
        };

        let frame = build_frame(&snapshot, 77, &FANS);
        assert_eq!(frame.cpu_temp, 55.3);
        assert_eq!(frame.cpu_fan_percent, 50);
        assert_eq!(frame.ram_used_percent, 42.0);
        assert_eq!(frame.uptime_secs, 77);
        assert_eq!(frame.wifi_down_mbps, 4.0);
        assert_eq!(frame.gpu_fan_percent, 0);
    }
}
