//! The serial line format the display device parses.
//!
//! One newline-terminated line per tick, comma-separated `KEY:VALUE` pairs in
//! a fixed order. The receiver parses positionally, so any reordering or
//! added field is a breaking protocol change.

use crate::metrics::snapshot::DisplayFrame;

/// Encode one frame as the wire line. Deterministic: the same frame always
/// produces a byte-identical line. Never fails - every field is a plain
/// number.
pub fn encode_frame(frame: &DisplayFrame) -> String {
    format!(
        "CPU:{:.1},GPU:{:.1},RAM:{:.1},\
         CPUPWR:{:.0},CPUCLK:{:.0},CPUUSE:{:.0},CPUFAN:{},\
         GPUPWR:{:.0},GPUCLK:{:.0},GPUUSE:{:.0},GPUFAN:{},\
         UPTIME:{},\
         DISKC:{:.1},DISKD:{:.1},DISKE:{:.1},\
         WIFIDN:{:.1},WIFIUP:{:.1}\n",
        frame.cpu_temp,
        frame.gpu_temp,
        frame.ram_used_percent,
        frame.cpu_power,
        frame.cpu_clock_mhz,
        frame.cpu_usage,
        frame.cpu_fan_percent,
        frame.gpu_power,
        frame.gpu_clock_mhz,
        frame.gpu_usage,
        frame.gpu_fan_percent,
        frame.uptime_secs,
        frame.disk_free_gb[0],
        frame.disk_free_gb[1],
        frame.disk_free_gb[2],
        frame.wifi_down_mbps,
        frame.wifi_up_mbps,
    )
}
