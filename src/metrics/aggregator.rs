//! Per-tick aggregation of the hardware tree into one [`Snapshot`].
//!
//! Matching is table-driven: each rule names where a sensor lives (node
//! scope), what it is (sensor kind plus a name matcher) and how competing
//! matches combine. Adding a sensor family is a table edit, not new control
//! flow.

use crate::hardware::disks::VolumeProbe;
use crate::hardware::node::{HardwareKind, HardwareSource, SensorKind, SensorReading};
use crate::metrics::snapshot::Snapshot;
use tracing::warn;

const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Where on the tree a rule applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    /// Sensors on a CPU node
    Cpu,
    /// Sensors on any GPU-like node, regardless of vendor family
    Gpu,
    /// Sensors on the memory node
    Memory,
    /// Sensors on the motherboard's sub-hardware, not the board itself
    MotherboardSub,
    /// Sensors on a network adapter node
    Network,
}

/// How a rule matches a sensor name.
#[derive(Debug, Clone, Copy)]
enum NameMatch {
    Any,
    Contains(&'static str),
    Exact(&'static str),
}

impl NameMatch {
    fn matches(&self, name: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Contains(fragment) => name.contains(fragment),
            Self::Exact(expected) => name == *expected,
        }
    }
}

/// How competing matches for the same slot combine within one tick.
#[derive(Debug, Clone, Copy)]
enum Combine {
    /// Keep the first sensor that has a present value; never overwrite.
    /// Used where chipsets expose the same quantity under varying names and
    /// tree order is the only sane tiebreak.
    FirstWithValue,
    /// Every match overwrites, an absent value overwrites with zero.
    LastWins,
    /// Keep the maximum across all matches this tick.
    MaxOf,
}

/// The snapshot field a rule feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    CpuTemp,
    CpuPower,
    CpuClock,
    CpuUsage,
    CpuFan,
    GpuTemp,
    GpuPower,
    GpuClock,
    GpuUsage,
    GpuFan,
    RamUsed,
    WifiDown,
    WifiUp,
}

const SLOT_COUNT: usize = 13;

struct Rule {
    scope: Scope,
    sensor: SensorKind,
    name: NameMatch,
    slot: Slot,
    combine: Combine,
}

/// The complete metric-extraction table.
const RULES: &[Rule] = &[
    Rule {
        scope: Scope::Cpu,
        sensor: SensorKind::Temperature,
        name: NameMatch::Any,
        slot: Slot::CpuTemp,
        combine: Combine::FirstWithValue,
    },
    Rule {
        scope: Scope::Cpu,
        sensor: SensorKind::Power,
        name: NameMatch::Contains("Package"),
        slot: Slot::CpuPower,
        combine: Combine::LastWins,
    },
    Rule {
        scope: Scope::Cpu,
        sensor: SensorKind::Clock,
        name: NameMatch::Contains("Core"),
        slot: Slot::CpuClock,
        combine: Combine::MaxOf,
    },
    Rule {
        scope: Scope::Cpu,
        sensor: SensorKind::Load,
        name: NameMatch::Contains("CPU Total"),
        slot: Slot::CpuUsage,
        combine: Combine::LastWins,
    },
    // The CPU fan tachometer lives on the motherboard controller, not the
    // CPU package.
    Rule {
        scope: Scope::MotherboardSub,
        sensor: SensorKind::Fan,
        name: NameMatch::Contains("CPU Fan"),
        slot: Slot::CpuFan,
        combine: Combine::LastWins,
    },
    Rule {
        scope: Scope::Gpu,
        sensor: SensorKind::Temperature,
        name: NameMatch::Contains("GPU Core"),
        slot: Slot::GpuTemp,
        combine: Combine::LastWins,
    },
    Rule {
        scope: Scope::Gpu,
        sensor: SensorKind::Power,
        name: NameMatch::Contains("GPU Package"),
        slot: Slot::GpuPower,
        combine: Combine::LastWins,
    },
    Rule {
        scope: Scope::Gpu,
        sensor: SensorKind::Clock,
        name: NameMatch::Contains("GPU Core"),
        slot: Slot::GpuClock,
        combine: Combine::LastWins,
    },
    Rule {
        scope: Scope::Gpu,
        sensor: SensorKind::Load,
        name: NameMatch::Contains("GPU Core"),
        slot: Slot::GpuUsage,
        combine: Combine::LastWins,
    },
    Rule {
        scope: Scope::Gpu,
        sensor: SensorKind::Fan,
        name: NameMatch::Contains("GPU Fan"),
        slot: Slot::GpuFan,
        combine: Combine::LastWins,
    },
    Rule {
        scope: Scope::Memory,
        sensor: SensorKind::Data,
        name: NameMatch::Contains("Used"),
        slot: Slot::RamUsed,
        combine: Combine::LastWins,
    },
    // Across multiple active adapters the dominant one wins; summing would
    // double-count mirrored traffic.
    Rule {
        scope: Scope::Network,
        sensor: SensorKind::Throughput,
        name: NameMatch::Exact("Download Speed"),
        slot: Slot::WifiDown,
        combine: Combine::MaxOf,
    },
    Rule {
        scope: Scope::Network,
        sensor: SensorKind::Throughput,
        name: NameMatch::Exact("Upload Speed"),
        slot: Slot::WifiUp,
        combine: Combine::MaxOf,
    },
];

/// Accumulates slot values over one walk of the tree.
struct SlotAccumulator {
    snapshot: Snapshot,
    taken: [bool; SLOT_COUNT],
}

impl SlotAccumulator {
    fn new() -> Self {
        Self {
            snapshot: Snapshot::default(),
            taken: [false; SLOT_COUNT],
        }
    }

    fn apply(&mut self, slot: Slot, combine: Combine, value: Option<f32>) {
        let index = slot as usize;
        let field = slot_field(&mut self.snapshot, slot);
        match combine {
            Combine::FirstWithValue => {
                if !self.taken[index] {
                    if let Some(v) = value {
                        *field = v;
                        self.taken[index] = true;
                    }
                }
            }
            Combine::LastWins => {
                *field = value.unwrap_or(0.0);
                self.taken[index] = true;
            }
            Combine::MaxOf => {
                let v = value.unwrap_or(0.0);
                if v > *field {
                    *field = v;
                }
                self.taken[index] = true;
            }
        }
    }

    fn apply_scope(&mut self, scope: Scope, sensors: &[SensorReading]) {
        for sensor in sensors {
            for rule in RULES {
                if rule.scope == scope
                    && rule.sensor == sensor.kind
                    && rule.name.matches(&sensor.name)
                {
                    self.apply(rule.slot, rule.combine, sensor.value);
                }
            }
        }
    }
}

fn slot_field(snapshot: &mut Snapshot, slot: Slot) -> &mut f32 {
    match slot {
        Slot::CpuTemp => &mut snapshot.cpu_temp,
        Slot::CpuPower => &mut snapshot.cpu_power,
        Slot::CpuClock => &mut snapshot.cpu_clock_mhz,
        Slot::CpuUsage => &mut snapshot.cpu_usage,
        Slot::CpuFan => &mut snapshot.cpu_fan_rpm,
        Slot::GpuTemp => &mut snapshot.gpu_temp,
        Slot::GpuPower => &mut snapshot.gpu_power,
        Slot::GpuClock => &mut snapshot.gpu_clock_mhz,
        Slot::GpuUsage => &mut snapshot.gpu_usage,
        Slot::GpuFan => &mut snapshot.gpu_fan_rpm,
        Slot::RamUsed => &mut snapshot.ram_used_percent,
        Slot::WifiDown => &mut snapshot.wifi_down_bps,
        Slot::WifiUp => &mut snapshot.wifi_up_bps,
    }
}

/// Walks the hardware tree once per tick and produces one [`Snapshot`].
///
/// A node that fails to refresh is logged and skipped; its metrics keep
/// their zero defaults for this tick. Only a failure of the whole
/// enumeration propagates. Given an identical tree and probe, repeated
/// calls produce identical snapshots.
pub struct SnapshotAggregator {
    volumes: [String; 3],
}

impl SnapshotAggregator {
    /// Create an aggregator reporting free space for the given volumes.
    pub fn new(volumes: [String; 3]) -> Self {
        Self { volumes }
    }

    /// Produce the snapshot for this tick.
    pub fn collect(
        &self,
        source: &mut dyn HardwareSource,
        probe: &mut dyn VolumeProbe,
    ) -> crate::Result<Snapshot> {
        let mut acc = SlotAccumulator::new();

        for node in source.nodes()? {
            if let Err(err) = node.refresh() {
                warn!(node = node.name(), error = %err, "hardware refresh failed, skipping node");
                continue;
            }

            match node.kind() {
                HardwareKind::Cpu => acc.apply_scope(Scope::Cpu, node.sensors()),
                kind if kind.is_gpu() => acc.apply_scope(Scope::Gpu, node.sensors()),
                HardwareKind::Memory => acc.apply_scope(Scope::Memory, node.sensors()),
                HardwareKind::Network => acc.apply_scope(Scope::Network, node.sensors()),
                HardwareKind::Motherboard => {
                    // Sub-hardware sensor values are stale until each
                    // sub-node has been refreshed itself.
                    for sub in node.sub_hardware() {
                        if let Err(err) = sub.refresh() {
                            warn!(node = sub.name(), error = %err, "sub-hardware refresh failed, skipping node");
                            continue;
                        }
                        acc.apply_scope(Scope::MotherboardSub, sub.sensors());
                    }
                }
                _ => {}
            }
        }

        let mut snapshot = acc.snapshot;

        probe.refresh();
        for (index, volume) in self.volumes.iter().enumerate() {
            snapshot.disk_free_gb[index] = probe
                .free_bytes(volume)
                .map(|bytes| (bytes as f64 / BYTES_PER_GIB) as f32)
                .unwrap_or(0.0);
        }

        Ok(snapshot)
    }
}
