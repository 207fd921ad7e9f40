//! sysinfo-backed hardware source.
//!
//! Builds the node tree fresh on every tick from the platform facilities
//! sysinfo exposes, emitting the canonical sensor names the aggregation
//! rules match on ("CPU Total", "Memory Used", "Download Speed", ...).
//! Metrics the platform does not expose (package power, fan RPM on most
//! desktop Linux setups) are simply not emitted; downstream they read as
//! zero, which is a valid reading, not an error.

use crate::hardware::node::{
    HardwareKind, HardwareNode, HardwareSource, SensorKind, SensorReading, StaticNode,
};
use std::time::Instant;
use sysinfo::{Components, Networks, System};

/// Component labels that identify a CPU temperature sensor across the
/// common chipset drivers.
const CPU_TEMP_MARKERS: &[&str] = &["cpu", "coretemp", "k10temp", "tctl", "tdie", "package"];

/// Component labels that identify a GPU temperature sensor.
const GPU_TEMP_MARKERS: &[&str] = &["gpu", "amdgpu", "radeon", "nvidia"];

/// Production [`HardwareSource`] reading through sysinfo.
pub struct HostSource {
    system: System,
    components: Components,
    networks: Networks,
    last_refresh: Instant,
    nodes: Vec<Box<dyn HardwareNode>>,
}

impl HostSource {
    /// Create a new source. The first refresh happens here so the first
    /// tick already has usable CPU usage deltas.
    pub fn new() -> Self {
        let mut system = System::new_all();
        system.refresh_all();
        let components = Components::new_with_refreshed_list();
        let networks = Networks::new_with_refreshed_list();

        Self {
            system,
            components,
            networks,
            last_refresh: Instant::now(),
            nodes: Vec::new(),
        }
    }

    fn rebuild(&mut self) {
        self.system.refresh_cpu_usage();
        self.system.refresh_memory();
        self.components.refresh();
        self.networks.refresh();

        let elapsed_secs = self.last_refresh.elapsed().as_secs_f32().max(0.001);
        self.last_refresh = Instant::now();

        let mut nodes: Vec<Box<dyn HardwareNode>> = Vec::new();
        nodes.push(Box::new(self.cpu_node()));
        if let Some(gpu) = self.gpu_node() {
            nodes.push(Box::new(gpu));
        }
        nodes.push(Box::new(self.memory_node()));
        nodes.push(Box::new(self.motherboard_node()));
        for network in self.network_nodes(elapsed_secs) {
            nodes.push(Box::new(network));
        }
        self.nodes = nodes;
    }

    fn cpu_node(&self) -> StaticNode {
        let cpus = self.system.cpus();
        let mut sensors = Vec::new();

        for component in self.components.iter() {
            let label = component.label().to_lowercase();
            if CPU_TEMP_MARKERS.iter().any(|m| label.contains(m))
                && !GPU_TEMP_MARKERS.iter().any(|m| label.contains(m))
            {
                sensors.push(SensorReading::new(
                    SensorKind::Temperature,
                    component.label(),
                    component.temperature(),
                ));
            }
        }

        if !cpus.is_empty() {
            let usage = cpus.iter().map(|cpu| cpu.cpu_usage()).sum::<f32>() / cpus.len() as f32;
            sensors.push(SensorReading::new(SensorKind::Load, "CPU Total", usage));
        }

        for (index, cpu) in cpus.iter().enumerate() {
            sensors.push(SensorReading::new(
                SensorKind::Clock,
                format!("Core #{}", index + 1),
                cpu.frequency() as f32,
            ));
        }

        let name = cpus
            .first()
            .map(|cpu| cpu.brand().to_string())
            .unwrap_or_else(|| "CPU".to_string());
        StaticNode::new(HardwareKind::Cpu, name, sensors)
    }

    /// GPU node, if any GPU temperature component is present. sysinfo gives
    /// us temperature only; clock/load/fan stay absent and read as zero.
    fn gpu_node(&self) -> Option<StaticNode> {
        let mut sensors = Vec::new();
        let mut vendor = HardwareKind::GpuIntel;

        for component in self.components.iter() {
            let label = component.label().to_lowercase();
            if GPU_TEMP_MARKERS.iter().any(|m| label.contains(m)) {
                if label.contains("amdgpu") || label.contains("radeon") {
                    vendor = HardwareKind::GpuAmd;
                } else if label.contains("nvidia") {
                    vendor = HardwareKind::GpuNvidia;
                }
                sensors.push(SensorReading::new(
                    SensorKind::Temperature,
                    "GPU Core",
                    component.temperature(),
                ));
            }
        }

        if sensors.is_empty() {
            return None;
        }
        Some(StaticNode::new(vendor, "GPU", sensors))
    }

    fn memory_node(&self) -> StaticNode {
        let total = self.system.total_memory();
        let used = self.system.used_memory();
        let used_percent = if total > 0 {
            (used as f32 / total as f32) * 100.0
        } else {
            0.0
        };

        StaticNode::new(
            HardwareKind::Memory,
            "Memory",
            vec![SensorReading::new(
                SensorKind::Data,
                "Memory Used",
                used_percent,
            )],
        )
    }

    /// Motherboard with its embedded-controller sub-node. Fan tachometers
    /// are not visible through sysinfo, so the sub-node carries no sensors
    /// here; shells with richer platform access substitute their own source.
    fn motherboard_node(&self) -> StaticNode {
        let name = System::host_name().unwrap_or_else(|| "Motherboard".to_string());
        StaticNode::new(HardwareKind::Motherboard, name, Vec::new()).with_child(StaticNode::new(
            HardwareKind::EmbeddedController,
            "Embedded Controller",
            Vec::new(),
        ))
    }

    fn network_nodes(&self, elapsed_secs: f32) -> Vec<StaticNode> {
        self.networks
            .iter()
            .filter(|(name, _)| !name.starts_with("lo"))
            .map(|(name, data)| {
                let down = data.received() as f32 / elapsed_secs;
                let up = data.transmitted() as f32 / elapsed_secs;
                StaticNode::new(
                    HardwareKind::Network,
                    name.clone(),
                    vec![
                        SensorReading::new(SensorKind::Throughput, "Download Speed", down),
                        SensorReading::new(SensorKind::Throughput, "Upload Speed", up),
                    ],
                )
            })
            .collect()
    }
}

impl Default for HostSource {
    fn default() -> Self {
        Self::new()
    }
}

impl HardwareSource for HostSource {
    fn nodes(&mut self) -> crate::Result<&mut [Box<dyn HardwareNode>]> {
        self.rebuild();
        Ok(&mut self.nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_source_builds_a_tree() {
        let mut source = HostSource::new();
        let nodes = source.nodes().unwrap();
        assert!(!nodes.is_empty());
        // A CPU and a memory node are always present.
        assert!(nodes.iter().any(|n| n.kind() == HardwareKind::Cpu));
        assert!(nodes.iter().any(|n| n.kind() == HardwareKind::Memory));
    }

    #[test]
    fn test_memory_used_is_a_percentage() {
        let mut source = HostSource::new();
        let nodes = source.nodes().unwrap();
        let memory = nodes
            .iter()
            .find(|n| n.kind() == HardwareKind::Memory)
            .unwrap();
        let used = memory
            .sensors()
            .iter()
            .find(|s| s.name.contains("Used"))
            .unwrap();
        let value = used.value.unwrap();
        assert!((0.0..=100.0).contains(&value));
    }

    #[test]
    fn test_tree_is_rebuilt_each_tick() {
        let mut source = HostSource::new();
        let first = source.nodes().unwrap().len();
        let second = source.nodes().unwrap().len();
        // Node count may differ if hardware came or went, but both ticks
        // must produce a usable tree.
        assert!(first > 0);
        assert!(second > 0);
    }
}
