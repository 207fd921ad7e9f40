//! The hardware tree model consumed by the aggregator.
//!
//! Hardware is exposed as a tree of kind-tagged nodes, each carrying typed,
//! optionally-absent sensor readings. Node handles are only meaningful within
//! a single tick: hardware can appear or disappear between ticks (docking,
//! driver reload), so nothing may cache a node reference across ticks.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// The kind of hardware a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HardwareKind {
    Cpu,
    GpuAmd,
    GpuNvidia,
    GpuIntel,
    Memory,
    Motherboard,
    /// Motherboard sub-controller carrying fan and voltage sensors
    EmbeddedController,
    Storage,
    Network,
}

impl HardwareKind {
    /// Whether this node is GPU-like. All vendor families share one rule set
    /// in the aggregator; supporting another vendor is a new variant here,
    /// not new control flow there.
    pub fn is_gpu(&self) -> bool {
        matches!(self, Self::GpuAmd | Self::GpuNvidia | Self::GpuIntel)
    }
}

/// The kind of quantity a sensor reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SensorKind {
    /// Degrees Celsius
    Temperature,
    /// Watts
    Power,
    /// Megahertz
    Clock,
    /// Percent
    Load,
    /// RPM
    Fan,
    /// Quantity of data; unit depends on the sensor
    Data,
    /// Bytes per second
    Throughput,
}

/// One named, typed reading on a hardware node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    /// What kind of quantity this sensor reports
    pub kind: SensorKind,
    /// Human-readable sensor name, e.g. "CPU Total" or "Download Speed"
    pub name: String,
    /// Current value; `None` means "not currently available", which is
    /// distinct from a reading of zero
    pub value: Option<f32>,
}

impl SensorReading {
    /// Convenience constructor for a present reading.
    pub fn new(kind: SensorKind, name: impl Into<String>, value: f32) -> Self {
        Self {
            kind,
            name: name.into(),
            value: Some(value),
        }
    }

    /// Convenience constructor for a currently-unavailable reading.
    pub fn absent(kind: SensorKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            value: None,
        }
    }
}

/// One hardware component (or sub-component) exposing sensors.
///
/// A node's sensor values are stale until [`refresh`](Self::refresh) has been
/// called this tick; the aggregator refreshes every node (and every
/// sub-hardware node) before reading it.
pub trait HardwareNode: Send {
    /// The kind tag controlling which aggregation rules apply.
    fn kind(&self) -> HardwareKind;

    /// Human-readable component name.
    fn name(&self) -> &str;

    /// Re-read this node's sensors from the underlying hardware.
    fn refresh(&mut self) -> Result<()>;

    /// The sensor readings as of the last refresh.
    fn sensors(&self) -> &[SensorReading];

    /// Child components, e.g. a motherboard's embedded controller.
    /// Leaf nodes return an empty slice.
    fn sub_hardware(&mut self) -> &mut [Box<dyn HardwareNode>];
}

/// The root of the hardware tree, owned and re-enumerated by the collaborator
/// that knows how to talk to the platform.
pub trait HardwareSource: Send {
    /// The current top-level nodes. Called once per tick; the returned
    /// borrows must not outlive the tick. An error here means the whole
    /// enumeration failed, not just one node.
    fn nodes(&mut self) -> Result<&mut [Box<dyn HardwareNode>]>;
}

/// A plain-data node, used by sources that build the tree up front and by
/// tests that script exact sensor sets.
pub struct StaticNode {
    kind: HardwareKind,
    name: String,
    sensors: Vec<SensorReading>,
    children: Vec<Box<dyn HardwareNode>>,
}

impl StaticNode {
    pub fn new(kind: HardwareKind, name: impl Into<String>, sensors: Vec<SensorReading>) -> Self {
        Self {
            kind,
            name: name.into(),
            sensors,
            children: Vec::new(),
        }
    }

    /// Attach a sub-hardware node.
    pub fn with_child(mut self, child: StaticNode) -> Self {
        self.children.push(Box::new(child));
        self
    }
}

impl HardwareNode for StaticNode {
    fn kind(&self) -> HardwareKind {
        self.kind
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn refresh(&mut self) -> Result<()> {
        Ok(())
    }

    fn sensors(&self) -> &[SensorReading] {
        &self.sensors
    }

    fn sub_hardware(&mut self) -> &mut [Box<dyn HardwareNode>] {
        &mut self.children
    }
}
