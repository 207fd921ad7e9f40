//! Hardware enumeration and per-tick sensor access.
//!
//! This module owns the node/sensor tree model the aggregator walks, the
//! sysinfo-backed production source, and the volume free-space probe.

pub mod disks;
pub mod host;
pub mod node;

// Re-export commonly used items
pub use disks::{DiskProbe, VolumeProbe};
pub use host::HostSource;
pub use node::{HardwareKind, HardwareNode, HardwareSource, SensorKind, SensorReading, StaticNode};
