//! Free-space lookups for the fixed set of reported volumes.

use sysinfo::Disks;

/// Free-space lookup for one volume, identified by mount point or drive
/// letter. A missing or not-ready volume answers `None`; the caller turns
/// that into a zero reading, never an error.
pub trait VolumeProbe: Send {
    /// Re-enumerate volumes. Called once per tick, before the lookups, so
    /// removable drives that appeared or vanished are seen.
    fn refresh(&mut self) {}

    /// Free bytes on the given volume, or `None` if it cannot be queried.
    fn free_bytes(&mut self, volume: &str) -> Option<u64>;
}

/// Production probe backed by the platform disk list.
pub struct DiskProbe {
    disks: Disks,
}

impl DiskProbe {
    pub fn new() -> Self {
        Self {
            disks: Disks::new_with_refreshed_list(),
        }
    }
}

impl Default for DiskProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl VolumeProbe for DiskProbe {
    fn refresh(&mut self) {
        self.disks.refresh_list();
    }

    fn free_bytes(&mut self, volume: &str) -> Option<u64> {
        self.disks
            .iter()
            .find(|disk| {
                disk.mount_point().to_string_lossy() == volume
                    || disk.name().to_string_lossy() == volume
            })
            .map(|disk| disk.available_space())
    }
}
