use serde::{Deserialize, Serialize};

use crate::error::VolumeError;
use crate::mounts::{DriveType, Mount, VolumeStats};

/// A mount as reported over HTTP.
///
/// Capacity fields are `None` when the volume could not be queried.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriveInfo {
    pub name: String,
    pub path: String,
    pub drive_type: DriveType,
    pub drive_format: String,
    pub read_only: bool,
    pub ready: bool,
    pub total_bytes: Option<u64>,
    pub free_bytes: Option<u64>,
    pub available_bytes: Option<u64>,
    pub label: Option<String>,
}

impl DriveInfo {
    /// Snapshots a mount. Queries the volume once for capacity and, when that
    /// succeeded, once more for its label.
    pub fn from_mount(mount: &Mount) -> Self {
        match Self::try_from_mount(mount) {
            Ok(info) => info,
            Err(e) => {
                tracing::debug!("Volume query failed: {}", e);
                Self::snapshot(mount, None)
            }
        }
    }

    /// Like [`from_mount`](Self::from_mount) but fails when the volume
    /// cannot be queried.
    pub fn try_from_mount(mount: &Mount) -> Result<Self, VolumeError> {
        let stats = mount.volume_stats()?;
        Ok(Self::snapshot(mount, Some(stats)))
    }

    fn snapshot(mount: &Mount, stats: Option<VolumeStats>) -> Self {
        let label = stats.and_then(|_| mount.volume_label().ok());
        Self {
            name: mount.name().to_string(),
            path: mount.root_directory().to_string(),
            drive_type: mount.drive_type(),
            drive_format: mount.drive_format().to_string(),
            read_only: mount.is_read_only(),
            ready: stats.is_some(),
            total_bytes: stats.map(|s| s.total_bytes),
            free_bytes: stats.map(|s| s.free_bytes),
            available_bytes: stats.map(|s| s.available_bytes),
            label,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrivesResponse {
    pub items: Vec<DriveInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LookupQuery {
    pub path: String,
}
