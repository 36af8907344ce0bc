//! Mount discovery and drive classification.
//!
//! The kernel's mount table is read line by line, each line is parsed into a
//! [`parser::ParsedMount`], classified with [`classify::classify`] against the
//! process-wide [`filesystems::FilesystemTypeRegistry`] and turned into a
//! [`Mount`]. Capacity figures are never captured at parse time: every
//! accessor on [`Mount`] asks the OS again through its [`volume::VolumeInfo`].

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MountError, VolumeError};

pub mod classify;
pub mod filesystems;
pub mod parser;
pub mod proc;
pub mod volume;

pub use classify::classify;
pub use filesystems::FilesystemTypeRegistry;
pub use parser::{parse_line, parse_options, MountOptions, ParsedMount};
pub use proc::ProcMountProvider;
pub use volume::{VolumeInfo, VolumeStats};

/// Storage medium of a mount, used to pick capacity and write policies.
///
/// The Linux mount reader only ever yields `Unknown`, `Fixed` and `Network`.
/// The remaining variants exist for drive enumerators on other platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriveType {
    Unknown,
    Fixed,
    Network,
    Removable,
    #[serde(rename = "ramdisk")]
    Ram,
    CdRom,
}

impl DriveType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriveType::Unknown => "unknown",
            DriveType::Fixed => "fixed",
            DriveType::Network => "network",
            DriveType::Removable => "removable",
            DriveType::Ram => "ramdisk",
            DriveType::CdRom => "cdrom",
        }
    }
}

impl fmt::Display for DriveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A mounted filesystem.
///
/// Identity fields are fixed at construction. Space, label and readiness are
/// re-queried on every call, so two reads may disagree if the volume changed
/// in between.
#[derive(Debug, Clone)]
pub struct Mount {
    drive_type: DriveType,
    name: String,
    root_directory: String,
    drive_format: String,
    options: MountOptions,
    volume: VolumeInfo,
}

impl Mount {
    pub fn new(
        drive_type: DriveType,
        name: impl Into<String>,
        root_directory: impl Into<String>,
        drive_format: impl Into<String>,
        options: MountOptions,
        volume: VolumeInfo,
    ) -> Self {
        Self {
            drive_type,
            name: name.into(),
            root_directory: root_directory.into(),
            drive_format: drive_format.into(),
            options,
            volume,
        }
    }

    pub fn drive_type(&self) -> DriveType {
        self.drive_type
    }

    /// Device identifier, e.g. `/dev/sda1`, `nas:/share` or a pool dataset name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root_directory(&self) -> &str {
        &self.root_directory
    }

    /// Filesystem type as reported by the kernel (`ext4`, `nfs`, `zfs`, ...).
    pub fn drive_format(&self) -> &str {
        &self.drive_format
    }

    pub fn options(&self) -> &HashMap<String, String> {
        &self.options
    }

    pub fn is_read_only(&self) -> bool {
        self.options.contains_key("ro")
    }

    /// Bytes available to unprivileged users.
    pub fn available_free_space(&self) -> Result<u64, VolumeError> {
        self.volume.stats().map(|s| s.available_bytes)
    }

    /// Free bytes including blocks reserved for root.
    pub fn total_free_space(&self) -> Result<u64, VolumeError> {
        self.volume.stats().map(|s| s.free_bytes)
    }

    pub fn total_size(&self) -> Result<u64, VolumeError> {
        self.volume.stats().map(|s| s.total_bytes)
    }

    /// All three capacity figures from a single query.
    pub fn volume_stats(&self) -> Result<VolumeStats, VolumeError> {
        self.volume.stats()
    }

    pub fn volume_label(&self) -> Result<String, VolumeError> {
        self.volume.label()
    }

    pub fn is_ready(&self) -> bool {
        self.volume.is_ready()
    }
}

/// A source of mount records.
///
/// The proc-based reader is the Linux implementation; drive-letter
/// enumeration on Windows would plug in here as well.
pub trait MountProvider: Send + Sync {
    /// Enumerates the current mounts, in source order.
    ///
    /// An absent source yields an empty list. A source that exists but
    /// cannot be read is a [`MountError::Io`].
    fn read_mounts(&self) -> Result<Vec<Mount>, MountError>;

    /// Like [`read_mounts`](Self::read_mounts) but never fails: an unreadable
    /// source is logged and yields an empty list.
    fn get_mounts(&self) -> Vec<Mount> {
        match self.read_mounts() {
            Ok(mounts) => mounts,
            Err(e) => {
                tracing::warn!("Unable to enumerate mounts: {}", e);
                Vec::new()
            }
        }
    }

    /// The mount that owns `path`, see [`find_mount`].
    fn get_mount(&self, path: &Path) -> Option<Mount> {
        find_mount(&self.get_mounts(), path).cloned()
    }
}

/// Finds the mount whose root directory is `path` itself or its closest
/// ancestor.
///
/// Matching is per path component, so `/data` does not own `/database`. When
/// several mounts share a root directory the last one wins, which is the one
/// stacked on top in mount-table order.
pub fn find_mount<'a>(mounts: &'a [Mount], path: impl AsRef<Path>) -> Option<&'a Mount> {
    let path = path.as_ref();
    mounts
        .iter()
        .filter(|m| path.starts_with(m.root_directory()))
        .max_by_key(|m| Path::new(m.root_directory()).components().count())
}
