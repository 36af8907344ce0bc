use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::config::MountsConfig;
use crate::error::MountError;
use crate::metrics::Metrics;

use super::filesystems::{FilesystemTypeRegistry, DEFAULT_FILESYSTEMS_SOURCE};
use super::parser::parse_line;
use super::volume::{VolumeInfo, DEFAULT_LABEL_DIR};
use super::{classify, DriveType, Mount, MountProvider};

/// Where the kernel exposes the table of mounted filesystems.
pub const DEFAULT_MOUNT_TABLE: &str = "/proc/mounts";

/// Reads mounts from a proc-style mount table.
///
/// Every call to [`get_mounts`](MountProvider::get_mounts) reads the table
/// afresh; only the filesystem-type registry is shared between calls.
#[derive(Clone)]
pub struct ProcMountProvider {
    mount_table: PathBuf,
    registry: Arc<FilesystemTypeRegistry>,
    label_dir: PathBuf,
    network_timeout: Option<Duration>,
    metrics: Option<Metrics>,
}

impl ProcMountProvider {
    /// Reads `/proc/mounts` using the process-wide filesystem registry.
    pub fn new() -> Self {
        Self {
            mount_table: PathBuf::from(DEFAULT_MOUNT_TABLE),
            registry: FilesystemTypeRegistry::system(),
            label_dir: PathBuf::from(DEFAULT_LABEL_DIR),
            network_timeout: None,
            metrics: None,
        }
    }

    /// Builds a provider from configuration. The shared registry is reused
    /// when the configured listing is the system one.
    pub fn from_config(cfg: &MountsConfig) -> Self {
        let registry = if Path::new(&cfg.filesystems) == Path::new(DEFAULT_FILESYSTEMS_SOURCE) {
            FilesystemTypeRegistry::system()
        } else {
            Arc::new(FilesystemTypeRegistry::new(&cfg.filesystems))
        };
        Self::new()
            .with_mount_table(&cfg.mount_table)
            .with_registry(registry)
            .with_label_dir(&cfg.label_dir)
            .with_network_timeout(Some(Duration::from_millis(cfg.network_timeout_ms)))
    }

    pub fn with_mount_table(mut self, path: impl Into<PathBuf>) -> Self {
        self.mount_table = path.into();
        self
    }

    pub fn with_registry(mut self, registry: Arc<FilesystemTypeRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_label_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.label_dir = path.into();
        self
    }

    /// Upper bound for volume queries on network mounts. `None` waits forever.
    pub fn with_network_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.network_timeout = timeout;
        self
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Turns mount-table text into mounts, in line order. Lines that do not
    /// parse are logged and skipped.
    pub fn parse_table(&self, content: &str) -> Vec<Mount> {
        let types = self.registry.get();
        let mut skipped = 0u64;

        let mounts: Vec<Mount> = content
            .lines()
            .filter_map(|line| match parse_line(line) {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    tracing::debug!("Skipping mount table line: {}", e);
                    skipped += 1;
                    None
                }
            })
            .map(|parsed| {
                let drive_type = classify(&parsed.device, &parsed.fs_type, types);
                let timeout = match drive_type {
                    DriveType::Network => self.network_timeout,
                    _ => None,
                };
                let volume = VolumeInfo::new(&parsed.mount_point, &parsed.device)
                    .with_label_dir(&self.label_dir)
                    .with_timeout(timeout);
                Mount::new(
                    drive_type,
                    parsed.device,
                    parsed.mount_point,
                    parsed.fs_type,
                    parsed.options,
                    volume,
                )
            })
            .collect();

        if let Some(metrics) = &self.metrics {
            metrics.inc_enumerations();
            metrics.add_mounts(mounts.len() as u64);
            metrics.add_skipped(skipped);
        }
        mounts
    }
}

impl Default for ProcMountProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MountProvider for ProcMountProvider {
    /// Reads and parses the mount table.
    ///
    /// A missing table is not an error and yields no mounts. A table that
    /// exists but cannot be read is reported as [`MountError::Io`]. Bytes that
    /// are not valid UTF-8 are replaced, so one odd name never hides the rest.
    fn read_mounts(&self) -> Result<Vec<Mount>, MountError> {
        let bytes = match fs::read(&self.mount_table) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("{} not found, no mounts to report", self.mount_table.display());
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(MountError::Io { path: self.mount_table.clone(), source });
            }
        };
        Ok(self.parse_table(&String::from_utf8_lossy(&bytes)))
    }
}
