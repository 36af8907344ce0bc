use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

/// Where the kernel lists the filesystem types it supports.
pub const DEFAULT_FILESYSTEMS_SOURCE: &str = "/proc/filesystems";

/// Device-backed types assumed when the kernel listing cannot be read.
pub const FIXED_TYPES: &[&str] = &[
    "ext3", "ext2", "ext4", "vfat", "fuseblk", "xfs", "jfs", "msdos", "ntfs", "minix", "hfs",
    "hfsplus", "qnx4", "ufs", "btrfs",
];

lazy_static::lazy_static! {
    static ref SYSTEM_REGISTRY: Arc<FilesystemTypeRegistry> =
        Arc::new(FilesystemTypeRegistry::new(DEFAULT_FILESYSTEMS_SOURCE));
}

/// Maps filesystem type names to whether they are backed by a block device.
///
/// The mapping is built on the first call to [`get`](Self::get) and kept for
/// the lifetime of the registry. Concurrent first callers block until the
/// single build finishes. There is no refresh: a kernel module loaded later
/// is not picked up until the process restarts.
#[derive(Debug)]
pub struct FilesystemTypeRegistry {
    source: PathBuf,
    types: OnceLock<HashMap<String, bool>>,
}

impl FilesystemTypeRegistry {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self { source: source.into(), types: OnceLock::new() }
    }

    /// The process-wide registry backed by `/proc/filesystems`.
    pub fn system() -> Arc<Self> {
        SYSTEM_REGISTRY.clone()
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn get(&self) -> &HashMap<String, bool> {
        self.types.get_or_init(|| load(&self.source))
    }

    /// Unknown types count as not device-backed.
    pub fn is_device_backed(&self, fs_type: &str) -> bool {
        self.get().get(fs_type).copied().unwrap_or(false)
    }
}

fn load(source: &Path) -> HashMap<String, bool> {
    match fs::read_to_string(source) {
        Ok(content) => {
            let types = parse_listing(&content);
            tracing::debug!("Loaded {} filesystem types from {}", types.len(), source.display());
            types
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!("{} not found, using built-in filesystem types", source.display());
            fallback()
        }
        Err(e) => {
            tracing::warn!(
                "Failed to read {}: {} - using built-in filesystem types",
                source.display(),
                e
            );
            fallback()
        }
    }
}

/// Parses `<flag>\t<type>` lines. A `nodev` flag marks a pseudo filesystem;
/// any other flag, including an empty one, marks a device-backed type.
pub fn parse_listing(content: &str) -> HashMap<String, bool> {
    let mut types = HashMap::new();
    for line in content.lines() {
        let mut fields = line.split('\t');
        let (Some(flag), Some(name)) = (fields.next(), fields.next()) else {
            continue;
        };
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        types.insert(name.to_string(), flag.trim() != "nodev");
    }
    types
}

fn fallback() -> HashMap<String, bool> {
    FIXED_TYPES.iter().map(|t| (t.to_string(), true)).collect()
}
