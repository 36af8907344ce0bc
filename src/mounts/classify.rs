use std::collections::HashMap;

use super::DriveType;

/// Filesystem types served over the network.
pub const NETWORK_TYPES: &[&str] = &["cifs", "nfs", "nfs4", "nfsd", "sshfs"];

/// One step of the classification policy.
pub struct Rule {
    pub name: &'static str,
    pub matches: fn(device: &str, fs_type: &str, types: &HashMap<String, bool>) -> bool,
    pub drive_type: DriveType,
}

/// Evaluated top to bottom; every matching rule overwrites the result of the
/// rules before it. Order matters: `zfs` beats the network check, which beats
/// the device-backed check.
pub const RULES: &[Rule] = &[
    Rule { name: "device-backed", matches: is_device_backed, drive_type: DriveType::Fixed },
    Rule { name: "network", matches: is_network, drive_type: DriveType::Network },
    Rule { name: "zfs", matches: is_zfs, drive_type: DriveType::Fixed },
];

/// Classifies a mount from its device name and filesystem type.
///
/// `types` is the device-backed mapping from the
/// [`FilesystemTypeRegistry`](super::FilesystemTypeRegistry). Pure, no I/O.
pub fn classify(device: &str, fs_type: &str, types: &HashMap<String, bool>) -> DriveType {
    RULES.iter().fold(DriveType::Unknown, |current, rule| {
        if (rule.matches)(device, fs_type, types) {
            rule.drive_type
        } else {
            current
        }
    })
}

fn is_device_backed(device: &str, fs_type: &str, types: &HashMap<String, bool>) -> bool {
    // Not always fixed, but close enough for a block device.
    device.starts_with("/dev/") || types.get(fs_type).copied().unwrap_or(false)
}

fn is_network(_device: &str, fs_type: &str, _types: &HashMap<String, bool>) -> bool {
    NETWORK_TYPES.contains(&fs_type)
}

fn is_zfs(_device: &str, fs_type: &str, _types: &HashMap<String, bool>) -> bool {
    fs_type == "zfs"
}
