use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::Duration;

use serde::Serialize;

use crate::error::VolumeError;

/// Where udev publishes filesystem labels as symlinks to their devices.
pub const DEFAULT_LABEL_DIR: &str = "/dev/disk/by-label";

/// Capacity figures of a volume, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VolumeStats {
    /// Free space usable by unprivileged users.
    pub available_bytes: u64,
    /// Free space including root-reserved blocks.
    pub free_bytes: u64,
    pub total_bytes: u64,
}

/// Lazy view on the volume behind a mount point.
///
/// Holds nothing but where to look; every method queries the OS again.
#[derive(Debug, Clone)]
pub struct VolumeInfo {
    root: PathBuf,
    device: String,
    label_dir: PathBuf,
    timeout: Option<Duration>,
}

impl VolumeInfo {
    pub fn new(root: impl Into<PathBuf>, device: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            device: device.into(),
            label_dir: PathBuf::from(DEFAULT_LABEL_DIR),
            timeout: None,
        }
    }

    pub fn with_label_dir(mut self, label_dir: impl Into<PathBuf>) -> Self {
        self.label_dir = label_dir.into();
        self
    }

    /// Bounds every query by `timeout`. Used for network mounts, whose
    /// statistics call can hang indefinitely once the server is gone.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn stats(&self) -> Result<VolumeStats, VolumeError> {
        match self.timeout {
            Some(timeout) => stats_with_timeout(&self.root, timeout),
            None => statvfs(&self.root),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.stats().is_ok()
    }

    /// The filesystem label of the mount's device, or the mount point itself
    /// when the device has no label.
    pub fn label(&self) -> Result<String, VolumeError> {
        self.stats()?;
        Ok(find_label(&self.device, &self.label_dir)
            .unwrap_or_else(|| self.root.display().to_string()))
    }
}

lazy_static::lazy_static! {
    // Roots with a bounded query still running. A hung statvfs cannot be
    // interrupted, so at most one worker per root is ever left behind.
    static ref IN_FLIGHT: Mutex<HashSet<PathBuf>> = Mutex::new(HashSet::new());
}

fn stats_with_timeout(root: &Path, timeout: Duration) -> Result<VolumeStats, VolumeError> {
    stats_with_timeout_using(statvfs, root, timeout)
}

/// Runs `query` on a worker thread and waits at most `timeout` for it.
///
/// While an earlier worker for the same root has not returned, no new one is
/// started and the call times out at once.
pub(crate) fn stats_with_timeout_using<F>(
    query: F,
    root: &Path,
    timeout: Duration,
) -> Result<VolumeStats, VolumeError>
where
    F: FnOnce(&Path) -> Result<VolumeStats, VolumeError> + Send + 'static,
{
    let timed_out = || VolumeError::TimedOut {
        path: root.display().to_string(),
        timeout_ms: timeout.as_millis() as u64,
    };

    let path = root.to_path_buf();
    {
        let mut in_flight = IN_FLIGHT.lock().unwrap_or_else(|e| e.into_inner());
        if !in_flight.insert(path.clone()) {
            tracing::debug!("Earlier query on {} still pending", root.display());
            return Err(timed_out());
        }
    }

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let result = query(&path);
        IN_FLIGHT.lock().unwrap_or_else(|e| e.into_inner()).remove(&path);
        let _ = tx.send(result);
    });
    rx.recv_timeout(timeout).unwrap_or_else(|_| Err(timed_out()))
}

#[cfg(unix)]
fn statvfs(path: &Path) -> Result<VolumeStats, VolumeError> {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let c_path = CString::new(path.as_os_str().as_bytes())
        .map_err(|_| VolumeError::unavailable(path, "path contains a NUL byte"))?;
    let mut buf = std::mem::MaybeUninit::<libc::statvfs>::uninit();
    let rc = unsafe { libc::statvfs(c_path.as_ptr(), buf.as_mut_ptr()) };
    if rc != 0 {
        let err = std::io::Error::last_os_error();
        return Err(VolumeError::unavailable(path, err.to_string()));
    }
    let st = unsafe { buf.assume_init() };

    let block_size = if st.f_frsize > 0 { st.f_frsize as u64 } else { st.f_bsize as u64 };
    Ok(VolumeStats {
        available_bytes: (st.f_bavail as u64).saturating_mul(block_size),
        free_bytes: (st.f_bfree as u64).saturating_mul(block_size),
        total_bytes: (st.f_blocks as u64).saturating_mul(block_size),
    })
}

#[cfg(not(unix))]
fn statvfs(path: &Path) -> Result<VolumeStats, VolumeError> {
    Err(VolumeError::unavailable(path, "volume statistics are not supported on this platform"))
}

fn find_label(device: &str, label_dir: &Path) -> Option<String> {
    // Pseudo devices like `tank` or `nas:/x` are not paths.
    if !device.starts_with('/') {
        return None;
    }
    let target = fs::canonicalize(device).ok()?;
    fs::read_dir(label_dir).ok()?.flatten().find_map(|entry| {
        let resolved = fs::canonicalize(entry.path()).ok()?;
        if resolved == target {
            Some(decode_label(&entry.file_name().to_string_lossy()))
        } else {
            None
        }
    })
}

// udev hex-escapes unsafe characters in label link names, e.g. `My\x20Disk`.
fn decode_label(name: &str) -> String {
    let mut out = Vec::with_capacity(name.len());
    let bytes = name.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\'
            && i + 3 < bytes.len()
            && bytes[i + 1] == b'x'
            && bytes[i + 2].is_ascii_hexdigit()
            && bytes[i + 3].is_ascii_hexdigit()
        {
            if let Ok(value) = u8::from_str_radix(&name[i + 2..i + 4], 16) {
                out.push(value);
                i += 4;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}
