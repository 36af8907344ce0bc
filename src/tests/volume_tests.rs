#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use crate::error::VolumeError;
    use crate::mounts::volume::stats_with_timeout_using;
    use crate::mounts::{DriveType, Mount, MountOptions, VolumeInfo, VolumeStats};

    fn slow_query(
        calls: Arc<AtomicUsize>,
        delay: Duration,
    ) -> impl FnOnce(&Path) -> Result<VolumeStats, VolumeError> + Send + 'static {
        move |_: &Path| {
            calls.fetch_add(1, Ordering::SeqCst);
            thread::sleep(delay);
            Ok(VolumeStats { available_bytes: 1, free_bytes: 1, total_bytes: 1 })
        }
    }

    #[test]
    fn test_stats_for_existing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let stats = VolumeInfo::new(dir.path(), "none").stats().unwrap();

        assert!(stats.total_bytes > 0);
        assert!(stats.free_bytes <= stats.total_bytes);
        assert!(stats.available_bytes <= stats.free_bytes);
    }

    #[test]
    fn test_missing_mount_point_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("gone");
        let volume = VolumeInfo::new(&gone, "none");

        match volume.stats() {
            Err(VolumeError::Unavailable { path, .. }) => assert_eq!(path, gone.display().to_string()),
            other => panic!("expected Unavailable, got {:?}", other),
        }
        assert!(!volume.is_ready());
        assert!(volume.label().is_err());
    }

    #[test]
    fn test_timeout_bounded_query_answers_for_healthy_volume() {
        let dir = tempfile::tempdir().unwrap();
        let volume = VolumeInfo::new(dir.path(), "nas:/share").with_timeout(Some(Duration::from_secs(5)));

        assert!(volume.stats().is_ok());
        assert!(volume.is_ready());
    }

    #[test]
    fn test_timeout_bounded_query_still_reports_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let volume = VolumeInfo::new(dir.path().join("stale"), "nas:/share")
            .with_timeout(Some(Duration::from_secs(5)));

        assert!(matches!(volume.stats(), Err(VolumeError::Unavailable { .. })));
    }

    #[test]
    fn test_hung_query_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let timeout = Duration::from_millis(50);

        let result = stats_with_timeout_using(
            slow_query(calls.clone(), Duration::from_millis(300)),
            dir.path(),
            timeout,
        );

        match result {
            Err(VolumeError::TimedOut { path, timeout_ms: 50 }) => {
                assert_eq!(path, dir.path().display().to_string())
            }
            other => panic!("expected TimedOut, got {:?}", other),
        }
    }

    #[test]
    fn test_pending_query_blocks_new_workers_for_same_root() {
        let dir = tempfile::tempdir().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let timeout = Duration::from_millis(50);
        let delay = Duration::from_millis(300);

        let first = stats_with_timeout_using(slow_query(calls.clone(), delay), dir.path(), timeout);
        assert!(matches!(first, Err(VolumeError::TimedOut { .. })));

        // first worker is still sleeping
        let second = stats_with_timeout_using(slow_query(calls.clone(), delay), dir.path(), timeout);
        assert!(matches!(second, Err(VolumeError::TimedOut { timeout_ms: 50, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        thread::sleep(Duration::from_millis(600));
        let third = stats_with_timeout_using(
            slow_query(calls.clone(), Duration::ZERO),
            dir.path(),
            Duration::from_secs(5),
        );
        assert!(third.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_label_falls_back_to_mount_point() {
        let dir = tempfile::tempdir().unwrap();
        let labels = tempfile::tempdir().unwrap();
        let volume = VolumeInfo::new(dir.path(), "/dev/definitely-not-a-device")
            .with_label_dir(labels.path());

        assert_eq!(volume.label().unwrap(), dir.path().display().to_string());
    }

    #[cfg(unix)]
    #[test]
    fn test_label_resolved_from_label_links() {
        let dir = tempfile::tempdir().unwrap();
        let device = dir.path().join("sdz1");
        fs::write(&device, b"").unwrap();
        let other = dir.path().join("sdz2");
        fs::write(&other, b"").unwrap();

        let labels = dir.path().join("by-label");
        fs::create_dir(&labels).unwrap();
        std::os::unix::fs::symlink(&other, labels.join("Backup")).unwrap();
        std::os::unix::fs::symlink(&device, labels.join("Media\\x20Disk")).unwrap();

        let volume = VolumeInfo::new(dir.path(), device.to_str().unwrap()).with_label_dir(&labels);
        assert_eq!(volume.label().unwrap(), "Media Disk");
    }

    #[cfg(unix)]
    #[test]
    fn test_relative_device_is_not_resolved_against_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        let labels = dir.path().join("by-label");
        fs::create_dir(&labels).unwrap();
        let in_cwd = std::env::current_dir().unwrap().join("Cargo.toml");
        std::os::unix::fs::symlink(&in_cwd, labels.join("Workspace")).unwrap();

        let volume = VolumeInfo::new(dir.path(), "Cargo.toml").with_label_dir(&labels);
        assert_eq!(volume.label().unwrap(), dir.path().display().to_string());
    }

    #[test]
    fn test_mount_requeries_volume_on_every_access() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("vol");
        fs::create_dir(&root).unwrap();
        let root_str = root.to_str().unwrap().to_string();

        let mount = Mount::new(
            DriveType::Fixed,
            "/dev/sdx1",
            root_str.clone(),
            "ext4",
            MountOptions::new(),
            VolumeInfo::new(&root, "/dev/sdx1"),
        );

        assert!(mount.is_ready());
        assert!(mount.total_size().unwrap() > 0);
        assert!(mount.available_free_space().is_ok());
        assert!(mount.total_free_space().is_ok());

        fs::remove_dir(&root).unwrap();

        assert!(!mount.is_ready());
        assert!(matches!(mount.total_size(), Err(VolumeError::Unavailable { .. })));
        assert!(mount.available_free_space().is_err());
        assert!(mount.volume_label().is_err());
        // identity survives the volume going away
        assert_eq!(mount.root_directory(), root_str);
        assert_eq!(mount.drive_format(), "ext4");
    }

    #[test]
    fn test_volume_error_reports_path() {
        let err = VolumeError::TimedOut { path: "/mnt/nas".to_string(), timeout_ms: 1000 };
        assert_eq!(err.path(), "/mnt/nas");
        assert_eq!(err.to_string(), "volume at /mnt/nas did not respond within 1000 ms");
    }
}
