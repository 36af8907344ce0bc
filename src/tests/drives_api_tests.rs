#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use tower::ServiceExt;

    use crate::config::AppConfig;
    use crate::metrics::Metrics;
    use crate::mounts::{FilesystemTypeRegistry, ProcMountProvider};
    use crate::routes::router;
    use crate::state::AppState;
    use crate::tests::write_mount_table;

    /// Creates `data`, `nas` and `tank` mount points under `dir` and a mount
    /// table describing them.
    fn fixture(dir: &Path) -> std::path::PathBuf {
        for name in ["data", "nas", "tank"] {
            fs::create_dir(dir.join(name)).unwrap();
        }
        let root = dir.display();
        write_mount_table(
            dir,
            &format!(
                "/dev/sda1 {root}/data ext4 rw,relatime 0 0\nnas:/x {root}/nas nfs rw 0 0\ntank {root}/tank zfs ro,xattr 0 0\n"
            ),
        )
    }

    fn setup_test_app(dir: &Path, mount_table: &Path) -> (Router, Metrics) {
        let metrics = Metrics::new();
        let provider = ProcMountProvider::new()
            .with_mount_table(mount_table)
            .with_registry(Arc::new(FilesystemTypeRegistry::new(dir.join("no-filesystems"))))
            .with_network_timeout(Some(Duration::from_secs(5)))
            .with_metrics(metrics.clone());
        let state = AppState::with_provider(AppConfig::default(), metrics.clone(), Arc::new(provider));
        (router(state), metrics)
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap()).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_list_drives_classifies_mounts() {
        let dir = tempfile::tempdir().unwrap();
        let table = fixture(dir.path());
        let (app, metrics) = setup_test_app(dir.path(), &table);

        let (status, v) = get_json(app, "/drives").await;
        assert_eq!(status, StatusCode::OK);

        let items = v["items"].as_array().unwrap();
        assert_eq!(items.len(), 3);
        let types: Vec<&str> = items.iter().map(|i| i["drive_type"].as_str().unwrap()).collect();
        assert_eq!(types, vec!["fixed", "network", "fixed"]);
        assert_eq!(items[0]["name"], "/dev/sda1");
        assert_eq!(items[0]["path"], format!("{}/data", dir.path().display()));
        assert_eq!(items[1]["drive_format"], "nfs");
        assert_eq!(items[2]["read_only"], true);

        for item in items {
            assert_eq!(item["ready"], true);
            assert!(item["total_bytes"].as_u64().unwrap() > 0);
            assert!(item["label"].is_string());
        }

        let snapshot = metrics.get_snapshot();
        assert_eq!(snapshot.enumerations, 1);
        assert_eq!(snapshot.mounts_listed, 3);
        assert_eq!(snapshot.volume_failures, 0);
    }

    #[tokio::test]
    async fn test_list_drives_without_mount_table() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = setup_test_app(dir.path(), &dir.path().join("absent"));

        let (status, v) = get_json(app, "/drives").await;
        assert_eq!(status, StatusCode::OK);
        assert!(v["items"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_volume_is_listed_as_not_ready() {
        let dir = tempfile::tempdir().unwrap();
        let table = write_mount_table(
            dir.path(),
            &format!("nas:/gone {}/stale nfs rw 0 0\n", dir.path().display()),
        );
        let (app, metrics) = setup_test_app(dir.path(), &table);

        let (status, v) = get_json(app, "/drives").await;
        assert_eq!(status, StatusCode::OK);

        let item = &v["items"][0];
        assert_eq!(item["drive_type"], "network");
        assert_eq!(item["ready"], false);
        assert!(item["total_bytes"].is_null());
        assert!(item["label"].is_null());
        assert_eq!(metrics.get_snapshot().volume_failures, 1);
    }

    #[tokio::test]
    async fn test_list_drives_reports_unreadable_mount_table() {
        let dir = tempfile::tempdir().unwrap();
        // A directory exists but cannot be read as a file.
        let (app, _) = setup_test_app(dir.path(), dir.path());

        let (status, v) = get_json(app, "/drives").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(v["error"]["code"], "IO_ERROR");
    }

    #[tokio::test]
    async fn test_lookup_drive_on_unavailable_volume() {
        let dir = tempfile::tempdir().unwrap();
        let table = write_mount_table(
            dir.path(),
            &format!("nas:/gone {}/stale nfs rw 0 0\n", dir.path().display()),
        );
        let (app, metrics) = setup_test_app(dir.path(), &table);

        let uri = format!("/drives/lookup?path={}/stale/file", dir.path().display());
        let (status, v) = get_json(app, &uri).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(v["error"]["code"], "SERVICE_UNAVAILABLE");
        assert!(v["error"]["message"].as_str().unwrap().contains("/stale"));
        assert_eq!(metrics.get_snapshot().volume_failures, 1);
    }

    #[tokio::test]
    async fn test_lookup_drive_resolves_owning_mount() {
        let dir = tempfile::tempdir().unwrap();
        let table = fixture(dir.path());
        let (app, _) = setup_test_app(dir.path(), &table);

        let uri = format!("/drives/lookup?path={}/nas/incoming/file.mkv", dir.path().display());
        let (status, v) = get_json(app, &uri).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(v["name"], "nas:/x");
        assert_eq!(v["drive_type"], "network");
        assert_eq!(v["path"], format!("{}/nas", dir.path().display()));
    }

    #[tokio::test]
    async fn test_lookup_drive_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let table = fixture(dir.path());
        let (app, _) = setup_test_app(dir.path(), &table);

        let (status, v) = get_json(app, "/drives/lookup?path=/somewhere/else").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(v["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_lookup_drive_rejects_relative_path() {
        let dir = tempfile::tempdir().unwrap();
        let table = fixture(dir.path());
        let (app, _) = setup_test_app(dir.path(), &table);

        let (status, v) = get_json(app, "/drives/lookup?path=relative/dir").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(v["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_healthz_and_metrics() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = setup_test_app(dir.path(), &dir.path().join("absent"));

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let (status, v) = get_json(app, "/metrics").await;
        assert_eq!(status, StatusCode::OK);
        assert!(v["enumerations"].is_u64());
        assert!(v["uptime_seconds"].is_u64());
    }
}
