use std::path::PathBuf;

use axum::{
    extract::{Query, State},
    Json,
};

use crate::error::{validation::validate_path, AppError, AppResult, OptionExt};
use crate::mounts::find_mount;
use crate::state::AppState;
use crate::types::{DriveInfo, DrivesResponse, LookupQuery};

/// Lists all mounts with their current capacity.
///
/// Enumeration and volume queries block, so they run on the blocking pool.
/// A volume that cannot be queried still shows up, with `ready: false`. A
/// mount table that exists but cannot be read is an `IO_ERROR`.
pub async fn list_drives(State(state): State<AppState>) -> AppResult<Json<DrivesResponse>> {
    let provider = state.mounts.clone();
    let items = tokio::task::spawn_blocking(move || {
        provider
            .read_mounts()
            .map(|mounts| mounts.iter().map(DriveInfo::from_mount).collect::<Vec<_>>())
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("drive enumeration task failed: {}", e)))??;

    let unavailable = items.iter().filter(|item| !item.ready).count();
    state.metrics.add_volume_failures(unavailable as u64);

    Ok(Json(DrivesResponse { items }))
}

/// Resolves the mount that owns `?path=`, e.g. to check free space before
/// writing there. Answers 503 when the owning volume cannot be queried.
pub async fn lookup_drive(
    State(state): State<AppState>,
    Query(query): Query<LookupQuery>,
) -> AppResult<Json<DriveInfo>> {
    validate_path(&query.path)?;

    let provider = state.mounts.clone();
    let path = PathBuf::from(&query.path);
    let item = tokio::task::spawn_blocking(move || {
        let mounts = provider.read_mounts()?;
        Ok::<_, AppError>(find_mount(&mounts, &path).map(DriveInfo::try_from_mount))
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("drive lookup task failed: {}", e)))??
    .ok_or_not_found(&format!("Mount for {}", query.path))?;

    let item = item.map_err(|e| {
        state.metrics.add_volume_failures(1);
        AppError::from(e)
    })?;
    Ok(Json(item))
}
