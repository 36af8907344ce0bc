use std::sync::Arc;

use crate::config::AppConfig;
use crate::metrics::Metrics;
use crate::mounts::{MountProvider, ProcMountProvider};

/// The shared application state.
///
/// Cloned into every handler by Axum; everything inside is reference counted.
#[derive(Clone)]
pub struct AppState {
    /// The application configuration.
    pub config: Arc<AppConfig>,
    /// Enumeration and volume query counters.
    pub metrics: Metrics,
    /// Source of mount records. Built once so the filesystem-type registry
    /// it carries is loaded once per process.
    pub mounts: Arc<dyn MountProvider>,
}

impl AppState {
    /// Creates the state with a proc-based mount provider built from `config`.
    pub fn new(config: AppConfig) -> Self {
        let metrics = Metrics::new();
        let provider = ProcMountProvider::from_config(&config.mounts).with_metrics(metrics.clone());
        Self::with_provider(config, metrics, Arc::new(provider))
    }

    pub fn with_provider(config: AppConfig, metrics: Metrics, mounts: Arc<dyn MountProvider>) -> Self {
        Self { config: Arc::new(config), metrics, mounts }
    }
}
