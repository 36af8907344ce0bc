//! Unit and API tests for MountWald.
//!
//! ## Test Modules
//!
//! - **parser_tests**: mount-table line and option parsing
//! - **classify_tests**: drive type classification policy
//! - **filesystems_tests**: filesystem-type registry loading and caching
//! - **provider_tests**: mount-table reading and mount lookup
//! - **volume_tests**: lazy volume queries, labels and timeouts
//! - **config_tests**: configuration loading and validation
//! - **error_tests**: error display and HTTP error responses
//! - **drives_api_tests**: `/drives` endpoints
//!
//! Individual test modules can be run with:
//! ```bash
//! cargo test parser_tests
//! ```

use std::fs;
use std::path::Path;
use std::sync::Mutex;

pub mod drives_api_tests;
pub mod volume_tests;

/// Serializes tests that touch process environment variables.
pub static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Writes a mount table into `dir` and returns its path.
pub fn write_mount_table(dir: &Path, content: &str) -> std::path::PathBuf {
    let path = dir.join("mounts");
    fs::write(&path, content).unwrap();
    path
}
