//! # MountWald Library
//!
//! Mount discovery and drive classification for Linux hosts. MountWald reads
//! the kernel's mount table, decides which filesystem types are backed by a
//! block device and classifies every mount as fixed, network or unknown so
//! that capacity planning and write-target validation can treat local disks
//! and network shares differently.
//!
//! ## Core Components
//!
//! - [`mounts`]: mount-table parsing, classification and lazy volume queries
//! - [`config`]: Application configuration management
//! - [`error`]: Mount and volume errors plus HTTP error responses
//! - [`metrics`]: Enumeration and volume query counters
//! - [`routes`]: HTTP API endpoint handlers
//! - [`state`]: Shared application state
//! - [`types`]: Data transfer objects
//!
//! ## Example
//!
//! ```no_run
//! use mountwald::mounts::{MountProvider, ProcMountProvider};
//!
//! let provider = ProcMountProvider::new();
//! for mount in provider.get_mounts() {
//!     println!("{} on {} ({})", mount.name(), mount.root_directory(), mount.drive_type());
//! }
//! ```

pub mod config;
pub mod error;
pub mod metrics;
pub mod mounts;
pub mod routes;
pub mod state;
pub mod types;

#[cfg(test)]
mod tests;
