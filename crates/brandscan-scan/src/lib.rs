//! Brandscan Scan Engine
//!
//! Turns an accepted [`Attachment`](brandscan_artifact::Attachment) into an
//! ordered list of categorized [`Finding`]s.
//!
//! # Core Concepts
//!
//! - [`Finding`]: one compliance observation with a [`FindingStatus`]
//! - [`Catalog`]: declarative rule set and category order
//! - [`ScanBackend`]: pluggable analyzer ([`CatalogBackend`], [`RemoteBackend`])
//! - [`ScanEngine`]: in-flight tracking, timeout and ordering around a backend

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod backend;
mod catalog;
mod engine;
mod error;
mod finding;

pub use backend::{
    backend_from_config, backend_with_catalog, BackendKind, CatalogBackend, RemoteBackend, ScanBackend, ScanConfig,
};
pub use catalog::{Catalog, Rule};
pub use engine::{ScanEngine, DEFAULT_TIMEOUT};
pub use error::{CatalogError, ScanError};
pub use finding::{Finding, FindingStatus, GuidelineKey};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
