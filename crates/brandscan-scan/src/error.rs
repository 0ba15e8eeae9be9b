//! Error types for the scan engine

use std::path::PathBuf;

/// Scan failures
///
/// A scan error aborts report creation for that submission. It is never turned
/// into a synthetic finding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    /// Backend cannot be reached or is not implemented
    #[error("scan backend '{backend}' unavailable: {reason}")]
    BackendUnavailable { backend: String, reason: String },

    /// Backend did not answer in time
    #[error("scan timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// The same attachment is already being scanned
    #[error("a scan for {key} is already in progress")]
    AlreadyInFlight { key: String },

    /// Backend answered with nothing usable
    #[error("the analyzer returned no usable findings")]
    NoUsableFindings,

    /// Attachment could not be read or classified
    #[error("could not analyze attachment: {0}")]
    Unreadable(String),
}

impl ScanError {
    /// Check if the user can simply try again
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::BackendUnavailable { .. } | Self::AlreadyInFlight { .. }
        )
    }
}

/// Catalog loading errors
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Catalog file could not be read
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Catalog is not valid TOML
    #[error("invalid catalog: {0}")]
    Parse(#[from] toml::de::Error),

    /// Catalog has no rules
    #[error("catalog contains no rules")]
    Empty,

    /// Two rules share an id
    #[error("duplicate rule id '{0}'")]
    DuplicateId(String),

    /// Rule names a category missing from the declared order
    #[error("rule '{rule}' uses undeclared category '{category}'")]
    UnknownCategory { rule: String, category: String },
}
