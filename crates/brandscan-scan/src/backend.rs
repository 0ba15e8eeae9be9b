//! Analyzer backends
//!
//! [`ScanBackend`] is the seam between the engine and whatever actually looks
//! at a design. [`CatalogBackend`] answers from a [`Catalog`] after a fixed
//! delay; [`RemoteBackend`] stands in for a vision or design-tool service that
//! is not wired up yet. Which one runs is decided by [`ScanConfig`].

use crate::catalog::Catalog;
use crate::error::{CatalogError, ScanError};
use crate::finding::Finding;
use brandscan_artifact::{Attachment, AttachmentKind};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Analyzer backend
///
/// Implement this trait to plug in a real analyzer. Implementations return
/// findings in any order; the engine sorts them.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ScanBackend: Send + Sync {
    /// Short name used in logs and errors
    fn name(&self) -> &'static str;

    /// Analyze one attachment
    async fn analyze(&self, attachment: &Attachment) -> Result<Vec<Finding>, ScanError>;
}

/// Backend selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Canned catalog answers
    #[default]
    Mock,
    /// External analyzer service
    Remote,
}

/// Scan configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Which backend to use
    pub backend: BackendKind,
    /// Simulated processing time for uploads
    pub mock_delay_ms: u64,
    /// Simulated processing time for references
    pub reference_delay_ms: u64,
    /// Hard limit for one scan
    pub timeout_ms: u64,
    /// Rule catalog to load instead of the built-in one
    pub catalog_path: Option<PathBuf>,
    /// Remote analyzer endpoint
    pub endpoint: Option<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Mock,
            mock_delay_ms: 2000,
            reference_delay_ms: 2500,
            timeout_ms: 30_000,
            catalog_path: None,
            endpoint: None,
        }
    }
}

impl ScanConfig {
    /// Scan timeout
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load the configured catalog, or the built-in one
    ///
    /// # Errors
    /// Any [`CatalogError`] from [`Catalog::load`]
    pub fn catalog(&self) -> Result<Catalog, CatalogError> {
        match &self.catalog_path {
            Some(path) => Catalog::load(path),
            None => Ok(Catalog::standard()),
        }
    }
}

/// Backend answering from a rule catalog after a simulated delay
#[derive(Debug, Clone)]
pub struct CatalogBackend {
    catalog: Arc<Catalog>,
    image_delay: Duration,
    reference_delay: Duration,
}

impl CatalogBackend {
    /// Create backend with no delay
    #[must_use]
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            image_delay: Duration::ZERO,
            reference_delay: Duration::ZERO,
        }
    }

    /// Set simulated processing delays
    #[must_use]
    pub fn with_delays(mut self, image: Duration, reference: Duration) -> Self {
        self.image_delay = image;
        self.reference_delay = reference;
        self
    }

    /// Backing catalog
    #[inline]
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}

#[async_trait::async_trait]
impl ScanBackend for CatalogBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn analyze(&self, attachment: &Attachment) -> Result<Vec<Finding>, ScanError> {
        let kind = attachment.kind();
        let delay = match kind {
            AttachmentKind::Image => self.image_delay,
            AttachmentKind::Reference => self.reference_delay,
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(self.catalog.findings_for(kind))
    }
}

/// Placeholder for an external analyzer
///
/// Always reports itself unavailable so callers exercise the error path.
#[derive(Debug, Clone, Default)]
pub struct RemoteBackend {
    endpoint: Option<String>,
}

impl RemoteBackend {
    /// Create placeholder for an endpoint
    #[must_use]
    pub fn new(endpoint: Option<String>) -> Self {
        Self { endpoint }
    }
}

#[async_trait::async_trait]
impl ScanBackend for RemoteBackend {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn analyze(&self, attachment: &Attachment) -> Result<Vec<Finding>, ScanError> {
        tracing::warn!(
            endpoint = self.endpoint.as_deref().unwrap_or("<unset>"),
            key = %attachment.key(),
            "remote analyzer requested but not available"
        );
        Err(ScanError::BackendUnavailable {
            backend: self.name().to_string(),
            reason: match &self.endpoint {
                Some(endpoint) => format!("no client for {endpoint}"),
                None => "no endpoint configured".to_string(),
            },
        })
    }
}

/// Build the configured backend
///
/// # Errors
/// Any [`CatalogError`] while loading a configured catalog
pub fn backend_from_config(config: &ScanConfig) -> Result<Arc<dyn ScanBackend>, CatalogError> {
    Ok(backend_with_catalog(config, Arc::new(config.catalog()?)))
}

/// Build the configured backend over an already loaded catalog
///
/// `config.catalog_path` is not read again.
#[must_use]
pub fn backend_with_catalog(config: &ScanConfig, catalog: Arc<Catalog>) -> Arc<dyn ScanBackend> {
    let backend: Arc<dyn ScanBackend> = match config.backend {
        BackendKind::Mock => Arc::new(CatalogBackend::new(catalog).with_delays(
            Duration::from_millis(config.mock_delay_ms),
            Duration::from_millis(config.reference_delay_ms),
        )),
        BackendKind::Remote => Arc::new(RemoteBackend::new(config.endpoint.clone())),
    };
    tracing::debug!(backend = backend.name(), "scan backend selected");
    backend
}
