//! Scan engine
//!
//! Wraps a [`ScanBackend`] with the guarantees callers rely on:
//! - at most one scan in flight per attachment
//! - a hard timeout that surfaces as a retryable error
//! - an empty answer is an error, never an empty report
//! - findings come back in stable catalog category order

use crate::backend::{backend_with_catalog, ScanBackend, ScanConfig};
use crate::catalog::Catalog;
use crate::error::{CatalogError, ScanError};
use crate::finding::Finding;
use brandscan_artifact::{Attachment, AttachmentKey};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default scan timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Scan engine
pub struct ScanEngine {
    backend: Arc<dyn ScanBackend>,
    order: Arc<Catalog>,
    timeout: Duration,
    in_flight: DashMap<AttachmentKey, Instant>,
}

impl ScanEngine {
    /// Create engine over a backend, ordering by the standard catalog
    #[must_use]
    pub fn new(backend: Arc<dyn ScanBackend>) -> Self {
        Self {
            backend,
            order: Arc::new(Catalog::standard()),
            timeout: DEFAULT_TIMEOUT,
            in_flight: DashMap::new(),
        }
    }

    /// Build engine and backend from configuration
    ///
    /// # Errors
    /// Any [`CatalogError`] while loading a configured catalog
    pub fn from_config(config: &ScanConfig) -> Result<Self, CatalogError> {
        let catalog = Arc::new(config.catalog()?);
        Ok(Self::new(backend_with_catalog(config, Arc::clone(&catalog)))
            .with_order(catalog)
            .with_timeout(config.timeout()))
    }

    /// Use a catalog's category order for sorting
    #[must_use]
    pub fn with_order(mut self, catalog: Arc<Catalog>) -> Self {
        self.order = catalog;
        self
    }

    /// Set the scan timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Backend name
    #[inline]
    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Whether a scan for this attachment is running
    #[inline]
    #[must_use]
    pub fn is_in_flight(&self, key: &AttachmentKey) -> bool {
        self.in_flight.contains_key(key)
    }

    /// Number of running scans
    #[inline]
    #[must_use]
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Scan an attachment
    ///
    /// # Returns
    /// Findings sorted by catalog category order; ties keep backend order
    ///
    /// # Errors
    /// - `ScanError::AlreadyInFlight` if this attachment is being scanned
    /// - `ScanError::Timeout` if the backend exceeds the timeout
    /// - `ScanError::NoUsableFindings` if the backend returns nothing
    /// - any error the backend reports
    pub async fn scan(&self, attachment: &Attachment) -> Result<Vec<Finding>, ScanError> {
        let key = attachment.key();
        let _guard = InFlightGuard::acquire(&self.in_flight, key.clone())?;

        tracing::info!(backend = self.backend.name(), key = %key, "scan started");
        let started = Instant::now();

        let mut findings = match tokio::time::timeout(self.timeout, self.backend.analyze(attachment)).await {
            Ok(result) => result?,
            Err(_) => {
                let timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
                tracing::warn!(key = %key, timeout_ms, "scan timed out");
                return Err(ScanError::Timeout { timeout_ms });
            }
        };

        if findings.is_empty() {
            tracing::warn!(key = %key, "backend returned no findings");
            return Err(ScanError::NoUsableFindings);
        }

        findings.sort_by_key(|f| self.order.category_rank(&f.category));

        tracing::info!(
            key = %key,
            findings = findings.len(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "scan finished"
        );
        Ok(findings)
    }
}

impl std::fmt::Debug for ScanEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanEngine")
            .field("backend", &self.backend.name())
            .field("timeout", &self.timeout)
            .field("in_flight", &self.in_flight.len())
            .finish_non_exhaustive()
    }
}

/// Removes the in-flight marker when the scan ends, however it ends
struct InFlightGuard<'a> {
    map: &'a DashMap<AttachmentKey, Instant>,
    key: AttachmentKey,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(map: &'a DashMap<AttachmentKey, Instant>, key: AttachmentKey) -> Result<Self, ScanError> {
        match map.entry(key.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                tracing::debug!(key = %key, "duplicate scan refused");
                Err(ScanError::AlreadyInFlight {
                    key: key.to_string(),
                })
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(Instant::now());
                Ok(Self { map, key })
            }
        }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.map.remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{CatalogBackend, MockScanBackend};
    use crate::finding::FindingStatus;
    use brandscan_artifact::FileValidator;

    fn upload(bytes: &[u8]) -> Attachment {
        Attachment::upload(&FileValidator::default(), "a.png", "image/png", bytes.to_vec()).unwrap()
    }

    fn finding(id: &str, category: &str) -> Finding {
        Finding::new(id, category, "t", "d", FindingStatus::Pass)
    }

    #[tokio::test]
    async fn sorts_by_category_rank_stably() {
        let mut backend = MockScanBackend::new();
        backend.expect_name().return_const("scripted");
        backend.expect_analyze().returning(|_| {
            Ok(vec![
                finding("a", "Accessibility"),
                finding("b", "Logo Usage"),
                finding("c", "Unlisted"),
                finding("d", "Accessibility"),
                finding("e", "Color"),
            ])
        });

        let engine = ScanEngine::new(Arc::new(backend));
        let ids: Vec<_> = engine
            .scan(&upload(b"x"))
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.id)
            .collect();
        assert_eq!(ids, ["b", "e", "a", "d", "c"]);
    }

    #[tokio::test]
    async fn empty_result_is_an_error() {
        let mut backend = MockScanBackend::new();
        backend.expect_name().return_const("scripted");
        backend.expect_analyze().returning(|_| Ok(Vec::new()));

        let engine = ScanEngine::new(Arc::new(backend));
        assert_eq!(engine.scan(&upload(b"x")).await, Err(ScanError::NoUsableFindings));
        assert_eq!(engine.in_flight_count(), 0);
    }

    #[tokio::test]
    async fn backend_errors_propagate_and_release_key() {
        let mut backend = MockScanBackend::new();
        backend.expect_name().return_const("scripted");
        backend
            .expect_analyze()
            .times(2)
            .returning(|_| Err(ScanError::Unreadable("corrupt".into())));

        let engine = ScanEngine::new(Arc::new(backend));
        let att = upload(b"x");
        assert!(matches!(engine.scan(&att).await, Err(ScanError::Unreadable(_))));
        assert!(!engine.is_in_flight(&att.key()));
        assert!(matches!(engine.scan(&att).await, Err(ScanError::Unreadable(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_backend_times_out() {
        let backend = CatalogBackend::new(Arc::new(Catalog::standard()))
            .with_delays(Duration::from_secs(60), Duration::from_secs(60));
        let engine = ScanEngine::new(Arc::new(backend)).with_timeout(Duration::from_secs(5));

        let err = engine.scan(&upload(b"x")).await.unwrap_err();
        assert_eq!(err, ScanError::Timeout { timeout_ms: 5000 });
        assert!(err.is_retryable());
        assert_eq!(engine.in_flight_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn second_scan_of_same_attachment_is_refused() {
        let backend = CatalogBackend::new(Arc::new(Catalog::standard()))
            .with_delays(Duration::from_secs(2), Duration::from_secs(2));
        let engine = Arc::new(ScanEngine::new(Arc::new(backend)));
        let att = upload(b"same bytes");

        let first = {
            let engine = Arc::clone(&engine);
            let att = att.clone();
            tokio::spawn(async move { engine.scan(&att).await })
        };
        tokio::task::yield_now().await;
        assert!(engine.is_in_flight(&att.key()));

        let err = engine.scan(&att).await.unwrap_err();
        assert!(matches!(err, ScanError::AlreadyInFlight { .. }));

        // A different payload is independent
        assert!(engine.scan(&upload(b"other bytes")).await.is_ok());

        assert_eq!(first.await.unwrap().unwrap().len(), 9);
        assert!(!engine.is_in_flight(&att.key()));
    }
}
