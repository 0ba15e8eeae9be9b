//! In-memory report store
//!
//! Keeps every report created during the session, most recent first, plus a
//! single "currently viewed" pointer. All mutations happen under one write
//! lock, so the viewed pointer can only ever name a report in the collection.
//! Subscribers receive a [`StoreEvent`] after each mutation.

use crate::error::StoreError;
use crate::report::{Report, ReportId};
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;

/// Default grace period after closing the viewer
pub const DEFAULT_CLOSE_GRACE: Duration = Duration::from_millis(300);

const EVENT_CAPACITY: usize = 64;

/// Store configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// How long a closed report stays reachable through [`ReportStore::lingering`]
    pub close_grace_ms: u64,
    /// Start with the demo reports
    pub seed_demo: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            close_grace_ms: 300,
            seed_demo: false,
        }
    }
}

/// Store mutation notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    /// A report was inserted
    Added(ReportId),
    /// A report became the viewed one
    Opened(ReportId),
    /// The viewer was closed
    Closed(ReportId),
}

#[derive(Debug, Default)]
struct StoreState {
    /// Most recent first
    reports: IndexMap<ReportId, Report>,
    viewed: Option<ReportId>,
    lingering: Option<(ReportId, Instant)>,
}

impl StoreState {
    /// Insert at the front unless present; returns the stored report and
    /// whether it was inserted
    fn insert_front(&mut self, report: Report) -> (Report, bool) {
        let id = report.id();
        if let Some(existing) = self.reports.get(&id) {
            return (existing.clone(), false);
        }
        self.reports.shift_insert(0, id, report.clone());
        (report, true)
    }
}

#[derive(Debug)]
struct StoreInner {
    state: RwLock<StoreState>,
    events: broadcast::Sender<StoreEvent>,
    grace: Duration,
}

/// Shared handle to the report collection
///
/// Clones share the same collection; create one per application.
#[derive(Debug, Clone)]
pub struct ReportStore {
    inner: Arc<StoreInner>,
}

impl ReportStore {
    /// Create empty store with the default grace period
    #[must_use]
    pub fn new() -> Self {
        Self::with_grace(DEFAULT_CLOSE_GRACE)
    }

    /// Create empty store with a custom grace period
    #[must_use]
    pub fn with_grace(grace: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(StoreInner {
                state: RwLock::new(StoreState::default()),
                events,
                grace,
            }),
        }
    }

    /// Create store from configuration, seeding demo reports if asked
    #[must_use]
    pub fn from_config(config: &StoreConfig) -> Self {
        let store = Self::with_grace(Duration::from_millis(config.close_grace_ms));
        if config.seed_demo {
            if let Err(e) = crate::demo::seed(&store) {
                tracing::warn!(error = %e, "demo reports not seeded");
            }
        }
        store
    }

    /// Subscribe to mutation events
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.inner.events.subscribe()
    }

    fn emit(&self, event: StoreEvent) {
        // No receivers is fine
        let _ = self.inner.events.send(event);
    }

    /// Mark a report as viewed
    ///
    /// Unknown ids are a no-op: nothing becomes visible and the current
    /// viewed pointer is kept.
    pub fn open(&self, id: &ReportId) -> Option<Report> {
        let report = {
            let mut state = self.inner.state.write();
            let report = state.reports.get(id).cloned()?;
            state.viewed = Some(*id);
            state.lingering = None;
            report
        };
        tracing::debug!(report = %id, "report opened");
        self.emit(StoreEvent::Opened(*id));
        Some(report)
    }

    /// Insert a report if its id is new, then view it
    ///
    /// Returns the stored report, which is the existing one when the id was
    /// already present.
    pub fn open_with_data(&self, report: Report) -> Report {
        let id = report.id();
        let (stored, added) = {
            let mut state = self.inner.state.write();
            let inserted = state.insert_front(report);
            state.viewed = Some(id);
            state.lingering = None;
            inserted
        };
        if added {
            tracing::info!(report = %id, "report added");
            self.emit(StoreEvent::Added(id));
        }
        self.emit(StoreEvent::Opened(id));
        stored
    }

    /// Clear the viewed pointer
    ///
    /// The closed report stays reachable through [`ReportStore::lingering`]
    /// for the grace period. Nothing is spawned or awaited.
    pub fn close(&self) {
        let closed = {
            let mut state = self.inner.state.write();
            let closed = state.viewed.take();
            if let Some(id) = closed {
                state.lingering = Some((id, Instant::now()));
            }
            closed
        };
        if let Some(id) = closed {
            tracing::debug!(report = %id, "report closed");
            self.emit(StoreEvent::Closed(id));
        }
    }

    /// Insert a report without touching the viewed pointer
    ///
    /// # Errors
    /// `StoreError::DuplicateId` if the id is already present
    pub fn add(&self, report: Report) -> Result<(), StoreError> {
        let id = report.id();
        let (_, added) = self.inner.state.write().insert_front(report);
        if !added {
            return Err(StoreError::DuplicateId(id));
        }
        tracing::info!(report = %id, "report added");
        self.emit(StoreEvent::Added(id));
        Ok(())
    }

    /// Report by id
    #[must_use]
    pub fn get(&self, id: &ReportId) -> Option<Report> {
        self.inner.state.read().reports.get(id).cloned()
    }

    /// Whether the id is present
    #[must_use]
    pub fn contains(&self, id: &ReportId) -> bool {
        self.inner.state.read().reports.contains_key(id)
    }

    /// Currently viewed report
    #[must_use]
    pub fn viewed(&self) -> Option<Report> {
        let state = self.inner.state.read();
        state.viewed.and_then(|id| state.reports.get(&id).cloned())
    }

    /// Id of the currently viewed report
    #[must_use]
    pub fn viewed_id(&self) -> Option<ReportId> {
        self.inner.state.read().viewed
    }

    /// Whether a report is being viewed
    #[must_use]
    pub fn is_viewer_open(&self) -> bool {
        self.inner.state.read().viewed.is_some()
    }

    /// Recently closed report, while its grace period lasts
    #[must_use]
    pub fn lingering(&self) -> Option<Report> {
        let state = self.inner.state.read();
        let (id, closed_at) = state.lingering?;
        if closed_at.elapsed() >= self.inner.grace {
            return None;
        }
        state.reports.get(&id).cloned()
    }

    /// The `n` most recent reports
    #[must_use]
    pub fn recent(&self, n: usize) -> Vec<Report> {
        self.inner
            .state
            .read()
            .reports
            .values()
            .take(n)
            .cloned()
            .collect()
    }

    /// All reports, most recent first
    #[must_use]
    pub fn all(&self) -> Vec<Report> {
        self.inner.state.read().reports.values().cloned().collect()
    }

    /// Number of reports
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.state.read().reports.len()
    }

    /// Whether the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.state.read().reports.is_empty()
    }
}

impl Default for ReportStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::Aggregator;
    use brandscan_artifact::{AttachmentDescriptor, AttachmentKind, ContentHash};
    use brandscan_scan::Catalog;

    fn make_report(store: &ReportStore, name: &str) -> Report {
        Aggregator::new(store.clone())
            .aggregate(
                AttachmentDescriptor::Image {
                    name: name.into(),
                    mime: "image/png".into(),
                    size: 3,
                    hash: ContentHash::compute(name.as_bytes()),
                },
                Catalog::standard().findings_for(AttachmentKind::Image),
            )
            .unwrap()
    }

    #[test]
    fn open_with_data_then_open() {
        let store = ReportStore::new();
        let report = make_report(&store, "a.png");
        let id = report.id();

        store.open_with_data(report);
        store.close();
        assert!(store.viewed().is_none());

        let opened = store.open(&id).unwrap();
        assert_eq!(opened.id(), id);
        assert_eq!(store.viewed_id(), Some(id));
    }

    #[test]
    fn open_unknown_is_a_noop() {
        let store = ReportStore::new();
        let report = make_report(&store, "a.png");
        let id = report.id();
        store.open_with_data(report);

        assert!(store.open(&ReportId::new()).is_none());
        assert_eq!(store.viewed_id(), Some(id));
    }

    #[test]
    fn add_keeps_viewed_pointer_and_rejects_duplicates() {
        let store = ReportStore::new();
        let first = make_report(&store, "a.png");
        let second = make_report(&store, "b.png");
        store.open_with_data(first.clone());

        store.add(second.clone()).unwrap();
        assert_eq!(store.viewed_id(), Some(first.id()));
        assert_eq!(store.add(second.clone()), Err(StoreError::DuplicateId(second.id())));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn recency_order_is_most_recent_first() {
        let store = ReportStore::new();
        let a = make_report(&store, "a.png");
        let b = make_report(&store, "b.png");
        let c = make_report(&store, "c.png");
        store.add(a.clone()).unwrap();
        store.open_with_data(b.clone());
        store.add(c.clone()).unwrap();
        // Re-opening an existing report does not move it
        store.open_with_data(a.clone());

        let ids: Vec<_> = store.recent(2).iter().map(Report::id).collect();
        assert_eq!(ids, [c.id(), b.id()]);
        assert_eq!(store.all().len(), 3);
    }

    #[test]
    fn close_lingers_for_grace_period_only() {
        let store = ReportStore::with_grace(Duration::from_secs(60));
        let report = make_report(&store, "a.png");
        let id = report.id();
        store.open_with_data(report);
        store.close();
        assert_eq!(store.lingering().map(|r| r.id()), Some(id));
        assert!(!store.is_viewer_open());

        // Opening clears the lingering report immediately
        store.open(&id);
        assert!(store.lingering().is_none());

        let instant = ReportStore::with_grace(Duration::ZERO);
        let report = make_report(&instant, "b.png");
        instant.open_with_data(report);
        instant.close();
        assert!(instant.lingering().is_none());
    }

    #[test]
    fn events_are_published() {
        let store = ReportStore::new();
        let mut events = store.subscribe();
        let report = make_report(&store, "a.png");
        let id = report.id();

        store.open_with_data(report);
        store.close();
        store.close();

        assert_eq!(events.try_recv().unwrap(), StoreEvent::Added(id));
        assert_eq!(events.try_recv().unwrap(), StoreEvent::Opened(id));
        assert_eq!(events.try_recv().unwrap(), StoreEvent::Closed(id));
        assert!(events.try_recv().is_err());
    }
}
