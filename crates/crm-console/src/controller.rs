//! View controller for one record screen.
//!
//! Owns the collection cache and criteria for a record kind, talks to the
//! store, and republishes the derived view after every change.
//!
//! ## Reactive State
//!
//! The controller broadcasts a [`ViewSnapshot`] via `tokio::sync::watch`.
//! Every method that changes state also publishes; callers cannot mutate
//! without notifying subscribers.
//!
//! ## Concurrency
//!
//! Methods take `&self`. State sits behind a `parking_lot::Mutex` that is
//! never held across an `.await`, so criteria changes interleave with an
//! in-flight fetch and recompute against whatever is cached at that moment.
//! Fetches are serialized: a refresh requested while one is outstanding is
//! skipped.

use crm_core::{CriteriaError, Record, RecordId, RecordKind, SortKey, TransportError};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

use crate::model::{CollectionCache, CriteriaState, ViewPhase, ViewSnapshot};
use crate::store::RecordStore;

// =============================================================================
// Capabilities
// =============================================================================

/// Asks the user to confirm a destructive action.
#[cfg_attr(test, mockall::automock)]
pub trait Confirm: Send + Sync {
    fn confirm(&self, message: &str) -> bool;
}

/// Receives failures that do not change controller state.
#[cfg_attr(test, mockall::automock)]
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: &Diagnostic);
}

/// A store failure caught at the controller boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    FetchFailed {
        kind: RecordKind,
        error: TransportError,
    },
    DeleteFailed {
        kind: RecordKind,
        id: RecordId,
        error: TransportError,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::FetchFailed { kind, error } => {
                write!(f, "Error fetching {} records: {}", kind, error)
            }
            Diagnostic::DeleteFailed { kind, id, error } => {
                write!(f, "Error deleting {} {}: {}", kind, id, error)
            }
        }
    }
}

/// Default sink: logs through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: &Diagnostic) {
        tracing::error!("{}", diagnostic);
    }
}

// =============================================================================
// Outcomes
// =============================================================================

/// Result of a refresh request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Collection replaced with this many records.
    Loaded(usize),
    /// Fetch failed; previous collection kept.
    Failed,
    /// Another fetch was already in flight.
    Skipped,
}

/// Result of a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Store confirmed; record removed from the cache if it was there.
    Deleted,
    /// User declined the confirmation.
    Cancelled,
    /// Store rejected or was unreachable; nothing changed.
    Failed,
}

// =============================================================================
// View Controller
// =============================================================================

struct Inner<R> {
    phase: ViewPhase,
    cache: CollectionCache<R>,
    criteria: CriteriaState,
    fetch_in_flight: bool,
}

/// Orchestrates fetch, delete, and criteria changes for one record kind.
pub struct ViewController<R: Record> {
    store: Arc<dyn RecordStore<R>>,
    confirm: Arc<dyn Confirm>,
    sink: Arc<dyn DiagnosticSink>,
    inner: Mutex<Inner<R>>,
    tx: watch::Sender<ViewSnapshot<R>>,
}

impl<R: Record> ViewController<R> {
    /// Create an idle controller. Nothing is fetched until [`activate`].
    ///
    /// [`activate`]: ViewController::activate
    pub fn new(
        store: Arc<dyn RecordStore<R>>,
        confirm: Arc<dyn Confirm>,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Self {
        let (tx, _rx) = watch::channel(ViewSnapshot::idle());
        Self {
            store,
            confirm,
            sink,
            inner: Mutex::new(Inner {
                phase: ViewPhase::Idle,
                cache: CollectionCache::new(),
                criteria: CriteriaState::new(R::descriptor()),
                fetch_in_flight: false,
            }),
            tx,
        }
    }

    /// Subscribe to snapshot changes.
    ///
    /// The receiver sees the current snapshot immediately and every later one.
    pub fn subscribe(&self) -> watch::Receiver<ViewSnapshot<R>> {
        self.tx.subscribe()
    }

    /// Get a copy of the latest snapshot.
    pub fn snapshot(&self) -> ViewSnapshot<R> {
        self.tx.borrow().clone()
    }

    pub fn phase(&self) -> ViewPhase {
        self.inner.lock().phase
    }

    // =========================================================================
    // Fetch
    // =========================================================================

    /// Mount the screen: enter `Loading` and fetch the collection.
    pub async fn activate(&self) -> FetchOutcome {
        tracing::debug!("Activating {} screen", R::descriptor().label);
        self.refresh().await
    }

    /// Refetch the collection.
    ///
    /// On failure the cached collection is kept and a diagnostic is
    /// reported. Either way the controller settles in `Ready`.
    pub async fn refresh(&self) -> FetchOutcome {
        {
            let mut inner = self.inner.lock();
            if inner.fetch_in_flight {
                tracing::debug!(
                    "Fetch of {} already in flight, skipping",
                    R::descriptor().label
                );
                return FetchOutcome::Skipped;
            }
            inner.fetch_in_flight = true;
            inner.phase = ViewPhase::Loading;
            self.publish(&inner);
        }

        // Settles the fetch even if this future is dropped mid-await.
        let _settle = SettleFetch { controller: self };

        match self.store.fetch_all().await {
            Ok(records) => {
                let count = records.len();
                self.inner.lock().cache.replace(records);
                tracing::info!("Loaded {} {}", count, R::descriptor().label);
                FetchOutcome::Loaded(count)
            }
            Err(error) => {
                self.sink.report(&Diagnostic::FetchFailed {
                    kind: R::descriptor().kind,
                    error,
                });
                FetchOutcome::Failed
            }
        }
    }

    // =========================================================================
    // Delete
    // =========================================================================

    /// Delete a record after the user confirms.
    ///
    /// The cache changes only after the store confirms. Deleting an id that
    /// is not cached is not an error.
    pub async fn delete(&self, id: &RecordId) -> DeleteOutcome {
        let descriptor = R::descriptor();
        if !self.confirm.confirm(descriptor.delete_prompt) {
            tracing::debug!("Delete of {} {} cancelled", descriptor.kind, id);
            return DeleteOutcome::Cancelled;
        }

        match self.store.delete_by_id(id).await {
            Ok(()) => {
                let mut inner = self.inner.lock();
                if !inner.cache.remove_by_id(id) {
                    tracing::debug!("Deleted {} {} was not cached", descriptor.kind, id);
                }
                if !inner.fetch_in_flight {
                    inner.phase = ViewPhase::Ready;
                }
                self.publish(&inner);
                tracing::info!("Deleted {} {}", descriptor.kind, id);
                DeleteOutcome::Deleted
            }
            Err(error) => {
                self.sink.report(&Diagnostic::DeleteFailed {
                    kind: descriptor.kind,
                    id: id.clone(),
                    error,
                });
                DeleteOutcome::Failed
            }
        }
    }

    // =========================================================================
    // Criteria (recompute, never fetch)
    // =========================================================================

    pub fn set_search_term(&self, text: impl Into<String>) {
        let text = text.into();
        self.mutate(move |c| c.set_search_term(text));
    }

    pub fn set_filter(&self, name: &str, value: &str) -> Result<(), CriteriaError> {
        self.try_mutate(|c| c.set_filter(name, value))
    }

    pub fn set_sort(&self, key: SortKey) -> Result<(), CriteriaError> {
        self.try_mutate(|c| c.set_sort(key))
    }

    /// Reset search, filters, and sort in one step.
    pub fn clear_filters(&self) {
        self.mutate(CriteriaState::clear);
    }

    /// Apply a criteria mutation and republish.
    fn mutate<F>(&self, f: F)
    where
        F: FnOnce(&mut CriteriaState),
    {
        let mut inner = self.inner.lock();
        f(&mut inner.criteria);
        self.publish(&inner);
    }

    /// Apply a validated criteria mutation. Rejected mutations change and
    /// publish nothing.
    fn try_mutate<F>(&self, f: F) -> Result<(), CriteriaError>
    where
        F: FnOnce(&mut CriteriaState) -> Result<(), CriteriaError>,
    {
        let mut inner = self.inner.lock();
        f(&mut inner.criteria)?;
        self.publish(&inner);
        Ok(())
    }

    // =========================================================================
    // Internal Helpers
    // =========================================================================

    /// Recompute the derived view and broadcast it.
    fn publish(&self, inner: &Inner<R>) {
        let criteria = inner.criteria.current().clone();
        let visible = crm_query::query(inner.cache.records(), &criteria);
        tracing::debug!(
            "Recomputed {} view: {} of {}",
            R::descriptor().label,
            visible.len(),
            inner.cache.len()
        );
        self.tx.send_replace(ViewSnapshot {
            phase: inner.phase,
            visible,
            total: inner.cache.len(),
            criteria,
            descriptor: R::descriptor(),
        });
    }
}

/// Clears the in-flight flag and settles into `Ready` when a fetch ends.
struct SettleFetch<'a, R: Record> {
    controller: &'a ViewController<R>,
}

impl<R: Record> Drop for SettleFetch<'_, R> {
    fn drop(&mut self) {
        let mut inner = self.controller.inner.lock();
        inner.fetch_in_flight = false;
        inner.phase = ViewPhase::Ready;
        self.controller.publish(&inner);
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mock::MockStore;
    use crm_core::{BookingRecord, ConsultationRecord, Criteria, Field};
    use std::time::Duration;

    fn consultation(id: &str, name: &str, created_at: &str) -> ConsultationRecord {
        ConsultationRecord {
            id: id.into(),
            name: Some(name.to_string()),
            duration: Some("1-3 years".to_string()),
            created_at: Some(created_at.to_string()),
            ..Default::default()
        }
    }

    fn sample() -> Vec<ConsultationRecord> {
        vec![
            consultation("1", "Asha", "2024-01-01"),
            consultation("2", "Ben", "2024-06-01"),
            consultation("3", "Cara", "2024-03-01"),
        ]
    }

    fn confirming(answer: bool) -> MockConfirm {
        let mut confirm = MockConfirm::new();
        confirm.expect_confirm().returning(move |_| answer);
        confirm
    }

    fn silent_sink() -> MockDiagnosticSink {
        let mut sink = MockDiagnosticSink::new();
        sink.expect_report().never();
        sink
    }

    fn controller<R: Record>(
        store: Arc<MockStore<R>>,
        confirm: MockConfirm,
        sink: MockDiagnosticSink,
    ) -> ViewController<R> {
        ViewController::new(store, Arc::new(confirm), Arc::new(sink))
    }

    fn visible_ids<R: Record>(snapshot: &ViewSnapshot<R>) -> Vec<String> {
        snapshot
            .visible
            .iter()
            .map(|r| r.id().as_ref().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_starts_idle() {
        let store = Arc::new(MockStore::<ConsultationRecord>::new());
        let controller = controller(store.clone(), confirming(true), silent_sink());

        assert_eq!(controller.phase(), ViewPhase::Idle);
        assert_eq!(controller.snapshot().phase, ViewPhase::Idle);
        assert_eq!(store.fetch_calls(), 0);
    }

    #[tokio::test]
    async fn test_activate_loads_and_publishes() {
        let store = Arc::new(MockStore::new().with_records(sample()));
        let controller = controller(store, confirming(true), silent_sink());
        let rx = controller.subscribe();

        assert_eq!(controller.activate().await, FetchOutcome::Loaded(3));

        let snapshot = rx.borrow().clone();
        assert_eq!(snapshot.phase, ViewPhase::Ready);
        assert_eq!(snapshot.total, 3);
        assert_eq!(visible_ids(&snapshot), ["2", "3", "1"]);
        assert_eq!(snapshot.summary(), "Showing 3 of 3 consultations");
    }

    #[tokio::test]
    async fn test_loading_while_fetch_in_flight() {
        let store = Arc::new(
            MockStore::new()
                .with_records(sample())
                .with_delay(Duration::from_millis(20)),
        );
        let controller = controller(store, confirming(true), silent_sink());

        let (outcome, phase_during) = tokio::join!(controller.activate(), async {
            controller.snapshot().phase
        });

        assert_eq!(phase_during, ViewPhase::Loading);
        assert_eq!(outcome, FetchOutcome::Loaded(3));
        assert_eq!(controller.phase(), ViewPhase::Ready);
    }

    #[tokio::test]
    async fn test_first_fetch_failure_settles_ready_and_empty() {
        let store = Arc::new(MockStore::<ConsultationRecord>::new());
        store.fail_fetch(TransportError::Status {
            url: "http://test/api/consultations".to_string(),
            status: 503,
        });
        let mut sink = MockDiagnosticSink::new();
        sink.expect_report()
            .withf(|d| matches!(d, Diagnostic::FetchFailed { kind: RecordKind::Consultation, .. }))
            .times(1)
            .return_const(());
        let controller = controller(store, confirming(true), sink);

        assert_eq!(controller.activate().await, FetchOutcome::Failed);

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.phase, ViewPhase::Ready);
        assert_eq!(snapshot.total, 0);
        assert!(snapshot.visible.is_empty());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_last_good_collection() {
        let store = Arc::new(MockStore::new().with_records(sample()));
        let mut sink = MockDiagnosticSink::new();
        sink.expect_report().times(1).return_const(());
        let controller = controller(store.clone(), confirming(true), sink);

        controller.activate().await;
        store.fail_fetch(TransportError::Unreachable {
            url: "http://test/api/consultations".to_string(),
            message: "connection refused".to_string(),
        });

        assert_eq!(controller.refresh().await, FetchOutcome::Failed);
        assert_eq!(visible_ids(&controller.snapshot()), ["2", "3", "1"]);
    }

    #[tokio::test]
    async fn test_refresh_replaces_wholesale() {
        let store = Arc::new(MockStore::new().with_records(sample()));
        let controller = controller(store.clone(), confirming(true), silent_sink());
        controller.activate().await;

        *store.records.lock() = vec![consultation("9", "Zed", "2025-01-01")];
        assert_eq!(controller.refresh().await, FetchOutcome::Loaded(1));
        assert_eq!(visible_ids(&controller.snapshot()), ["9"]);
    }

    #[tokio::test]
    async fn test_concurrent_refresh_is_skipped() {
        let store = Arc::new(
            MockStore::new()
                .with_records(sample())
                .with_delay(Duration::from_millis(20)),
        );
        let controller = controller(store.clone(), confirming(true), silent_sink());

        let (first, second) = tokio::join!(controller.refresh(), controller.refresh());

        assert_eq!(first, FetchOutcome::Loaded(3));
        assert_eq!(second, FetchOutcome::Skipped);
        assert_eq!(store.fetch_calls(), 1);
    }

    #[tokio::test]
    async fn test_criteria_change_during_fetch_recomputes_both_times() {
        let store = Arc::new(
            MockStore::new()
                .with_records(sample())
                .with_delay(Duration::from_millis(20)),
        );
        let controller = controller(store.clone(), confirming(true), silent_sink());
        controller.activate().await;

        *store.records.lock() = vec![
            consultation("4", "Asha Rao", "2025-02-01"),
            consultation("5", "Dev", "2025-03-01"),
        ];

        let (outcome, during) = tokio::join!(controller.refresh(), async {
            controller.set_search_term("asha");
            controller.snapshot()
        });

        // Mid-fetch: new criteria against the old cache.
        assert_eq!(during.phase, ViewPhase::Loading);
        assert_eq!(visible_ids(&during), ["1"]);

        // Settled: same criteria against the new cache.
        assert_eq!(outcome, FetchOutcome::Loaded(2));
        let settled = controller.snapshot();
        assert_eq!(settled.criteria.search_term, "asha");
        assert_eq!(visible_ids(&settled), ["4"]);
    }

    #[tokio::test]
    async fn test_dropped_fetch_does_not_wedge() {
        let store = Arc::new(
            MockStore::new()
                .with_records(sample())
                .with_delay(Duration::from_millis(50)),
        );
        let controller = controller(store.clone(), confirming(true), silent_sink());

        let timed_out =
            tokio::time::timeout(Duration::from_millis(5), controller.refresh()).await;
        assert!(timed_out.is_err());
        assert_eq!(controller.phase(), ViewPhase::Ready);

        assert_eq!(controller.refresh().await, FetchOutcome::Loaded(3));
        assert_eq!(store.fetch_calls(), 2);
    }

    #[tokio::test]
    async fn test_criteria_changes_never_fetch() {
        let store = Arc::new(MockStore::new().with_records(sample()));
        let controller = controller(store.clone(), confirming(true), silent_sink());
        controller.activate().await;

        controller.set_search_term("a");
        controller.set_sort(SortKey::Name).unwrap();
        controller.set_filter("duration", "1-3 years").unwrap();
        controller.clear_filters();

        assert_eq!(store.fetch_calls(), 1);
    }

    #[tokio::test]
    async fn test_criteria_mutations_publish() {
        let store = Arc::new(MockStore::new().with_records(sample()));
        let controller = controller(store, confirming(true), silent_sink());
        controller.activate().await;

        controller.set_sort(SortKey::Name).unwrap();
        assert_eq!(visible_ids(&controller.snapshot()), ["1", "2", "3"]);

        controller.set_search_term("CARA");
        assert_eq!(visible_ids(&controller.snapshot()), ["3"]);

        controller.set_filter("duration", "0-6 months").unwrap();
        let snapshot = controller.snapshot();
        assert!(snapshot.visible.is_empty());
        assert_eq!(
            snapshot.empty_message(),
            "No consultations found. Try adjusting your search."
        );

        controller.clear_filters();
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.criteria, Criteria::default());
        assert_eq!(visible_ids(&snapshot), ["2", "3", "1"]);
    }

    #[tokio::test]
    async fn test_rejected_criteria_change_keeps_state() {
        let store = Arc::new(MockStore::new().with_records(sample()));
        let controller = controller(store, confirming(true), silent_sink());
        controller.activate().await;
        controller.set_search_term("ben");

        assert!(controller.set_sort(SortKey::Package).is_err());
        assert!(controller.set_filter("package", "Basic").is_err());

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.criteria.sort, SortKey::Newest);
        assert_eq!(visible_ids(&snapshot), ["2"]);
    }

    #[tokio::test]
    async fn test_only_accepted_criteria_changes_publish() {
        let store = Arc::new(MockStore::new().with_records(sample()));
        let controller = controller(store, confirming(true), silent_sink());
        controller.activate().await;
        let mut rx = controller.subscribe();
        rx.borrow_and_update();

        assert!(controller.set_sort(SortKey::Package).is_err());
        assert!(controller.set_filter("duration", "forever").is_err());
        assert!(!rx.has_changed().unwrap());

        controller.set_search_term("ben");
        assert!(rx.has_changed().unwrap());
        assert_eq!(visible_ids(&rx.borrow_and_update()), ["2"]);

        controller.clear_filters();
        assert!(rx.has_changed().unwrap());
        assert_eq!(visible_ids(&rx.borrow_and_update()), ["2", "3", "1"]);
    }

    #[tokio::test]
    async fn test_delete_confirmed() {
        let store = Arc::new(MockStore::new().with_records(sample()));
        let mut confirm = MockConfirm::new();
        confirm
            .expect_confirm()
            .withf(|message| message == "Are you sure you want to delete this record?")
            .times(1)
            .return_const(true);
        let controller = controller(store.clone(), confirm, silent_sink());
        controller.activate().await;

        assert_eq!(controller.delete(&"3".into()).await, DeleteOutcome::Deleted);

        let snapshot = controller.snapshot();
        assert_eq!(visible_ids(&snapshot), ["2", "1"]);
        assert_eq!(snapshot.total, 2);
        assert_eq!(store.records.lock().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_cancelled_skips_store() {
        let store = Arc::new(MockStore::new().with_records(sample()));
        let controller = controller(store.clone(), confirming(false), silent_sink());
        controller.activate().await;

        assert_eq!(controller.delete(&"1".into()).await, DeleteOutcome::Cancelled);
        assert_eq!(store.delete_calls(), 0);
        assert_eq!(controller.snapshot().total, 3);
    }

    #[tokio::test]
    async fn test_delete_failure_leaves_collection() {
        let store = Arc::new(MockStore::new().with_records(sample()));
        store.fail_delete(TransportError::Status {
            url: "http://test/api/consultations/1".to_string(),
            status: 500,
        });
        let mut sink = MockDiagnosticSink::new();
        sink.expect_report()
            .withf(|d| matches!(d, Diagnostic::DeleteFailed { id, .. } if id.as_ref() == "1"))
            .times(1)
            .return_const(());
        let controller = controller(store, confirming(true), sink);
        controller.activate().await;
        let before = controller.snapshot();

        assert_eq!(controller.delete(&"1".into()).await, DeleteOutcome::Failed);

        let after = controller.snapshot();
        assert_eq!(visible_ids(&after), visible_ids(&before));
        assert_eq!(after.total, 3);
    }

    #[tokio::test]
    async fn test_delete_unknown_id_is_noop() {
        let store = Arc::new(MockStore::new().with_records(sample()));
        let controller = controller(store, confirming(true), silent_sink());
        controller.activate().await;
        let before = controller.snapshot();

        assert_eq!(controller.delete(&"stale".into()).await, DeleteOutcome::Deleted);

        let after = controller.snapshot();
        assert_eq!(visible_ids(&after), visible_ids(&before));
        assert_eq!(after.total, before.total);
    }

    #[tokio::test]
    async fn test_deleted_id_never_reappears_in_view() {
        let records: Vec<BookingRecord> = (0..5)
            .map(|i| BookingRecord {
                id: format!("b{}", i).into(),
                name: Some(format!("Name {}", i)),
                package_booked: Some(["Basic", "Premium"][i % 2].to_string()),
                ..Default::default()
            })
            .collect();
        let store = Arc::new(MockStore::new().with_records(records));
        let controller = controller(store, confirming(true), silent_sink());
        controller.activate().await;
        controller.set_sort(SortKey::Package).unwrap();

        controller.delete(&"b2".into()).await;

        let snapshot = controller.snapshot();
        assert_eq!(visible_ids(&snapshot), ["b0", "b4", "b1", "b3"]);
        assert!(snapshot
            .visible
            .iter()
            .all(|r| r.field(Field::Name) != Some("Name 2")));
    }
}
