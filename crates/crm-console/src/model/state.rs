//! State model for one record screen.
//!
//! This module defines the state machine and data structures owned by the
//! view controller. These types are front-end independent to enable testing
//! and clear separation.

use crm_core::{Criteria, CriteriaError, FilterValue, KindDescriptor, Record, RecordId, SortKey};

// =============================================================================
// View Phase State Machine
// =============================================================================

/// Screen lifecycle: `Idle → Loading → Ready`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewPhase {
    /// Not activated yet, nothing fetched.
    #[default]
    Idle,
    /// A fetch is in flight.
    Loading,
    /// Holding the last good collection (possibly empty).
    Ready,
}

// =============================================================================
// Collection Cache
// =============================================================================

/// Last-known-good collection in store order.
///
/// Replaced wholesale after a fetch, shrunk by one after a confirmed delete.
/// Never merged.
#[derive(Debug, Clone)]
pub struct CollectionCache<R> {
    records: Vec<R>,
}

impl<R: Record> CollectionCache<R> {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Swap in a freshly fetched collection.
    pub fn replace(&mut self, records: Vec<R>) {
        self.records = records;
    }

    /// Remove the first record with this id.
    ///
    /// Returns false (and changes nothing) when the id is not cached, which
    /// happens when the local view is stale.
    pub fn remove_by_id(&mut self, id: &RecordId) -> bool {
        match self.records.iter().position(|r| r.id() == id) {
            Some(index) => {
                self.records.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<R: Record> Default for CollectionCache<R> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Criteria State
// =============================================================================

/// Current criteria for one record kind.
///
/// Each setter replaces exactly one field. Filter names, filter values, and
/// sort keys are checked against the kind's descriptor.
#[derive(Debug, Clone)]
pub struct CriteriaState {
    descriptor: &'static KindDescriptor,
    criteria: Criteria,
}

impl CriteriaState {
    /// Create default criteria for a kind.
    pub fn new(descriptor: &'static KindDescriptor) -> Self {
        Self {
            descriptor,
            criteria: Criteria::default(),
        }
    }

    /// Get the current criteria.
    pub fn current(&self) -> &Criteria {
        &self.criteria
    }

    pub fn set_search_term(&mut self, text: impl Into<String>) {
        self.criteria.search_term = text.into();
    }

    /// Select a filter value, or `"all"` to stop filtering on it.
    pub fn set_filter(&mut self, name: &str, value: &str) -> Result<(), CriteriaError> {
        let spec = self
            .descriptor
            .filter(name)
            .ok_or_else(|| CriteriaError::UnknownFilter {
                kind: self.descriptor.kind,
                filter: name.to_string(),
            })?;

        let value = FilterValue::from(value);
        if let FilterValue::Exact(exact) = &value {
            if !spec.accepts(exact) {
                return Err(CriteriaError::UnknownOption {
                    filter: name.to_string(),
                    value: exact.clone(),
                });
            }
        }

        self.criteria.filters.insert(spec.name.to_string(), value);
        Ok(())
    }

    pub fn set_sort(&mut self, key: SortKey) -> Result<(), CriteriaError> {
        if !self.descriptor.supports_sort(key) {
            return Err(CriteriaError::UnsupportedSort {
                kind: self.descriptor.kind,
                sort: key,
            });
        }
        self.criteria.sort = key;
        Ok(())
    }

    /// Reset every field at once.
    pub fn clear(&mut self) {
        self.criteria = Criteria::default();
    }

    /// Check if every criterion is at its default.
    pub fn is_default(&self) -> bool {
        self.criteria.is_default()
    }
}

// =============================================================================
// View Snapshot
// =============================================================================

/// What the presentation layer sees after every state change.
#[derive(Debug, Clone)]
pub struct ViewSnapshot<R> {
    pub phase: ViewPhase,
    /// Derived view: filtered and sorted records.
    pub visible: Vec<R>,
    /// Size of the cached collection.
    pub total: usize,
    pub criteria: Criteria,
    pub descriptor: &'static KindDescriptor,
}

impl<R: Record> ViewSnapshot<R> {
    /// Initial snapshot before activation.
    pub fn idle() -> Self {
        Self {
            phase: ViewPhase::Idle,
            visible: Vec::new(),
            total: 0,
            criteria: Criteria::default(),
            descriptor: R::descriptor(),
        }
    }

    /// Result-count readout, e.g. "Showing 2 of 5 bookings".
    pub fn summary(&self) -> String {
        format!(
            "Showing {} of {} {}",
            self.visible.len(),
            self.total,
            self.descriptor.label
        )
    }

    /// Whether the "clear filters" control should be offered.
    pub fn can_clear(&self) -> bool {
        !self.criteria.is_default()
    }

    /// Message for an empty derived view.
    pub fn empty_message(&self) -> String {
        let mut message = format!("No {} found.", self.descriptor.label);
        if !self.criteria.search_term.is_empty() {
            message.push_str(" Try adjusting your search.");
        }
        message
    }

    pub fn is_loading(&self) -> bool {
        self.phase == ViewPhase::Loading
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crm_core::{BookingRecord, ConsultationRecord, BOOKINGS, CONSULTATIONS};

    fn record(id: &str) -> ConsultationRecord {
        ConsultationRecord {
            id: id.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_cache_remove_by_id() {
        let mut cache = CollectionCache::new();
        cache.replace(vec![record("a"), record("b"), record("c")]);

        assert!(cache.remove_by_id(&"b".into()));
        let ids: Vec<_> = cache.records().iter().map(|r| r.id.as_ref()).collect();
        assert_eq!(ids, ["a", "c"]);
    }

    #[test]
    fn test_cache_remove_missing_is_noop() {
        let mut cache = CollectionCache::new();
        cache.replace(vec![record("a")]);

        assert!(!cache.remove_by_id(&"zzz".into()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_remove_at_most_one() {
        let mut cache = CollectionCache::new();
        cache.replace(vec![record("dup"), record("dup")]);

        assert!(cache.remove_by_id(&"dup".into()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_setters_touch_one_field() {
        let mut state = CriteriaState::new(&BOOKINGS);
        state.set_search_term("asha");
        state.set_filter("package", "Premium").unwrap();
        state.set_sort(SortKey::Package).unwrap();

        state.set_search_term("ben");
        let current = state.current();
        assert_eq!(current.search_term, "ben");
        assert_eq!(
            current.filter("package"),
            &FilterValue::Exact("Premium".to_string())
        );
        assert_eq!(current.sort, SortKey::Package);
    }

    #[test]
    fn test_clear_equals_fresh_default() {
        let mut state = CriteriaState::new(&BOOKINGS);
        state.set_search_term("x");
        state.set_filter("duration", "3-5 years").unwrap();
        state.set_filter("package", "Basic").unwrap();
        state.set_sort(SortKey::Oldest).unwrap();
        assert!(!state.is_default());

        state.clear();
        assert_eq!(state.current(), &Criteria::default());
        assert!(state.is_default());
    }

    #[test]
    fn test_rejects_package_on_consultations() {
        let mut state = CriteriaState::new(&CONSULTATIONS);
        assert_eq!(
            state.set_sort(SortKey::Package),
            Err(CriteriaError::UnsupportedSort {
                kind: CONSULTATIONS.kind,
                sort: SortKey::Package,
            })
        );
        assert!(matches!(
            state.set_filter("package", "Basic"),
            Err(CriteriaError::UnknownFilter { .. })
        ));
        assert!(state.is_default());
    }

    #[test]
    fn test_rejects_unknown_option() {
        let mut state = CriteriaState::new(&CONSULTATIONS);
        assert!(matches!(
            state.set_filter("duration", "forever"),
            Err(CriteriaError::UnknownOption { .. })
        ));
        state.set_filter("duration", "all").unwrap();
        assert!(state.is_default());
    }

    #[test]
    fn test_snapshot_readouts() {
        let mut snapshot = ViewSnapshot::<BookingRecord>::idle();
        snapshot.total = 4;
        assert_eq!(snapshot.summary(), "Showing 0 of 4 bookings");
        assert_eq!(snapshot.empty_message(), "No bookings found.");
        assert!(!snapshot.can_clear());

        snapshot.criteria.search_term = "zz".to_string();
        assert_eq!(
            snapshot.empty_message(),
            "No bookings found. Try adjusting your search."
        );
        assert!(snapshot.can_clear());
    }
}
