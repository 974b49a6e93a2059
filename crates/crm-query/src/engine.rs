//! Query entry points.

use crm_core::{Criteria, Record};

use crate::ordering::compare;
use crate::predicate::{matches_filters, matches_search};

/// Check whether a record passes the search and every categorical filter.
pub fn matches<R: Record>(record: &R, criteria: &Criteria) -> bool {
    matches_search(record, &criteria.search_term) && matches_filters(record, criteria)
}

/// Derive the visible records for a collection under the given criteria.
///
/// Filtering keeps store order; the sort is stable, so records with equal
/// (or equally absent) keys keep their relative order.
pub fn query<R: Record>(collection: &[R], criteria: &Criteria) -> Vec<R> {
    let mut visible: Vec<R> = collection
        .iter()
        .filter(|record| matches(*record, criteria))
        .cloned()
        .collect();
    visible.sort_by(|a, b| compare(a, b, criteria.sort));
    visible
}
