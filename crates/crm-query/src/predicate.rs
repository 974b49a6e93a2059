//! Search and categorical predicates.

use crm_core::{CaseMode, Criteria, Record};

/// Free-text search over the kind's searchable fields.
///
/// An empty term matches everything. Absent fields never match.
pub(crate) fn matches_search<R: Record>(record: &R, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }

    let folded = term.to_lowercase();
    R::descriptor().searchable.iter().any(|search| {
        record.field(search.field).is_some_and(|value| match search.case {
            CaseMode::Sensitive => value.contains(term),
            CaseMode::Insensitive => value.to_lowercase().contains(&folded),
        })
    })
}

/// Every categorical filter the kind declares must pass.
pub(crate) fn matches_filters<R: Record>(record: &R, criteria: &Criteria) -> bool {
    R::descriptor()
        .filters
        .iter()
        .all(|spec| criteria.filter(spec.name).matches(record.field(spec.field)))
}
