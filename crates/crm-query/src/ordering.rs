//! Comparator selection for each sort key.

use crm_core::{Field, Record, SortKey};
use std::cmp::Ordering;

use crate::collate::locale_cmp;

/// Compare two records under a sort key.
///
/// Absent or unparseable keys sort after present ones in both directions.
pub fn compare<R: Record>(a: &R, b: &R, key: SortKey) -> Ordering {
    match key {
        SortKey::Newest => present_first(a.created_at(), b.created_at(), |x, y| y.cmp(x)),
        SortKey::Oldest => present_first(a.created_at(), b.created_at(), |x, y| x.cmp(y)),
        SortKey::Name => text(a, b, Field::Name),
        SortKey::Package => text(a, b, Field::PackageBooked),
    }
}

fn text<R: Record>(a: &R, b: &R, field: Field) -> Ordering {
    present_first(a.field(field), b.field(field), |x, y| locale_cmp(x, y))
}

fn present_first<T, F>(a: Option<T>, b: Option<T>, cmp: F) -> Ordering
where
    F: FnOnce(&T, &T) -> Ordering,
{
    match (a, b) {
        (Some(x), Some(y)) => cmp(&x, &y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
