//! Query criteria: search text, categorical filters, and sort key.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::CriteriaError;

/// Sentinel meaning "do not filter on this field".
const ALL: &str = "all";

/// Ordering applied to the filtered records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortKey {
    /// Most recent `createdAt` first.
    #[default]
    Newest,
    /// Oldest `createdAt` first.
    Oldest,
    /// Alphabetical by name.
    Name,
    /// Alphabetical by booked package. Bookings only.
    Package,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [
        SortKey::Newest,
        SortKey::Oldest,
        SortKey::Name,
        SortKey::Package,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Newest => "newest",
            SortKey::Oldest => "oldest",
            SortKey::Name => "name",
            SortKey::Package => "package",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = CriteriaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| CriteriaError::UnknownSortKey(s.to_string()))
    }
}

/// Selection for one categorical filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum FilterValue {
    /// Match every record.
    #[default]
    All,
    /// Match records whose field equals this value exactly.
    Exact(String),
}

impl FilterValue {
    pub fn is_all(&self) -> bool {
        matches!(self, FilterValue::All)
    }

    /// Check a record's field against this selection.
    ///
    /// A record without the field never matches an exact selection.
    pub fn matches(&self, field: Option<&str>) -> bool {
        match self {
            FilterValue::All => true,
            FilterValue::Exact(expected) => field == Some(expected.as_str()),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        if s == ALL {
            FilterValue::All
        } else {
            FilterValue::Exact(s.to_string())
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::All => f.write_str(ALL),
            FilterValue::Exact(value) => f.write_str(value),
        }
    }
}

/// The user's current search, filter, and sort selection.
///
/// `Criteria::default()` is the cleared state: empty search, every filter
/// on "all", newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Criteria {
    pub search_term: String,
    /// Filter name to selection. A missing entry means [`FilterValue::All`].
    pub filters: BTreeMap<String, FilterValue>,
    pub sort: SortKey,
}

impl Criteria {
    /// Builder-style search term.
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    /// Builder-style filter selection.
    pub fn with_filter(mut self, name: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.filters.insert(name.into(), value.into());
        self
    }

    /// Builder-style sort key.
    pub fn with_sort(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }

    /// Selection for a filter.
    pub fn filter(&self, name: &str) -> &FilterValue {
        static ALL_VALUE: FilterValue = FilterValue::All;
        self.filters.get(name).unwrap_or(&ALL_VALUE)
    }

    /// Check if every criterion is at its default.
    pub fn is_default(&self) -> bool {
        self.search_term.is_empty()
            && self.filters.values().all(FilterValue::is_all)
            && self.sort == SortKey::Newest
    }
}
