//! Per-kind record descriptors.
//!
//! Consultations and bookings share one query engine. A descriptor tells the
//! engine which fields a kind searches, which categorical filters it offers,
//! and which sort keys are valid for it.

use std::fmt;

use crate::criteria::SortKey;
use crate::record::Field;

/// Closed set of diabetes-duration values.
pub const DURATIONS: &[&str] = &[
    "0-6 months",
    "6 months - 1 year",
    "1-3 years",
    "3-5 years",
    "Above 5 years",
];

/// Closed set of bookable packages.
pub const PACKAGES: &[&str] = &["Basic", "Standard", "Premium"];

/// The two record collections served by the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Consultation,
    Booking,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Consultation => f.write_str("consultation"),
            RecordKind::Booking => f.write_str("booking"),
        }
    }
}

/// How a searchable field is compared against the search term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseMode {
    Insensitive,
    Sensitive,
}

/// A field included in free-text search.
#[derive(Debug, Clone, Copy)]
pub struct SearchField {
    pub field: Field,
    pub case: CaseMode,
}

/// A categorical filter over a closed enumeration.
#[derive(Debug, Clone, Copy)]
pub struct FilterSpec {
    /// Name used in criteria and commands.
    pub name: &'static str,
    /// Record attribute the filter compares against.
    pub field: Field,
    /// Values a user may select besides the "all" sentinel.
    pub options: &'static [&'static str],
}

impl FilterSpec {
    /// Check if a value belongs to the closed option set.
    pub fn accepts(&self, value: &str) -> bool {
        self.options.contains(&value)
    }
}

/// Schema and capabilities of one record kind.
#[derive(Debug)]
pub struct KindDescriptor {
    pub kind: RecordKind,
    /// Plural label used in readouts ("consultations").
    pub label: &'static str,
    /// Collection path segment under `/api`.
    pub path: &'static str,
    /// Prompt shown before a delete.
    pub delete_prompt: &'static str,
    pub searchable: &'static [SearchField],
    pub filters: &'static [FilterSpec],
    pub sort_keys: &'static [SortKey],
}

impl KindDescriptor {
    /// Look up a filter by name.
    pub fn filter(&self, name: &str) -> Option<&FilterSpec> {
        self.filters.iter().find(|f| f.name == name)
    }

    /// Check if this kind supports a sort key.
    pub fn supports_sort(&self, key: SortKey) -> bool {
        self.sort_keys.contains(&key)
    }
}

const DURATION_FILTER: FilterSpec = FilterSpec {
    name: "duration",
    field: Field::Duration,
    options: DURATIONS,
};

const PACKAGE_FILTER: FilterSpec = FilterSpec {
    name: "package",
    field: Field::PackageBooked,
    options: PACKAGES,
};

const fn insensitive(field: Field) -> SearchField {
    SearchField {
        field,
        case: CaseMode::Insensitive,
    }
}

/// Consultation requests.
pub static CONSULTATIONS: KindDescriptor = KindDescriptor {
    kind: RecordKind::Consultation,
    label: "consultations",
    path: "consultations",
    delete_prompt: "Are you sure you want to delete this record?",
    searchable: &[
        insensitive(Field::Name),
        SearchField {
            field: Field::Contact,
            case: CaseMode::Sensitive,
        },
        insensitive(Field::Place),
        insensitive(Field::Duration),
    ],
    filters: &[DURATION_FILTER],
    sort_keys: &[SortKey::Newest, SortKey::Oldest, SortKey::Name],
};

/// Package bookings.
pub static BOOKINGS: KindDescriptor = KindDescriptor {
    kind: RecordKind::Booking,
    label: "bookings",
    path: "bookings",
    delete_prompt: "Are you sure you want to delete this booking?",
    searchable: &[
        insensitive(Field::Name),
        SearchField {
            field: Field::Contact,
            case: CaseMode::Sensitive,
        },
        insensitive(Field::Place),
        insensitive(Field::Duration),
        insensitive(Field::Email),
        insensitive(Field::PackageBooked),
    ],
    filters: &[DURATION_FILTER, PACKAGE_FILTER],
    sort_keys: &[
        SortKey::Newest,
        SortKey::Oldest,
        SortKey::Name,
        SortKey::Package,
    ],
};
