//! Core types for the CRM console.
//!
//! This crate contains shared data structures that are used across all CRM crates:
//! - Record types for consultations and bookings
//! - Per-kind descriptors (searchable fields, categorical filters, sort keys)
//! - Query criteria
//! - Timestamp parsing and display
//! - Configuration types
//! - Error types

mod config;
mod criteria;
mod error;
mod kind;
mod record;
mod timestamp;

pub use config::{config_dir, config_path, ApiConfig, AppConfig, LogConfig};
pub use criteria::{Criteria, FilterValue, SortKey};
pub use error::{ConfigError, CriteriaError, TransportError};
pub use kind::{
    CaseMode, FilterSpec, KindDescriptor, RecordKind, SearchField, BOOKINGS, CONSULTATIONS,
    DURATIONS, PACKAGES,
};
pub use record::{BookingRecord, ConsultationRecord, Field, Record, RecordId};
pub use timestamp::{display_date, parse_instant};
