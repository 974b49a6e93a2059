//! Terminal admin console for consultation and booking records.
//!
//! This crate provides:
//! - Record store client (HTTP and test mock)
//! - View controller with watch-channel snapshots
//! - Front-end independent state model
//! - Command parsing and plain-text rendering

pub mod commands;
pub mod console;
pub mod controller;
pub mod model;
pub mod render;
pub mod store;

// Re-export commonly used types
pub use commands::{parse_command, Command, CommandError, Screen};
pub use console::{Console, Reply, StdinConfirm};
pub use controller::{
    Confirm, DeleteOutcome, Diagnostic, DiagnosticSink, FetchOutcome, TracingSink, ViewController,
};
pub use model::{CollectionCache, CriteriaState, ViewPhase, ViewSnapshot};
pub use store::{HttpRecordStore, RecordStore};
