//! State model for the CRM console.
//!
//! This module contains the state machine and data structures that drive a
//! record screen. All types are front-end independent for testability.

mod state;

pub use state::{CollectionCache, CriteriaState, ViewPhase, ViewSnapshot};
