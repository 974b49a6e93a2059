//! Error types for the CRM console.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::criteria::SortKey;
use crate::kind::RecordKind;

/// Record store errors - the only error kind at the remote boundary.
///
/// Caught by the view controller and reported as diagnostics. Never reaches
/// the query engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Network unreachable or the connection failed.
    #[error("Store unreachable at {url}: {message}")]
    Unreachable { url: String, message: String },

    /// Request exceeded the configured timeout.
    #[error("Request to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    /// Remote answered with a non-success status.
    #[error("Store returned status {status} for {url}")]
    Status { url: String, status: u16 },

    /// Response body could not be decoded.
    #[error("Malformed payload from {url}: {message}")]
    Decode { url: String, message: String },

    /// Identifier rejected before contacting the store.
    #[error("Invalid record id: {0}")]
    InvalidId(String),

    /// Base URL could not be turned into an endpoint.
    #[error("Invalid store URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },
}

/// Rejected criteria mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CriteriaError {
    #[error("{kind} records have no '{filter}' filter")]
    UnknownFilter { kind: RecordKind, filter: String },

    #[error("'{value}' is not a valid {filter} option")]
    UnknownOption { filter: String, value: String },

    #[error("{kind} records cannot be sorted by {sort}")]
    UnsupportedSort { kind: RecordKind, sort: SortKey },

    #[error("unknown sort key '{0}'")]
    UnknownSortKey(String),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file exists but could not be read.
    #[error("IO error reading {path:?}: {message}")]
    Io { path: PathBuf, message: String },

    /// Config file is not valid TOML for `AppConfig`.
    #[error("Parse error in {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
}
