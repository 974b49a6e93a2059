//! Record query engine for the CRM console.
//!
//! Derives the visible subset of a collection from the user's criteria:
//!
//! ```text
//! collection ──► search predicate ──► categorical filters ──► stable sort ──► derived view
//!                  (any field)          (every filter)        (criteria.sort)
//! ```
//!
//! The engine is a pure function of `(collection, criteria)`. It never
//! mutates its inputs and never fails: absent or malformed attributes
//! degrade to "does not match" and "sorts last".

mod collate;
mod engine;
mod ordering;
mod predicate;

pub use collate::locale_cmp;
pub use engine::{matches, query};
pub use ordering::compare;
