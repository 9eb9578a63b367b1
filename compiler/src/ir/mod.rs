//! Compiled document model and its sanity checks.

pub mod types;
pub mod validate;

pub use types::*;
pub use validate::{DocumentIssue, validate_document};
