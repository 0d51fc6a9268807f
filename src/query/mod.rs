pub mod error;
pub mod memory;
pub mod operators;
pub mod plan;

use crate::catalog::ValueKind;
use crate::catalog::types::FieldAccess;
use crate::query::plan::Query;

/// Storage collaborator that executes query plans.
///
/// `fetch` honors predicate, order, projection, skip and limit, and must sort
/// null or missing values lowest. Paths in `Query::text_collated` sort and
/// compare by the string form of their values. `count` counts predicate
/// matches only.
/// Errors are surfaced to pagination callers as-is.
pub trait Collection {
    type Doc: FieldAccess + Clone;
    type Error: std::error::Error;

    fn fetch(&self, query: &Query) -> Result<Vec<Self::Doc>, Self::Error>;

    fn count(&self, query: &Query) -> Result<u64, Self::Error>;

    /// Declared kind of a physical field, when the backend knows it.
    fn field_kind(&self, _path: &str) -> Option<ValueKind> {
        None
    }
}
