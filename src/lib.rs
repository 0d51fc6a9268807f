//! Keyset (seek) pagination over ordered collections.
//!
//! A page is located by an opaque offset token holding the last row's sort
//! value and its unique id. The engine turns that token into a tuple-seek
//! predicate over `(sort field, id)`, over-fetches one row to detect a next
//! page, and derives previous-page tokens and position metadata from counts
//! on the inverted order instead of scanning whole result sets.
//!
//! Storage stays behind the [`Collection`] trait; [`MemoryCollection`] is a
//! reference implementation.

pub mod catalog;
pub mod config;
pub mod error;
pub mod paginate;
pub mod query;

pub use catalog::types::{Document, FieldAccess, ObjectId, Value};
pub use catalog::{FieldCatalog, FieldSpec, IdKind, SortField, ValueKind};
pub use config::PaginateConfig;
pub use error::{ErrorCode, PaginateError};
pub use paginate::cursor::{CursorCodec, SeekKey};
pub use paginate::engine::PaginationEngine;
pub use paginate::scope::{RangeQueryBuilder, SeekMode};
pub use paginate::{PageRequest, PageResult, Paginator};
pub use query::Collection;
pub use query::memory::MemoryCollection;
pub use query::plan::{Expr, Order, Query};
