use crate::catalog::{DEFAULT_ID_PATH, FieldCatalog, IdKind};
use crate::error::PaginateError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PER_PAGE: usize = 30;
pub const DEFAULT_MAX_PER_PAGE: usize = 500;

/// Runtime configuration for a [`Paginator`](crate::paginate::Paginator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginateConfig {
    pub default_per_page: usize,
    pub max_per_page: usize,
    /// Clamp oversized requests to `max_per_page` instead of rejecting them.
    pub clamp_per_page: bool,
    pub id_path: String,
    pub id_kind: IdKind,
}

impl Default for PaginateConfig {
    fn default() -> Self {
        Self {
            default_per_page: DEFAULT_PER_PAGE,
            max_per_page: DEFAULT_MAX_PER_PAGE,
            clamp_per_page: true,
            id_path: DEFAULT_ID_PATH.to_string(),
            id_kind: IdKind::ObjectId,
        }
    }
}

impl PaginateConfig {
    /// Rejects oversized pages rather than clamping them.
    pub fn strict() -> Self {
        Self {
            clamp_per_page: false,
            ..Self::default()
        }
    }

    /// Profile for tables keyed by an auto-increment integer column.
    pub fn integer_ids(id_path: &str) -> Self {
        Self {
            id_path: id_path.to_string(),
            id_kind: IdKind::Integer,
            ..Self::default()
        }
    }

    pub fn with_default_per_page(mut self, per_page: usize) -> Self {
        self.default_per_page = per_page;
        self
    }

    pub fn with_max_per_page(mut self, max: usize) -> Self {
        self.max_per_page = max;
        self
    }

    pub fn with_id(mut self, path: &str, kind: IdKind) -> Self {
        self.id_path = path.to_string();
        self.id_kind = kind;
        self
    }

    pub fn validate(&self) -> Result<(), PaginateError> {
        if self.default_per_page == 0 || self.max_per_page == 0 {
            return Err(PaginateError::InvalidConfig {
                message: "page sizes must be at least 1".into(),
            });
        }
        if self.default_per_page > self.max_per_page {
            return Err(PaginateError::InvalidConfig {
                message: format!(
                    "default_per_page {} exceeds max_per_page {}",
                    self.default_per_page, self.max_per_page
                ),
            });
        }
        if self.id_path.is_empty() {
            return Err(PaginateError::InvalidConfig {
                message: "id_path must not be empty".into(),
            });
        }
        Ok(())
    }

    /// Resolves a requested page size against the configured bounds.
    pub fn effective_per_page(&self, requested: Option<usize>) -> Result<usize, PaginateError> {
        let per_page = requested.unwrap_or(self.default_per_page);
        if per_page == 0 {
            return Err(PaginateError::InvalidPerPage { per_page });
        }
        if per_page > self.max_per_page {
            if self.clamp_per_page {
                return Ok(self.max_per_page);
            }
            return Err(PaginateError::PerPageTooLarge {
                per_page,
                max: self.max_per_page,
            });
        }
        Ok(per_page)
    }

    /// Empty catalog carrying this config's id field.
    pub fn catalog(&self) -> FieldCatalog {
        FieldCatalog::new(&self.id_path, self.id_kind)
    }
}
