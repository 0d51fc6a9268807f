pub mod cursor;
pub mod engine;
pub mod scope;

use crate::catalog::{FieldCatalog, FieldSpec};
use crate::config::{DEFAULT_PER_PAGE, PaginateConfig};
use crate::error::PaginateError;
use crate::paginate::engine::PaginationEngine;
use crate::query::Collection;
use crate::query::plan::{Order, Query};
use serde::Serialize;

/// Parameters for one page of a logical query.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    per_page: usize,
    offset: Option<String>,
    sort_by: String,
    order: Order,
    catalog: FieldCatalog,
    base: Query,
}

impl PageRequest {
    pub fn new(catalog: FieldCatalog) -> Self {
        Self {
            per_page: DEFAULT_PER_PAGE,
            offset: None,
            sort_by: String::new(),
            order: Order::Asc,
            catalog,
            base: Query::new(),
        }
    }

    pub fn per_page(mut self, per_page: usize) -> Self {
        self.per_page = per_page;
        self
    }

    /// Offset token from a previous page's `next_offset` or `prev_offset`.
    pub fn offset(mut self, token: Option<&str>) -> Self {
        self.offset = token.map(str::to_string);
        self
    }

    /// Logical sort key; unknown keys sort by id.
    pub fn sort_by(mut self, sort_by: &str) -> Self {
        self.sort_by = sort_by.to_string();
        self
    }

    pub fn order(mut self, order: Order) -> Self {
        self.order = order;
        self
    }

    /// Base query whose predicate selects the rows to paginate. Its own
    /// ordering is replaced by `(sort field, id)`.
    pub fn filter(mut self, base: Query) -> Self {
        self.base = base;
        self
    }

    pub fn validate(&self) -> Result<(), PaginateError> {
        if self.per_page == 0 {
            return Err(PaginateError::InvalidPerPage {
                per_page: self.per_page,
            });
        }
        Ok(())
    }
}

/// Everything a caller needs to render one page and its navigation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageResult<D> {
    pub items: Vec<D>,
    pub has_next: bool,
    pub has_prev: bool,
    pub next_offset: Option<String>,
    /// `None` with `has_prev` set means "link to the first page".
    pub prev_offset: Option<String>,
    pub start: u64,
    pub count: usize,
    pub total: u64,
    pub position: String,
}

/// Builds page requests and engines for one collection under one config.
pub struct Paginator<'c, C: Collection + ?Sized> {
    collection: &'c C,
    config: PaginateConfig,
    catalog: FieldCatalog,
}

impl<'c, C: Collection + ?Sized> Paginator<'c, C> {
    pub fn new(collection: &'c C, config: PaginateConfig) -> Result<Self, PaginateError> {
        config.validate()?;
        let catalog = config.catalog();
        Ok(Self {
            collection,
            config,
            catalog,
        })
    }

    pub fn with_field(mut self, name: &str, entry: FieldSpec) -> Self {
        self.catalog.insert(name, entry);
        self
    }

    pub fn config(&self) -> &PaginateConfig {
        &self.config
    }

    pub fn catalog(&self) -> &FieldCatalog {
        &self.catalog
    }

    /// Request pre-filled with the configured default page size and catalog.
    pub fn request(&self) -> PageRequest {
        PageRequest::new(self.catalog.clone()).per_page(self.config.default_per_page)
    }

    /// Engine for `request`, with its page size checked against the config.
    pub fn engine(&self, request: PageRequest) -> Result<PaginationEngine<'c, C>, PaginateError> {
        let per_page = self.config.effective_per_page(Some(request.per_page))?;
        PaginationEngine::new(self.collection, request.per_page(per_page))
    }

    /// Convenience wrapper: one page from loosely typed parameters.
    pub fn page(
        &self,
        per_page: Option<usize>,
        offset: Option<&str>,
        sort_by: &str,
        order: &str,
    ) -> Result<PaginationEngine<'c, C>, PaginateError> {
        let per_page = self.config.effective_per_page(per_page)?;
        let request = self
            .request()
            .per_page(per_page)
            .offset(offset)
            .sort_by(sort_by)
            .order(order.parse()?);
        PaginationEngine::new(self.collection, request)
    }
}

#[cfg(test)]
mod tests {
    use super::{PageRequest, Paginator};
    use crate::catalog::types::Document;
    use crate::catalog::{FieldCatalog, FieldSpec, ValueKind};
    use crate::config::PaginateConfig;
    use crate::error::PaginateError;
    use crate::query::memory::MemoryCollection;

    fn collection() -> MemoryCollection {
        MemoryCollection::new(
            (0..40)
                .map(|i| Document::new().with("_id", i).with("rank", 40 - i))
                .collect(),
        )
    }

    #[test]
    fn request_validation_rejects_empty_pages() {
        let err = PageRequest::new(FieldCatalog::default())
            .per_page(0)
            .validate()
            .expect_err("zero");
        assert_eq!(err, PaginateError::InvalidPerPage { per_page: 0 });
    }

    #[test]
    fn paginator_applies_config_defaults_and_clamps() {
        let coll = collection();
        let paginator = Paginator::new(
            &coll,
            PaginateConfig::integer_ids("_id")
                .with_default_per_page(7)
                .with_max_per_page(15),
        )
        .expect("paginator")
        .with_field("rank", FieldSpec::typed("rank", ValueKind::Numeric));

        let default_page = paginator
            .engine(paginator.request().sort_by("rank"))
            .expect("engine");
        assert_eq!(default_page.per_page(), 7);

        let clamped = paginator
            .page(Some(100), None, "rank", "desc")
            .expect("engine");
        assert_eq!(clamped.per_page(), 15);
        assert_eq!(clamped.sort_field().path, "rank");
        assert_eq!(clamped.count().expect("count"), 15);
    }

    #[test]
    fn paginator_reports_bad_parameters() {
        let coll = collection();
        let paginator =
            Paginator::new(&coll, PaginateConfig::strict().with_max_per_page(10)).expect("paginator");
        assert!(matches!(
            paginator.page(Some(11), None, "rank", "asc").err(),
            Some(PaginateError::PerPageTooLarge { .. })
        ));
        assert!(matches!(
            paginator.page(None, None, "rank", "upwards").err(),
            Some(PaginateError::InvalidOrder { .. })
        ));
        assert!(Paginator::new(&coll, PaginateConfig::default().with_max_per_page(0)).is_err());
    }
}
