use crate::catalog::{IdField, SortField, ValueKind};
use crate::error::PaginateError;
use crate::paginate::cursor::{CursorCodec, SeekKey};
use crate::paginate::scope::{RangeQueryBuilder, SeekMode};
use crate::paginate::{PageRequest, PageResult};
use crate::query::Collection;
use crate::query::plan::Query;
use once_cell::unsync::OnceCell;

/// Computes one page of a keyset-paginated query.
///
/// Every value is fetched lazily and cached for the lifetime of the engine.
/// The caches are not thread-safe; build one engine per request.
pub struct PaginationEngine<'c, C: Collection + ?Sized> {
    collection: &'c C,
    per_page: usize,
    sort_field: SortField,
    id_field: IdField,
    ordered: Query,
    seek: Option<SeekKey>,
    results_plus_one: OnceCell<Vec<C::Doc>>,
    start: OnceCell<u64>,
    total: OnceCell<u64>,
}

impl<'c, C: Collection + ?Sized> PaginationEngine<'c, C> {
    pub fn new(collection: &'c C, request: PageRequest) -> Result<Self, PaginateError> {
        request.validate()?;
        let PageRequest {
            per_page,
            offset,
            sort_by,
            order,
            catalog,
            base,
        } = request;

        let sort_field = catalog.resolve(&sort_by, |path| collection.field_kind(path));
        let id_field = catalog.id_field().clone();
        let mut order_by = Vec::with_capacity(2);
        if sort_field.path != id_field.path {
            order_by.push((sort_field.path.clone(), order));
        }
        order_by.push((id_field.path.clone(), order));
        let mut ordered = base.with_order(order_by);
        if sort_field.kind == ValueKind::Generic && sort_field.path != id_field.path {
            ordered = ordered.collate_as_text(&sort_field.path);
        }

        let seek = CursorCodec::new(&sort_field, &id_field).decode(offset.as_deref());
        tracing::debug!(
            per_page,
            sort = %sort_field.path,
            %order,
            seeking = seek.is_some(),
            "pagination engine ready"
        );

        Ok(Self {
            collection,
            per_page,
            sort_field,
            id_field,
            ordered,
            seek,
            results_plus_one: OnceCell::new(),
            start: OnceCell::new(),
            total: OnceCell::new(),
        })
    }

    pub fn per_page(&self) -> usize {
        self.per_page
    }

    pub fn sort_field(&self) -> &SortField {
        &self.sort_field
    }

    pub fn seek_key(&self) -> Option<&SeekKey> {
        self.seek.as_ref()
    }

    fn codec(&self) -> CursorCodec<'_> {
        CursorCodec::new(&self.sort_field, &self.id_field)
    }

    fn builder(&self) -> RangeQueryBuilder<'_> {
        RangeQueryBuilder::new(&self.sort_field, &self.id_field.path)
    }

    /// Rows at or before the current offset, nearest first.
    fn prev_query(&self) -> Query {
        self.builder().scope(
            self.ordered.clone().inverted(),
            SeekMode::Inclusive,
            self.seek.as_ref(),
        )
    }

    fn results_plus_one(&self) -> Result<&[C::Doc], C::Error> {
        self.results_plus_one
            .get_or_try_init(|| {
                let query = self
                    .builder()
                    .scope(self.ordered.clone(), SeekMode::Exclusive, self.seek.as_ref())
                    .limit(self.per_page.saturating_add(1));
                let rows = self.collection.fetch(&query)?;
                tracing::trace!(fetched = rows.len(), per_page = self.per_page, "page probe");
                Ok(rows)
            })
            .map(Vec::as_slice)
    }

    pub fn results(&self) -> Result<&[C::Doc], C::Error> {
        let rows = self.results_plus_one()?;
        Ok(&rows[..rows.len().min(self.per_page)])
    }

    pub fn has_next(&self) -> Result<bool, C::Error> {
        Ok(self.results_plus_one()?.len() > self.per_page)
    }

    pub fn has_prev(&self) -> bool {
        self.seek.is_some()
    }

    /// Token for the page after this one; `None` when this page is empty.
    pub fn next_offset(&self) -> Result<Option<String>, C::Error> {
        Ok(self
            .results()?
            .last()
            .and_then(|doc| self.codec().encode(doc)))
    }

    /// Token whose forward seek lands on the previous page.
    ///
    /// `None` without an offset, and also when fewer than `per_page` rows
    /// precede the current page: the previous page is then the first page,
    /// which needs no token.
    pub fn prev_offset(&self) -> Result<Option<String>, C::Error> {
        if self.seek.is_none() {
            return Ok(None);
        }
        let query = self
            .prev_query()
            .select(&[self.sort_field.path.as_str(), self.id_field.path.as_str()])
            .skip(self.per_page)
            .limit(1);
        let boundary = self.collection.fetch(&query)?;
        Ok(boundary.first().and_then(|doc| self.codec().encode(doc)))
    }

    /// 1-based position of the first row on this page.
    pub fn start(&self) -> Result<u64, C::Error> {
        self.start
            .get_or_try_init(|| {
                if self.seek.is_none() {
                    return Ok(1);
                }
                Ok(self.collection.count(&self.prev_query())? + 1)
            })
            .copied()
    }

    pub fn count(&self) -> Result<usize, C::Error> {
        Ok(self.results()?.len())
    }

    /// Rows matched by the base query, regardless of the offset.
    pub fn total(&self) -> Result<u64, C::Error> {
        self.total
            .get_or_try_init(|| self.collection.count(&self.ordered))
            .copied()
    }

    /// `"11 - 20 of 25"`, or `"5 of 5"` when everything fits on one page.
    pub fn position(&self) -> Result<String, C::Error> {
        let total = self.total()?;
        if total < self.per_page as u64 {
            return Ok(format!("{total} of {total}"));
        }
        let start = self.start()?;
        let count = self.count()? as u64;
        Ok(format!(
            "{start} - {} of {total}",
            (start + count).saturating_sub(1)
        ))
    }

    /// Collects every page attribute, consuming the engine.
    pub fn into_page(self) -> Result<PageResult<C::Doc>, C::Error> {
        let has_next = self.has_next()?;
        let next_offset = self.next_offset()?;
        let prev_offset = self.prev_offset()?;
        let start = self.start()?;
        let count = self.count()?;
        let total = self.total()?;
        let position = self.position()?;
        let has_prev = self.has_prev();
        let per_page = self.per_page;
        let mut items = self.results_plus_one.into_inner().unwrap_or_default();
        items.truncate(per_page);
        Ok(PageResult {
            items,
            has_next,
            has_prev,
            next_offset,
            prev_offset,
            start,
            count,
            total,
            position,
        })
    }
}
