use crate::catalog::ValueKind;
use crate::catalog::types::Document;
use crate::query::Collection;
use crate::query::error::QueryError;
use crate::query::operators::{FieldReader, eval_expr, sort_rows, validate_expr, validate_path};
use crate::query::plan::Query;
use std::cell::Cell;
use std::collections::BTreeMap;

pub const DEFAULT_MAX_SCAN_ROWS: usize = 10_000;

/// In-memory [`Collection`] of [`Document`]s.
///
/// Evaluates the same query plan a real backend receives. Nulls sort lowest.
#[derive(Debug, Clone)]
pub struct MemoryCollection {
    docs: Vec<Document>,
    kinds: BTreeMap<String, ValueKind>,
    max_scan_rows: usize,
    queries_executed: Cell<usize>,
    rows_examined: Cell<usize>,
}

impl Default for MemoryCollection {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl MemoryCollection {
    pub fn new(docs: Vec<Document>) -> Self {
        Self {
            docs,
            kinds: BTreeMap::new(),
            max_scan_rows: DEFAULT_MAX_SCAN_ROWS,
            queries_executed: Cell::new(0),
            rows_examined: Cell::new(0),
        }
    }

    /// Declares a field's kind for schema introspection.
    pub fn with_kind(mut self, path: &str, kind: ValueKind) -> Self {
        self.kinds.insert(path.to_string(), kind);
        self
    }

    pub fn with_max_scan_rows(mut self, max_scan_rows: usize) -> Self {
        self.max_scan_rows = max_scan_rows;
        self
    }

    pub fn insert(&mut self, doc: Document) {
        self.docs.push(doc);
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Number of `fetch` and `count` calls served so far.
    pub fn queries_executed(&self) -> usize {
        self.queries_executed.get()
    }

    pub fn rows_examined(&self) -> usize {
        self.rows_examined.get()
    }

    fn validate_query(&self, query: &Query) -> Result<(), QueryError> {
        if let Some(predicate) = &query.predicate {
            validate_expr(predicate)?;
        }
        for (path, _) in &query.order_by {
            validate_path(path)?;
        }
        for path in query.select.iter().chain(&query.text_collated) {
            validate_path(path)?;
        }
        Ok(())
    }

    fn matching(&self, query: &Query) -> impl Iterator<Item = &Document> {
        self.queries_executed.set(self.queries_executed.get() + 1);
        self.rows_examined
            .set(self.rows_examined.get() + self.docs.len());
        let reader = FieldReader::new(&query.text_collated);
        self.docs.iter().filter(move |doc| {
            query
                .predicate
                .as_ref()
                .is_none_or(|predicate| eval_expr(predicate, *doc, reader))
        })
    }
}

impl Collection for MemoryCollection {
    type Doc = Document;
    type Error = QueryError;

    fn fetch(&self, query: &Query) -> Result<Vec<Document>, QueryError> {
        self.validate_query(query)?;
        let matched: Vec<&Document> = self.matching(query).collect();
        if query.limit.is_none() && matched.len() > self.max_scan_rows {
            return Err(QueryError::ScanBoundExceeded {
                estimated_rows: matched.len() as u64,
                max_scan_rows: self.max_scan_rows as u64,
            });
        }

        let keep = query.limit.map(|limit| query.skip.saturating_add(limit));
        let sorted = sort_rows(
            matched,
            &query.order_by,
            keep,
            FieldReader::new(&query.text_collated),
        );
        let window = sorted
            .into_iter()
            .skip(query.skip)
            .take(query.limit.unwrap_or(usize::MAX));
        let rows = if query.select.is_empty() {
            window.cloned().collect()
        } else {
            window.map(|doc| doc.project(&query.select)).collect()
        };
        Ok(rows)
    }

    fn count(&self, query: &Query) -> Result<u64, QueryError> {
        self.validate_query(query)?;
        Ok(self.matching(query).count() as u64)
    }

    fn field_kind(&self, path: &str) -> Option<ValueKind> {
        self.kinds.get(path).copied()
    }
}
