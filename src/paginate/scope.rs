use crate::catalog::SortField;
use crate::catalog::types::Value;
use crate::paginate::cursor::SeekKey;
use crate::query::plan::{Expr, Order, Query};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekMode {
    /// Rows strictly after the seek key.
    Exclusive,
    /// The seek row itself plus everything after it.
    Inclusive,
}

// One component of a seek branch.
enum Term {
    Never,
    Always,
    Match(Expr),
}

fn equal_term(field: &str, value: &Value) -> Term {
    if value.is_null() {
        Term::Match(Expr::IsNull(field.to_string()))
    } else {
        Term::Match(Expr::Eq(field.to_string(), value.clone()))
    }
}

// Rows that come after `value` on `field` under `order`. Nulls sort lowest,
// so they precede every value ascending and follow every value descending.
fn after_term(field: &str, value: &Value, order: Order, inclusive: bool, nullable: bool) -> Term {
    let name = field.to_string();
    if value.is_null() {
        return match (order, inclusive) {
            (Order::Asc, false) => Term::Match(Expr::IsNotNull(name)),
            (Order::Asc, true) => Term::Always,
            (Order::Desc, false) => Term::Never,
            (Order::Desc, true) => Term::Match(Expr::IsNull(name)),
        };
    }
    let bound = match (order, inclusive) {
        (Order::Asc, false) => Expr::Gt(name.clone(), value.clone()),
        (Order::Asc, true) => Expr::Gte(name.clone(), value.clone()),
        (Order::Desc, false) => Expr::Lt(name.clone(), value.clone()),
        (Order::Desc, true) => Expr::Lte(name.clone(), value.clone()),
    };
    if order == Order::Desc && nullable {
        Term::Match(bound.or(Expr::IsNull(name)))
    } else {
        Term::Match(bound)
    }
}

/// Translates a [`SeekKey`] into a tuple-seek predicate over
/// `(sort field, id)`.
#[derive(Debug, Clone, Copy)]
pub struct RangeQueryBuilder<'a> {
    sort_field: &'a SortField,
    id_path: &'a str,
}

impl<'a> RangeQueryBuilder<'a> {
    pub fn new(sort_field: &'a SortField, id_path: &'a str) -> Self {
        Self {
            sort_field,
            id_path,
        }
    }

    // (path, offset, nullable); the id closes every chain and is never null.
    fn key_chain(&self, seek: &SeekKey) -> Vec<(&'a str, Value, bool)> {
        if self.sort_field.path == self.id_path {
            return vec![(self.id_path, seek.id.clone(), false)];
        }
        vec![
            (
                self.sort_field.path.as_str(),
                seek.field.clone().unwrap_or(Value::Null),
                true,
            ),
            (self.id_path, seek.id.clone(), false),
        ]
    }

    /// Narrows `query` to the rows after `seek` in the query's own order.
    /// Without a seek key the query is returned unchanged.
    pub fn scope(&self, query: Query, mode: SeekMode, seek: Option<&SeekKey>) -> Query {
        let Some(seek) = seek else {
            return query;
        };
        match self.seek_predicate(&query, mode, seek) {
            Some(predicate) => {
                tracing::debug!(?mode, ?predicate, "seek predicate built");
                query.and_where(predicate)
            }
            None => query,
        }
    }

    /// Lexicographic `(f0, .., fn) > (v0, .., vn)` as a disjunction, most
    /// specific branch first: `f0 = v0 AND .. AND fn > vn`, then
    /// `f0 = v0 AND .. AND fn-1 > vn-1`, down to `f0 > v0`. Only the full
    /// branch turns inclusive. `None` means every row qualifies.
    pub fn seek_predicate(&self, query: &Query, mode: SeekMode, seek: &SeekKey) -> Option<Expr> {
        let chain = self.key_chain(seek);
        let mut branches = Vec::with_capacity(chain.len());

        for len in (1..=chain.len()).rev() {
            let mut terms = Vec::with_capacity(len);
            let mut never = false;
            for (idx, (field, value, nullable)) in chain[..len].iter().enumerate() {
                let term = if idx + 1 < len {
                    equal_term(field, value)
                } else {
                    let order = query.direction_of(field).unwrap_or_default();
                    let inclusive = mode == SeekMode::Inclusive && len == chain.len();
                    after_term(field, value, order, inclusive, *nullable)
                };
                match term {
                    Term::Never => {
                        never = true;
                        break;
                    }
                    Term::Always => {}
                    Term::Match(expr) => terms.push(expr),
                }
            }
            if never {
                continue;
            }
            match Expr::all(terms) {
                Some(branch) => branches.push(branch),
                None => return None,
            }
        }

        // The full-length branch always ends on the non-null id, so at least
        // one branch survives.
        Expr::any(branches)
    }
}
