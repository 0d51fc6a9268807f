use crate::catalog::types::{FieldAccess, Value};
use crate::query::error::QueryError;
use crate::query::plan::{Expr, Order};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Reads document fields for filtering and sorting.
///
/// Paths listed as text-collated compare by the string form of their
/// non-null values, on the document side and the literal side alike.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldReader<'a> {
    text_paths: &'a [String],
}

impl<'a> FieldReader<'a> {
    pub fn new(text_paths: &'a [String]) -> Self {
        Self { text_paths }
    }

    fn collate(&self, path: &str, value: Value) -> Value {
        match value {
            Value::Null | Value::Text(_) => value,
            other if self.text_paths.iter().any(|p| p == path) => {
                Value::Text(other.to_string().into())
            }
            other => other,
        }
    }

    pub fn read<D: FieldAccess>(&self, doc: &D, path: &str) -> Value {
        self.collate(path, doc.field(path).unwrap_or(Value::Null))
    }

    // Ordered comparisons are unknown against null, on either side.
    fn compare_non_null<D: FieldAccess>(
        &self,
        doc: &D,
        path: &str,
        rhs: &Value,
    ) -> Option<Ordering> {
        if rhs.is_null() {
            return None;
        }
        let lhs = self.read(doc, path);
        if lhs.is_null() {
            return None;
        }
        Some(lhs.cmp(&self.collate(path, rhs.clone())))
    }

    fn equals<D: FieldAccess>(&self, doc: &D, path: &str, rhs: &Value) -> bool {
        self.read(doc, path) == self.collate(path, rhs.clone())
    }
}

pub fn eval_expr<D: FieldAccess>(expr: &Expr, doc: &D, reader: FieldReader<'_>) -> bool {
    match expr {
        Expr::Eq(c, v) => reader.equals(doc, c, v),
        Expr::Ne(c, v) => !reader.equals(doc, c, v),
        Expr::Lt(c, v) => reader.compare_non_null(doc, c, v).is_some_and(Ordering::is_lt),
        Expr::Lte(c, v) => reader.compare_non_null(doc, c, v).is_some_and(Ordering::is_le),
        Expr::Gt(c, v) => reader.compare_non_null(doc, c, v).is_some_and(Ordering::is_gt),
        Expr::Gte(c, v) => reader.compare_non_null(doc, c, v).is_some_and(Ordering::is_ge),
        Expr::In(c, values) => values.iter().any(|v| reader.equals(doc, c, v)),
        Expr::IsNull(c) => reader.read(doc, c).is_null(),
        Expr::IsNotNull(c) => !reader.read(doc, c).is_null(),
        Expr::And(a, b) => eval_expr(a, doc, reader) && eval_expr(b, doc, reader),
        Expr::Or(a, b) => eval_expr(a, doc, reader) || eval_expr(b, doc, reader),
        Expr::Not(inner) => !eval_expr(inner, doc, reader),
    }
}

pub fn validate_expr(expr: &Expr) -> Result<(), QueryError> {
    match expr {
        Expr::Eq(c, _)
        | Expr::Ne(c, _)
        | Expr::Lt(c, _)
        | Expr::Lte(c, _)
        | Expr::Gt(c, _)
        | Expr::Gte(c, _)
        | Expr::In(c, _)
        | Expr::IsNull(c)
        | Expr::IsNotNull(c) => validate_path(c),
        Expr::And(a, b) | Expr::Or(a, b) => {
            validate_expr(a)?;
            validate_expr(b)
        }
        Expr::Not(inner) => validate_expr(inner),
    }
}

pub fn validate_path(path: &str) -> Result<(), QueryError> {
    if path.is_empty() || path.split('.').any(str::is_empty) {
        return Err(QueryError::InvalidQuery {
            reason: format!("invalid field path '{path}'"),
        });
    }
    Ok(())
}

fn compare_keys(lhs: &[Value], rhs: &[Value], orders: &[Order]) -> Ordering {
    for ((a, b), order) in lhs.iter().zip(rhs.iter()).zip(orders.iter()) {
        let cmp = a.cmp(b);
        let ord = match order {
            Order::Asc => cmp,
            Order::Desc => cmp.reverse(),
        };
        if !ord.is_eq() {
            return ord;
        }
    }
    Ordering::Equal
}

// Heap preallocation cap; `keep` may be as large as `usize::MAX`.
const TOP_K_PREALLOC: usize = 1024;

struct KeyedRow<D> {
    key: Vec<Value>,
    seq: usize,
    row: D,
}

struct TopKRow<'a, D> {
    inner: KeyedRow<D>,
    orders: &'a [Order],
}

impl<D> Ord for TopKRow<'_, D> {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_keys(&self.inner.key, &other.inner.key, self.orders)
            .then(self.inner.seq.cmp(&other.inner.seq))
    }
}

impl<D> PartialOrd for TopKRow<'_, D> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<D> PartialEq for TopKRow<'_, D> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl<D> Eq for TopKRow<'_, D> {}

/// Stable sort of `rows` under `order_by`, keeping only the first `keep`
/// rows when given. Null and missing fields sort lowest.
pub fn sort_rows<D, I>(
    rows: I,
    order_by: &[(String, Order)],
    keep: Option<usize>,
    reader: FieldReader<'_>,
) -> Vec<D>
where
    D: FieldAccess,
    I: IntoIterator<Item = D>,
{
    let orders: Vec<Order> = order_by.iter().map(|(_, order)| *order).collect();
    let keyed = rows.into_iter().enumerate().map(|(seq, row)| KeyedRow {
        key: order_by
            .iter()
            .map(|(path, _)| reader.read(&row, path))
            .collect(),
        seq,
        row,
    });

    if let Some(keep) = keep {
        if keep == 0 {
            return Vec::new();
        }
        let mut heap: BinaryHeap<TopKRow<'_, D>> =
            BinaryHeap::with_capacity(keep.min(TOP_K_PREALLOC));
        for inner in keyed {
            let candidate = TopKRow {
                inner,
                orders: &orders,
            };
            if heap.len() < keep {
                heap.push(candidate);
                continue;
            }
            // Keep only the best N rows under the requested order.
            if heap
                .peek()
                .is_some_and(|worst_of_best| candidate < *worst_of_best)
            {
                let _ = heap.pop();
                heap.push(candidate);
            }
        }
        return heap
            .into_sorted_vec()
            .into_iter()
            .map(|entry| entry.inner.row)
            .collect();
    }

    let mut rows: Vec<KeyedRow<D>> = keyed.collect();
    rows.sort_by(|a, b| compare_keys(&a.key, &b.key, &orders));
    rows.into_iter().map(|entry| entry.row).collect()
}

#[cfg(test)]
mod tests {
    use super::{FieldReader, eval_expr, sort_rows, validate_expr};
    use crate::catalog::types::{Document, Value};
    use crate::query::plan::{Expr, Order, col, lit};

    fn doc(id: i64, score: Option<i64>) -> Document {
        let doc = Document::new().with("_id", id);
        match score {
            Some(score) => doc.with("score", score),
            None => doc,
        }
    }

    #[test]
    fn comparisons_never_match_null_fields() {
        let missing = doc(1, None);
        let explicit_null = Document::new().with("_id", 2).with("score", Value::Null);
        for d in [&missing, &explicit_null] {
            assert!(!eval_expr(&col("score").gt(lit(0)), d, FieldReader::default()));
            assert!(!eval_expr(&col("score").lt(lit(0)), d, FieldReader::default()));
            assert!(!eval_expr(&col("score").lte(lit(0)), d, FieldReader::default()));
            assert!(eval_expr(&col("score").is_null(), d, FieldReader::default()));
            assert!(!eval_expr(&col("score").is_not_null(), d, FieldReader::default()));
        }
        assert!(!eval_expr(&col("_id").gte(Value::Null), &missing, FieldReader::default()));
    }

    #[test]
    fn boolean_composition_and_membership() {
        let d = doc(5, Some(10));
        let expr = col("score")
            .gte(lit(10))
            .and(col("_id").in_(vec![lit(4), lit(5)]))
            .or(col("_id").eq(lit(99)));
        assert!(eval_expr(&expr, &d, FieldReader::default()));
        assert!(!eval_expr(&expr.clone().not(), &d, FieldReader::default()));
        assert!(eval_expr(&col("score").neq(lit(11)), &d, FieldReader::default()));
    }

    #[test]
    fn empty_paths_are_rejected() {
        assert!(validate_expr(&col("a.b").eq(lit(1))).is_ok());
        assert!(validate_expr(&Expr::IsNull(String::new())).is_err());
        assert!(validate_expr(&col("a").is_null().and(col("a..b").is_null())).is_err());
    }

    #[test]
    fn sort_puts_nulls_first_ascending_and_breaks_ties_by_next_key() {
        let rows = vec![doc(3, Some(1)), doc(1, None), doc(2, Some(1)), doc(4, Some(0))];
        let order = vec![("score".to_string(), Order::Asc), ("_id".to_string(), Order::Asc)];
        let ids: Vec<Value> = sort_rows(rows.clone(), &order, None, FieldReader::default())
            .iter()
            .map(|d| d.get("_id").cloned().unwrap_or(Value::Null))
            .collect();
        assert_eq!(ids, vec![lit(1), lit(4), lit(2), lit(3)]);

        let desc: Vec<(String, Order)> = order
            .iter()
            .map(|(c, o)| (c.clone(), o.reversed()))
            .collect();
        let top2: Vec<Value> = sort_rows(rows, &desc, Some(2), FieldReader::default())
            .iter()
            .map(|d| d.get("_id").cloned().unwrap_or(Value::Null))
            .collect();
        assert_eq!(top2, vec![lit(3), lit(2)]);
    }

    #[test]
    fn text_collated_paths_compare_by_string_form() {
        let paths = vec!["hits".to_string()];
        let reader = FieldReader::new(&paths);
        let d = Document::new().with("_id", 1).with("hits", 100);
        // "100" < "20" as text, unlike the numeric order.
        assert!(eval_expr(&col("hits").lt(lit("20")), &d, reader));
        assert!(!eval_expr(&col("hits").lt(lit(20)), &d, FieldReader::default()));
        assert!(eval_expr(&col("hits").eq(lit(100)), &d, reader));
        assert!(eval_expr(&col("hits").eq(lit("100")), &d, reader));
        assert!(!eval_expr(&col("missing").gt(lit("")), &d, reader));

        let rows: Vec<Document> = [2, 100, 30, 1]
            .iter()
            .map(|h| Document::new().with("_id", *h).with("hits", *h))
            .collect();
        let order = vec![("hits".to_string(), Order::Asc)];
        let ids: Vec<Value> = sort_rows(rows, &order, Some(usize::MAX), reader)
            .iter()
            .map(|d| d.get("_id").cloned().unwrap_or(Value::Null))
            .collect();
        assert_eq!(ids, vec![lit(1), lit(100), lit(2), lit(30)]);
    }
}
