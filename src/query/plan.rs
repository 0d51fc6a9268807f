use crate::catalog::types::Value;
use crate::error::PaginateError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Order {
    #[default]
    Asc,
    Desc,
}

impl Order {
    pub fn reversed(self) -> Self {
        match self {
            Order::Asc => Order::Desc,
            Order::Desc => Order::Asc,
        }
    }
}

impl FromStr for Order {
    type Err = PaginateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("asc") {
            Ok(Order::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(Order::Desc)
        } else {
            Err(PaginateError::InvalidOrder {
                value: s.to_string(),
            })
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Order::Asc => f.write_str("asc"),
            Order::Desc => f.write_str("desc"),
        }
    }
}

/// Predicate tree over document field paths.
///
/// Comparison operators never match a null or missing field; use
/// [`Expr::IsNull`] to select those rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expr {
    Eq(String, Value),
    Ne(String, Value),
    Lt(String, Value),
    Lte(String, Value),
    Gt(String, Value),
    Gte(String, Value),
    In(String, Vec<Value>),
    IsNull(String),
    IsNotNull(String),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
}

impl Expr {
    pub fn and(self, rhs: Expr) -> Expr {
        Expr::And(Box::new(self), Box::new(rhs))
    }

    pub fn or(self, rhs: Expr) -> Expr {
        Expr::Or(Box::new(self), Box::new(rhs))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Expr {
        Expr::Not(Box::new(self))
    }

    /// Left-folds `exprs` with AND; `None` when empty.
    pub fn all<I: IntoIterator<Item = Expr>>(exprs: I) -> Option<Expr> {
        exprs.into_iter().reduce(Expr::and)
    }

    /// Left-folds `exprs` with OR; `None` when empty.
    pub fn any<I: IntoIterator<Item = Expr>>(exprs: I) -> Option<Expr> {
        exprs.into_iter().reduce(Expr::or)
    }
}

/// Backend-neutral query handed to a [`Collection`](crate::query::Collection).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub predicate: Option<Expr>,
    pub order_by: Vec<(String, Order)>,
    /// Field paths to keep; empty keeps every field.
    pub select: Vec<String>,
    pub skip: usize,
    pub limit: Option<usize>,
    /// Paths whose non-null values sort and compare by their string form,
    /// in both `order_by` and the predicate.
    pub text_collated: Vec<String>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn where_(mut self, expr: Expr) -> Self {
        self.predicate = Some(expr);
        self
    }

    /// ANDs `expr` onto any existing predicate.
    pub fn and_where(mut self, expr: Expr) -> Self {
        self.predicate = Some(match self.predicate.take() {
            Some(existing) => existing.and(expr),
            None => expr,
        });
        self
    }

    pub fn order_by(mut self, col: &str, order: Order) -> Self {
        self.order_by.push((col.to_string(), order));
        self
    }

    pub fn with_order(mut self, order_by: Vec<(String, Order)>) -> Self {
        self.order_by = order_by;
        self
    }

    /// Same query with every sort direction flipped.
    pub fn inverted(mut self) -> Self {
        for (_, order) in &mut self.order_by {
            *order = order.reversed();
        }
        self
    }

    /// Sort direction declared for `field`, if the query orders by it.
    pub fn direction_of(&self, field: &str) -> Option<Order> {
        self.order_by
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, order)| *order)
    }

    pub fn collate_as_text(mut self, path: &str) -> Self {
        if !self.collates_as_text(path) {
            self.text_collated.push(path.to_string());
        }
        self
    }

    pub fn collates_as_text(&self, path: &str) -> bool {
        self.text_collated.iter().any(|p| p == path)
    }

    pub fn select(mut self, cols: &[&str]) -> Self {
        self.select = cols.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn skip(mut self, n: usize) -> Self {
        self.skip = n;
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }
}

pub struct ColumnRef(String);

pub fn col(name: &str) -> ColumnRef {
    ColumnRef(name.to_string())
}

pub fn lit<T: Into<Value>>(value: T) -> Value {
    value.into()
}

impl ColumnRef {
    pub fn eq(self, value: Value) -> Expr {
        Expr::Eq(self.0, value)
    }

    pub fn neq(self, value: Value) -> Expr {
        Expr::Ne(self.0, value)
    }

    pub fn gt(self, value: Value) -> Expr {
        Expr::Gt(self.0, value)
    }

    pub fn gte(self, value: Value) -> Expr {
        Expr::Gte(self.0, value)
    }

    pub fn lt(self, value: Value) -> Expr {
        Expr::Lt(self.0, value)
    }

    pub fn lte(self, value: Value) -> Expr {
        Expr::Lte(self.0, value)
    }

    pub fn in_(self, values: Vec<Value>) -> Expr {
        Expr::In(self.0, values)
    }

    pub fn is_null(self) -> Expr {
        Expr::IsNull(self.0)
    }

    pub fn is_not_null(self) -> Expr {
        Expr::IsNotNull(self.0)
    }
}
