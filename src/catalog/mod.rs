pub mod types;

use crate::catalog::types::{ObjectId, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_ID_PATH: &str = "_id";

/// How a sort field's values are compared and carried in offset tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    /// Timestamps, compared and encoded as whole seconds.
    TimeOrdered,
    /// Object ids, whose ordering embeds their creation time.
    SequentialId,
    /// Integers and floats.
    Numeric,
    /// Anything else; offsets round-trip as literal strings.
    Generic,
}

/// Type of the unique id field that breaks ties in every sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum IdKind {
    #[default]
    ObjectId,
    Integer,
    Text,
}

impl IdKind {
    pub fn value_kind(self) -> ValueKind {
        match self {
            IdKind::ObjectId => ValueKind::SequentialId,
            IdKind::Integer => ValueKind::Numeric,
            IdKind::Text => ValueKind::Generic,
        }
    }

    pub fn parse(self, segment: &str) -> Option<Value> {
        if segment.is_empty() {
            return None;
        }
        match self {
            IdKind::ObjectId => ObjectId::parse_hex(segment).map(Value::ObjectId),
            IdKind::Integer => segment.parse::<i64>().ok().map(Value::Integer),
            IdKind::Text => Some(Value::Text(segment.into())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdField {
    pub path: String,
    pub kind: IdKind,
}

impl Default for IdField {
    fn default() -> Self {
        Self {
            path: DEFAULT_ID_PATH.to_string(),
            kind: IdKind::ObjectId,
        }
    }
}

/// Catalog entry: where a logical sort key lives and, optionally, its kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub path: String,
    #[serde(default)]
    pub kind: Option<ValueKind>,
}

impl FieldSpec {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            kind: None,
        }
    }

    pub fn typed(path: &str, kind: ValueKind) -> Self {
        Self {
            path: path.to_string(),
            kind: Some(kind),
        }
    }
}

/// Resolved physical sort field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortField {
    pub path: String,
    pub kind: ValueKind,
}

/// Logical sort keys a caller may request, plus the id tie-break field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldCatalog {
    id: IdField,
    #[serde(default)]
    fields: BTreeMap<String, FieldSpec>,
}

impl FieldCatalog {
    pub fn new(id_path: &str, id_kind: IdKind) -> Self {
        Self {
            id: IdField {
                path: id_path.to_string(),
                kind: id_kind,
            },
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: &str, entry: FieldSpec) -> Self {
        self.fields.insert(name.to_string(), entry);
        self
    }

    pub fn insert(&mut self, name: &str, entry: FieldSpec) -> Option<FieldSpec> {
        self.fields.insert(name.to_string(), entry)
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }

    pub fn id_field(&self) -> &IdField {
        &self.id
    }

    pub fn id_sort_field(&self) -> SortField {
        SortField {
            path: self.id.path.clone(),
            kind: self.id.kind.value_kind(),
        }
    }

    /// Maps `sort_by` to a physical field.
    ///
    /// Unknown keys fall back to the id field. A catalog path of `id` aliases
    /// the internal id field. Kinds come from the catalog, then from
    /// `introspect`, and finally degrade to [`ValueKind::Generic`].
    pub fn resolve<F>(&self, sort_by: &str, introspect: F) -> SortField
    where
        F: FnOnce(&str) -> Option<ValueKind>,
    {
        let Some(entry) = self.fields.get(sort_by) else {
            return self.id_sort_field();
        };
        let path = if entry.path == "id" || entry.path == self.id.path {
            self.id.path.clone()
        } else {
            entry.path.clone()
        };
        if let Some(kind) = entry.kind {
            return SortField { path, kind };
        }
        if path == self.id.path {
            return self.id_sort_field();
        }
        match introspect(&path) {
            Some(kind) => SortField { path, kind },
            None => {
                tracing::warn!(
                    sort_by,
                    path = %path,
                    "sort field kind unresolved; comparing as strings"
                );
                SortField {
                    path,
                    kind: ValueKind::Generic,
                }
            }
        }
    }
}
