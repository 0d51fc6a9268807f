use crate::catalog::types::{FieldAccess, ObjectId, Value};
use crate::catalog::{IdField, IdKind, SortField, ValueKind};
use thiserror::Error;

/// Separates the id segment from the field-offset segment. Part of the
/// token format clients echo back, so it must not change.
pub const SEPARATOR: char = '-';

/// Decoded resume position: the last row seen, as `(field, id)`.
///
/// `field` is `None` when the row's sort value was null or when the sort
/// runs on the id field itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeekKey {
    pub id: Value,
    pub field: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CursorError {
    #[error("offset token is empty")]
    Empty,
    #[error("offset token has no id segment")]
    MissingId,
    #[error("offset id '{segment}' is not a valid {kind:?} id")]
    InvalidId { segment: String, kind: IdKind },
    #[error("field offset '{segment}' is not a valid {kind:?} value")]
    InvalidFieldOffset { segment: String, kind: ValueKind },
}

/// Encodes and decodes offset tokens for one sort field.
///
/// Tokens look like `<id>` or `<id>-<field>`. The id segment ends at the
/// first separator, so ids must not contain `-`; field segments may.
#[derive(Debug, Clone, Copy)]
pub struct CursorCodec<'a> {
    sort_field: &'a SortField,
    id_field: &'a IdField,
}

impl<'a> CursorCodec<'a> {
    pub fn new(sort_field: &'a SortField, id_field: &'a IdField) -> Self {
        Self {
            sort_field,
            id_field,
        }
    }

    fn sorts_by_id(&self) -> bool {
        self.sort_field.path == self.id_field.path
    }

    /// Lenient decode: a missing or malformed token means "no offset".
    pub fn decode(&self, token: Option<&str>) -> Option<SeekKey> {
        let token = token?;
        match self.try_decode(token) {
            Ok(key) => Some(key),
            Err(err) => {
                tracing::debug!(%err, token, "ignoring malformed offset token");
                None
            }
        }
    }

    pub fn try_decode(&self, token: &str) -> Result<SeekKey, CursorError> {
        if token.is_empty() {
            return Err(CursorError::Empty);
        }
        let (id_segment, field_segment) = match token.split_once(SEPARATOR) {
            Some((id, field)) => (id, Some(field)),
            None => (token, None),
        };
        if id_segment.is_empty() {
            return Err(CursorError::MissingId);
        }
        let id = self
            .id_field
            .kind
            .parse(id_segment)
            .ok_or_else(|| CursorError::InvalidId {
                segment: id_segment.to_string(),
                kind: self.id_field.kind,
            })?;
        let field = match field_segment {
            Some(segment) if !self.sorts_by_id() => {
                Some(decode_field(segment, self.sort_field.kind)?)
            }
            _ => None,
        };
        Ok(SeekKey { id, field })
    }

    /// Token that resumes right after `doc`; `None` if `doc` has no id.
    pub fn encode<D: FieldAccess + ?Sized>(&self, doc: &D) -> Option<String> {
        let id = doc
            .field(&self.id_field.path)
            .filter(|value| !value.is_null())?;
        if self.sorts_by_id() {
            return Some(id.to_string());
        }
        match doc.field(&self.sort_field.path) {
            None | Some(Value::Null) => Some(id.to_string()),
            Some(value) => Some(format!(
                "{id}{SEPARATOR}{}",
                encode_field(&value)
            )),
        }
    }
}

// Object ids encode as full hex under every kind so the offset decodes back
// to the stored type. Non-finite floats print as `NaN`/`inf`, which parse back.
fn encode_field(value: &Value) -> String {
    value.to_string()
}

fn decode_field(segment: &str, kind: ValueKind) -> Result<Value, CursorError> {
    let invalid = || CursorError::InvalidFieldOffset {
        segment: segment.to_string(),
        kind,
    };
    match kind {
        ValueKind::TimeOrdered => {
            if let Some(oid) = ObjectId::parse_hex(segment) {
                return Ok(Value::ObjectId(oid));
            }
            segment
                .parse::<i64>()
                .map(Value::Timestamp)
                .map_err(|_| invalid())
        }
        ValueKind::SequentialId => {
            if let Some(oid) = ObjectId::parse_hex(segment) {
                return Ok(Value::ObjectId(oid));
            }
            segment
                .parse::<u32>()
                .map(|secs| Value::ObjectId(ObjectId::from_timestamp(secs)))
                .map_err(|_| invalid())
        }
        ValueKind::Numeric => {
            if let Ok(i) = segment.parse::<i64>() {
                return Ok(Value::Integer(i));
            }
            segment
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| invalid())
        }
        ValueKind::Generic => Ok(Value::Text(segment.into())),
    }
}
