use serde_json::{Map, Value};

/// A decoded response that is valid JSON but does not have the shape we need
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("expected a list of {0}")]
    NotAList(&'static str),
    #[error("{kind} {index} is not an object")]
    NotAnObject { kind: &'static str, index: usize },
    #[error("{kind} {index}: missing field `{field}`")]
    MissingField {
        kind: &'static str,
        index: usize,
        field: &'static str,
    },
    #[error("{kind} {index}: field `{field}` must be {expected}")]
    WrongType {
        kind: &'static str,
        index: usize,
        field: &'static str,
        expected: &'static str,
    },
    #[error("task {index}: priority {value} is not one of 1, 2, 3, 4")]
    InvalidPriority { index: usize, value: String },
    #[error("{kind} {index}: duplicate id {id}")]
    DuplicateId {
        kind: &'static str,
        index: usize,
        id: String,
    },
}

/// Borrow the elements of a decoded JSON array.
pub(crate) fn as_list<'a>(raw: &'a Value, kind: &'static str) -> Result<&'a [Value], SchemaError> {
    raw.as_array()
        .map(Vec::as_slice)
        .ok_or(SchemaError::NotAList(kind))
}

/// A single record inside a list, with enough context to name it in errors.
pub(crate) struct Record<'a> {
    kind: &'static str,
    index: usize,
    fields: &'a Map<String, Value>,
}

impl<'a> Record<'a> {
    pub(crate) fn new(kind: &'static str, index: usize, value: &'a Value) -> Result<Self, SchemaError> {
        let fields = value
            .as_object()
            .ok_or(SchemaError::NotAnObject { kind, index })?;
        Ok(Record {
            kind,
            index,
            fields,
        })
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }

    /// A field that must be present, whatever its type
    pub(crate) fn required(&self, field: &'static str) -> Result<&'a Value, SchemaError> {
        match self.fields.get(field) {
            Some(Value::Null) | None => Err(SchemaError::MissingField {
                kind: self.kind,
                index: self.index,
                field,
            }),
            Some(value) => Ok(value),
        }
    }

    /// A field that must be present and textual
    pub(crate) fn required_str(&self, field: &'static str) -> Result<String, SchemaError> {
        self.required(field)?
            .as_str()
            .map(str::to_string)
            .ok_or(SchemaError::WrongType {
                kind: self.kind,
                index: self.index,
                field,
                expected: "a string",
            })
    }

    /// A textual field that may be absent or null; other types are ignored
    pub(crate) fn optional_str(&self, field: &str) -> Option<String> {
        self.fields
            .get(field)
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    pub(crate) fn optional_bool(&self, field: &str) -> bool {
        self.fields
            .get(field)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub(crate) fn optional(&self, field: &str) -> Option<&'a Value> {
        self.fields.get(field).filter(|v| !v.is_null())
    }

    pub(crate) fn duplicate(&self, id: &str) -> SchemaError {
        SchemaError::DuplicateId {
            kind: self.kind,
            index: self.index,
            id: id.to_string(),
        }
    }
}
