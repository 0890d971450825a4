//! Indexable record types.
//!
//! An `IndexableRecord` is the flat, serializable projection of a commerce
//! object that gets pushed to an index provider and returned to the UI.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The field every record is keyed by.
pub const ID_FIELD: &str = "id";

/// Identifier of a record inside an entity collection.
///
/// Commerce objects are keyed by their own numeric id; string ids are accepted
/// for externally registered entity types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(u64),
    Str(String),
}

impl RecordId {
    /// Whether the id can be used as an index key.
    ///
    /// Zero and empty strings are treated as missing ids.
    pub fn is_resolvable(&self) -> bool {
        match self {
            RecordId::Int(id) => *id != 0,
            RecordId::Str(id) => !id.trim().is_empty(),
        }
    }

    /// Read an id out of a JSON value.
    ///
    /// Numeric strings are kept as strings; the caller decides how to key them.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_u64().map(RecordId::Int),
            Value::String(s) => Some(RecordId::Str(s.clone())),
            _ => None,
        }
    }

    /// Convert the id to a JSON value.
    pub fn to_value(&self) -> Value {
        match self {
            RecordId::Int(id) => Value::from(*id),
            RecordId::Str(id) => Value::from(id.as_str()),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(id) => write!(f, "{}", id),
            RecordId::Str(id) => f.write_str(id),
        }
    }
}

impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        RecordId::Int(id)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        RecordId::Str(id.to_string())
    }
}

/// Flat record produced by an entity mapper.
///
/// Fields are plain JSON values so providers can serialize them without
/// knowing anything about the commerce types. Keys are kept sorted, which
/// makes serialization of equal records byte-identical.
///
/// An empty record means "nothing to index" and is what mappers return when
/// handed an object of the wrong kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndexableRecord {
    fields: Map<String, Value>,
}

impl IndexableRecord {
    /// Create an empty record.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a record keyed by `id`.
    pub fn new(id: impl Into<RecordId>) -> Self {
        let mut record = Self::default();
        record.insert(ID_FIELD, id.into().to_value());
        record
    }

    /// Build a record from an existing JSON object.
    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Builder-style field insertion.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a field.
    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.fields.insert(key.to_string(), value.into());
    }

    /// Remove a field, returning its previous value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Read a string field.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// The record id, if present.
    pub fn id(&self) -> Option<RecordId> {
        self.fields.get(ID_FIELD).and_then(RecordId::from_value)
    }

    /// The record id, only if it is usable as an index key.
    pub fn resolvable_id(&self) -> Option<RecordId> {
        self.id().filter(RecordId::is_resolvable)
    }

    /// Iterate over the field names in order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.fields
    }

    /// Convert into a JSON object value.
    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }

    /// Keep only the given fields, always keeping `id`.
    ///
    /// An empty field list keeps every field.
    pub fn project(&self, display_fields: &[String]) -> IndexableRecord {
        if display_fields.is_empty() {
            return self.clone();
        }

        let fields = self
            .fields
            .iter()
            .filter(|(key, _)| key.as_str() == ID_FIELD || display_fields.contains(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        IndexableRecord { fields }
    }

    /// Resolve a dotted path (`meta.billing_address.city`) against the record.
    pub fn lookup_path(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.fields.get(first)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }
}
