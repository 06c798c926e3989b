//! Record mapping between persisted models and nested JSON documents
//!
//! Every entity publishes a static [`Schema`]: one [`Field`] descriptor per
//! column, derived value or relationship. The generic [`patch`] and
//! [`to_value`] routines only ever consult that table through the
//! object-safe [`Record`] trait, so a request body can update a whole tree
//! of related records and a response can be projected with dotted
//! show/hide paths without any per-entity glue.

mod patch;
mod serialize;

pub use patch::{patch, Change, Changes, ItemChange, ItemStatus, PatchMode};
pub use serialize::{to_value, Projection};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use crate::constants::DATETIME_FORMAT;

/// Field names that no patch may ever write
pub const ALWAYS_PROTECTED: &[&str] = &[
    "id",
    "created",
    "updated",
    "modified",
    "created_at",
    "updated_at",
    "modified_at",
];

/// What a descriptor points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Stored column
    Column,
    /// Derived, read-only value
    Computed,
    /// Single related record
    Child,
    /// List of related records
    Children,
}

/// Field descriptor
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Skipped by untrusted patches
    pub read_only: bool,
    /// Never serialized and skipped by untrusted patches
    pub hidden: bool,
    /// Serialized without being listed in `show`
    pub default: bool,
}

impl Field {
    const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            read_only: false,
            hidden: false,
            default: false,
        }
    }

    pub const fn column(name: &'static str) -> Self {
        Self::new(name, FieldKind::Column)
    }

    pub const fn computed(name: &'static str) -> Self {
        Self::new(name, FieldKind::Computed)
    }

    pub const fn child(name: &'static str) -> Self {
        Self::new(name, FieldKind::Child)
    }

    pub const fn children(name: &'static str) -> Self {
        Self::new(name, FieldKind::Children)
    }

    pub const fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub const fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub const fn shown(mut self) -> Self {
        self.default = true;
        self
    }

    /// Whether a patch in the given mode may write this field
    pub fn is_writable(&self, mode: PatchMode) -> bool {
        if ALWAYS_PROTECTED.contains(&self.name) || self.kind == FieldKind::Computed {
            return false;
        }
        match mode {
            PatchMode::Trusted => true,
            PatchMode::Untrusted => !self.read_only && !self.hidden,
        }
    }
}

/// Per-entity descriptor table
#[derive(Debug)]
pub struct Schema {
    /// Lower-case entity name, the root of every dotted path
    pub entity: &'static str,
    pub fields: &'static [Field],
}

impl Schema {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Errors raised while applying a patch
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PatchError {
    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("`{0}` cannot be written")]
    NotWritable(String),
}

impl PatchError {
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// A persisted entity the generic patch/serialize routines can walk
pub trait Record {
    fn schema(&self) -> &'static Schema;

    fn id(&self) -> Uuid;

    /// JSON value of a column or computed field
    fn get(&self, field: &str) -> Option<Value>;

    /// Decode and store a column value
    fn set(&mut self, field: &str, value: Value) -> Result<(), PatchError>;

    fn child(&self, _field: &str) -> Option<&dyn Record> {
        None
    }

    fn child_mut(&mut self, _field: &str) -> Option<&mut dyn Record> {
        None
    }

    fn children(&self, _field: &str) -> Option<&dyn RecordSet> {
        None
    }

    fn children_mut(&mut self, _field: &str) -> Option<&mut dyn RecordSet> {
        None
    }

    /// Link a freshly created record to the parent it was created under
    fn adopt(&mut self, _parent: &str, _parent_id: Uuid) {}

    /// Stamp the modification time after a patch changed something
    fn touch(&mut self, _now: DateTime<Utc>) {}
}

/// A list relationship
pub trait RecordSet {
    fn records(&self) -> Vec<&dyn Record>;

    fn find_mut(&mut self, id: Uuid) -> Option<&mut dyn Record>;

    /// Append a new record with a fresh id
    fn create(&mut self) -> &mut dyn Record;

    /// Drop every record whose id is not in `keep`, returning the dropped ids
    fn retain_ids(&mut self, keep: &[Uuid]) -> Vec<Uuid>;
}

impl<T: Record + Default> RecordSet for Vec<T> {
    fn records(&self) -> Vec<&dyn Record> {
        self.iter().map(|r| r as &dyn Record).collect()
    }

    fn find_mut(&mut self, id: Uuid) -> Option<&mut dyn Record> {
        self.iter_mut()
            .find(|r| r.id() == id)
            .map(|r| r as &mut dyn Record)
    }

    fn create(&mut self) -> &mut dyn Record {
        self.push(T::default());
        let last = self.len() - 1;
        &mut self[last]
    }

    fn retain_ids(&mut self, keep: &[Uuid]) -> Vec<Uuid> {
        let removed = self
            .iter()
            .map(|r| r.id())
            .filter(|id| !keep.contains(id))
            .collect();
        self.retain(|r| keep.contains(&r.id()));
        removed
    }
}

/// Decode a patch value into a typed field
pub fn decode<T: DeserializeOwned>(field: &str, value: Value) -> Result<T, PatchError> {
    serde_json::from_value(value).map_err(|e| PatchError::invalid(field, e.to_string()))
}

pub fn datetime_value(dt: &DateTime<Utc>) -> Value {
    Value::String(dt.format(DATETIME_FORMAT).to_string())
}

pub fn optional_datetime_value(dt: &Option<DateTime<Utc>>) -> Value {
    dt.as_ref().map(datetime_value).unwrap_or(Value::Null)
}
