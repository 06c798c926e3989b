//! Applying nested JSON input to a record tree

use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::{FieldKind, PatchError, Record};

/// Who the input comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchMode {
    /// Request bodies: read-only and hidden fields are skipped
    Untrusted,
    /// Server-side synchronization: read-only and hidden fields are written too
    Trusted,
}

/// Everything a patch changed, keyed by field name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Changes {
    entries: BTreeMap<String, Change>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Value { old: Value, new: Value },
    Nested(Changes),
    Items(Vec<ItemChange>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemChange {
    pub id: Uuid,
    pub status: ItemStatus,
    pub changes: Changes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStatus {
    Updated,
    Created,
    Deleted,
}

impl Changes {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, field: &str) -> Option<&Change> {
        self.entries.get(field)
    }

    fn insert(&mut self, field: &str, change: Change) {
        self.entries.insert(field.to_string(), change);
    }

    /// `{"field": {"old": .., "new": ..}, "children": [{"id": .., "created": true, ..}]}`
    pub fn to_value(&self) -> Value {
        let map = self
            .entries
            .iter()
            .map(|(field, change)| (field.clone(), change.to_value()))
            .collect();
        Value::Object(map)
    }
}

impl Change {
    fn to_value(&self) -> Value {
        match self {
            Self::Value { old, new } => {
                let mut map = Map::new();
                map.insert("old".to_string(), old.clone());
                map.insert("new".to_string(), new.clone());
                Value::Object(map)
            }
            Self::Nested(changes) => changes.to_value(),
            Self::Items(items) => Value::Array(items.iter().map(ItemChange::to_value).collect()),
        }
    }
}

impl ItemChange {
    fn to_value(&self) -> Value {
        let mut map = match self.changes.to_value() {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        map.insert("id".to_string(), Value::String(self.id.to_string()));
        match self.status {
            ItemStatus::Created => {
                map.insert("created".to_string(), Value::Bool(true));
            }
            ItemStatus::Deleted => {
                map.insert("deleted".to_string(), Value::Bool(true));
            }
            ItemStatus::Updated => {}
        }
        Value::Object(map)
    }
}

impl Serialize for Changes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

/// Apply `input` to `record` and report what changed.
///
/// Keys without a descriptor are ignored. List relationships are reconciled
/// against the incoming list: matching ids are patched in place, unknown or
/// missing ids create new records and existing records left out are removed.
pub fn patch(
    record: &mut dyn Record,
    input: &Map<String, Value>,
    mode: PatchMode,
) -> Result<Changes, PatchError> {
    let changes = apply(record, input, mode)?;
    if !changes.is_empty() {
        record.touch(Utc::now());
    }
    Ok(changes)
}

fn apply(
    record: &mut dyn Record,
    input: &Map<String, Value>,
    mode: PatchMode,
) -> Result<Changes, PatchError> {
    let schema = record.schema();
    let mut changes = Changes::default();

    for field in schema.fields {
        let Some(incoming) = input.get(field.name) else {
            continue;
        };
        if !field.is_writable(mode) {
            continue;
        }

        match field.kind {
            FieldKind::Computed => {}
            FieldKind::Column => {
                let old = record.get(field.name).unwrap_or(Value::Null);
                if old == *incoming {
                    continue;
                }
                record.set(field.name, incoming.clone())?;
                let new = record.get(field.name).unwrap_or(Value::Null);
                if new != old {
                    changes.insert(field.name, Change::Value { old, new });
                }
            }
            FieldKind::Child => {
                if incoming.is_null() {
                    continue;
                }
                let object = incoming
                    .as_object()
                    .ok_or_else(|| PatchError::invalid(field.name, "expected an object"))?;
                if let Some(child) = record.child_mut(field.name) {
                    let nested = patch(child, object, mode)?;
                    if !nested.is_empty() {
                        changes.insert(field.name, Change::Nested(nested));
                    }
                }
            }
            FieldKind::Children => {
                let items = incoming
                    .as_array()
                    .ok_or_else(|| PatchError::invalid(field.name, "expected a list"))?;
                let entries = reconcile(record, field.name, items, mode)?;
                if !entries.is_empty() {
                    changes.insert(field.name, Change::Items(entries));
                }
            }
        }
    }

    Ok(changes)
}

fn reconcile(
    record: &mut dyn Record,
    field: &str,
    items: &[Value],
    mode: PatchMode,
) -> Result<Vec<ItemChange>, PatchError> {
    let parent = record.schema().entity;
    let parent_id = record.id();
    let Some(set) = record.children_mut(field) else {
        return Ok(Vec::new());
    };

    let mut keep: Vec<Uuid> = Vec::with_capacity(items.len());
    let mut entries = Vec::new();

    for item in items {
        let object = item
            .as_object()
            .ok_or_else(|| PatchError::invalid(field, "expected a list of objects"))?;
        let existing = object
            .get("id")
            .and_then(Value::as_str)
            .and_then(|raw| Uuid::parse_str(raw).ok())
            .filter(|id| !keep.contains(id));

        let found = match existing {
            Some(id) => set.find_mut(id),
            None => None,
        };

        match found {
            Some(child) => {
                let nested = patch(child, object, mode)?;
                let id = child.id();
                keep.push(id);
                if !nested.is_empty() {
                    entries.push(ItemChange {
                        id,
                        status: ItemStatus::Updated,
                        changes: nested,
                    });
                }
            }
            None => {
                let child = set.create();
                child.adopt(parent, parent_id);
                let nested = apply(child, object, mode)?;
                let id = child.id();
                keep.push(id);
                entries.push(ItemChange {
                    id,
                    status: ItemStatus::Created,
                    changes: nested,
                });
            }
        }
    }

    for id in set.retain_ids(&keep) {
        entries.push(ItemChange {
            id,
            status: ItemStatus::Deleted,
            changes: Changes::default(),
        });
    }

    Ok(entries)
}
