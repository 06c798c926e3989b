//! Projecting a record tree into a JSON document

use serde_json::{Map, Value};

use super::{FieldKind, Record};
use crate::constants::MAX_SERIALIZE_DEPTH;

/// Which fields to render, as dotted paths rooted at the entity name
/// (`"ranks.user"` on a hackathon means `"hackathon.ranks.user"`).
#[derive(Debug, Clone, Default)]
pub struct Projection {
    pub show: Vec<String>,
    pub hide: Vec<String>,
    /// Render every visible column at each level reached
    pub show_all: bool,
}

impl Projection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.show.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn hide<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hide.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn all(mut self) -> Self {
        self.show_all = true;
        self
    }

    /// Parse comma-separated `show`/`hide` query parameters
    pub fn from_query(show: Option<&str>, hide: Option<&str>) -> Self {
        let split = |raw: Option<&str>| -> Vec<String> {
            raw.map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
        };
        Self {
            show: split(show),
            hide: split(hide),
            show_all: false,
        }
    }
}

/// Render a record. `id` is always present, hidden fields never are, and
/// relationships are only followed when named in `show` or marked default.
pub fn to_value(record: &dyn Record, projection: &Projection) -> Value {
    let root = record.schema().entity;
    let show: Vec<String> = projection.show.iter().filter_map(|p| scoped(root, p)).collect();
    let hide: Vec<String> = projection.hide.iter().filter_map(|p| scoped(root, p)).collect();

    Value::Object(render(record, root, &show, &hide, projection.show_all, 0))
}

fn scoped(root: &str, path: &str) -> Option<String> {
    let path = path.trim().to_lowercase();
    if path.is_empty() {
        return None;
    }
    if path.split('.').next() == Some(root) {
        return Some(path);
    }
    Some(format!("{}.{}", root, path.trim_start_matches('.')))
}

fn render(
    record: &dyn Record,
    path: &str,
    show: &[String],
    hide: &[String],
    show_all: bool,
    depth: usize,
) -> Map<String, Value> {
    let mut out = Map::new();

    for field in record.schema().fields {
        let check = format!("{}.{}", path, field.name);
        if field.hidden || hide.contains(&check) {
            continue;
        }
        let listed = show.contains(&check);

        match field.kind {
            FieldKind::Column | FieldKind::Computed => {
                if show_all || field.name == "id" || listed || field.default {
                    out.insert(
                        field.name.to_string(),
                        record.get(field.name).unwrap_or(Value::Null),
                    );
                }
            }
            FieldKind::Child => {
                if (listed || field.default) && depth < MAX_SERIALIZE_DEPTH {
                    let value = record
                        .child(field.name)
                        .map(|child| {
                            Value::Object(render(child, &check, show, hide, show_all, depth + 1))
                        })
                        .unwrap_or(Value::Null);
                    out.insert(field.name.to_string(), value);
                }
            }
            FieldKind::Children => {
                if (listed || field.default) && depth < MAX_SERIALIZE_DEPTH {
                    let items: Vec<Value> = record
                        .children(field.name)
                        .map(|set| {
                            set.records()
                                .into_iter()
                                .map(|child| {
                                    Value::Object(render(
                                        child,
                                        &check,
                                        show,
                                        hide,
                                        show_all,
                                        depth + 1,
                                    ))
                                })
                                .collect()
                        })
                        .unwrap_or_default();
                    out.insert(field.name.to_string(), Value::Array(items));
                }
            }
        }
    }

    out
}
