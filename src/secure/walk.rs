use crate::error::CodecError;
use serde_json::{Map, Value};

/// Field names sealed by default.
pub const DEFAULT_SENSITIVE_FIELDS: &[&str] = &["apiKey", "password", "username", "webhookUrl"];

/// The set of object keys whose string values are secrets.
#[derive(Debug, Clone)]
pub struct SensitiveFields {
    keys: Vec<String>,
}

impl Default for SensitiveFields {
    fn default() -> Self {
        Self {
            keys: DEFAULT_SENSITIVE_FIELDS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl SensitiveFields {
    pub fn insert(&mut self, key: &str) {
        if !self.contains(key) {
            self.keys.push(key.to_string());
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }
}

/// A sensitive field the walk could not process.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFailure {
    /// Location of the field, e.g. `nodes[2].data.apiKey`.
    pub path: String,
    pub error: CodecError,
    /// `true` when the stored value was replaced with an empty string.
    pub cleared: bool,
}

/// What a transform decided for one sensitive string.
pub enum FieldAction {
    Keep,
    Replace(String),
}

/// Rebuilds `value`, handing every non-empty string stored under a sensitive key to
/// `transform`.
///
/// Objects and arrays are walked at any depth; a sensitive key holding a container is
/// walked like any other. Everything else is copied unchanged.
pub fn map_sensitive<P, T>(value: &Value, path: &str, is_sensitive: &P, transform: &mut T) -> Value
where
    P: Fn(&str) -> bool,
    T: FnMut(&str, &str) -> FieldAction,
{
    match value {
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, child) in map {
                let child_path = join(path, key);
                let mapped = match child {
                    Value::String(s) if is_sensitive(key) && !s.is_empty() => {
                        match transform(&child_path, s) {
                            FieldAction::Keep => child.clone(),
                            FieldAction::Replace(new) => Value::String(new),
                        }
                    }
                    _ => map_sensitive(child, &child_path, is_sensitive, transform),
                };
                out.insert(key.clone(), mapped);
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    map_sensitive(item, &format!("{path}[{i}]"), is_sensitive, transform)
                })
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Visits every non-empty sensitive string without rebuilding anything.
pub fn any_sensitive<P, F>(value: &Value, is_sensitive: &P, predicate: &mut F) -> bool
where
    P: Fn(&str) -> bool,
    F: FnMut(&str) -> bool,
{
    match value {
        Value::Object(map) => map.iter().any(|(key, child)| match child {
            Value::String(s) if is_sensitive(key) && !s.is_empty() => predicate(s),
            _ => any_sensitive(child, is_sensitive, predicate),
        }),
        Value::Array(items) => items
            .iter()
            .any(|item| any_sensitive(item, is_sensitive, predicate)),
        _ => false,
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}
