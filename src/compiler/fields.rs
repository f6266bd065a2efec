use serde_json::{Map, Value};

/// Lenient accessor over a node's `data` map.
///
/// Canvas forms store whatever the input widget produced, so a temperature may arrive as
/// `0.7` or `"0.7"`. Missing keys, `null` and whitespace-only strings all read as blank.
#[derive(Clone, Copy)]
pub(crate) struct FieldReader<'a> {
    data: &'a Map<String, Value>,
}

impl<'a> FieldReader<'a> {
    pub(crate) fn new(data: &'a Map<String, Value>) -> Self {
        Self { data }
    }

    fn present(&self, key: &str) -> Option<&'a Value> {
        match self.data.get(key)? {
            Value::Null => None,
            Value::String(s) if s.trim().is_empty() => None,
            other => Some(other),
        }
    }

    pub(crate) fn text(&self, key: &str) -> Option<String> {
        match self.present(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// The first non-blank text among `keys`.
    pub(crate) fn first_text(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| self.text(key))
    }

    pub(crate) fn number(&self, key: &str) -> Option<f64> {
        match self.present(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub(crate) fn integer(&self, key: &str) -> Option<u64> {
        match self.present(key)? {
            Value::Number(n) => n.as_u64().or_else(|| n.as_f64().map(|f| f as u64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub(crate) fn flag(&self, key: &str) -> Option<bool> {
        match self.present(key)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}
