//! Core types shared by argument unification, input decoding and the request.

use indexmap::IndexMap;
use serde::Serialize;

/// Key-value pair type for flat parameters (query string, urlencoded body).
pub type ParamList = Vec<(String, String)>;

/// Ordered mapping from field name to argument value.
///
/// Order matters: it follows the order in which fields were submitted.
pub type Arguments = IndexMap<String, Value>;

// =============================================================================
// Value
// =============================================================================

/// A node of an argument tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Leaf value, kept as the decoded string.
    Scalar(String),
    /// Nested tree, e.g. the `avatar` level of `photo[avatar][main]`.
    Map(Arguments),
}

impl Value {
    /// Create an empty map node.
    #[inline]
    pub fn map() -> Self {
        Value::Map(Arguments::new())
    }

    /// Returns the scalar string, if this is a leaf.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Scalar(s) => Some(s),
            Value::Map(_) => None,
        }
    }

    /// Returns the nested tree, if this is a map.
    #[inline]
    pub fn as_map(&self) -> Option<&Arguments> {
        match self {
            Value::Map(m) => Some(m),
            Value::Scalar(_) => None,
        }
    }

    #[inline]
    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    /// Loose emptiness check: `""`, `"0"` and empty maps count as empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Scalar(s) => s.is_empty() || s == "0",
            Value::Map(m) => m.is_empty(),
        }
    }

    /// Look up the node at `path` below this one.
    ///
    /// An empty path returns `self`.
    pub fn get_path<S: AsRef<str>>(&self, path: &[S]) -> Option<&Value> {
        let mut current = self;
        for segment in path {
            current = current.as_map()?.get(segment.as_ref())?;
        }
        Some(current)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Scalar(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Scalar(s)
    }
}

impl From<Arguments> for Value {
    fn from(m: Arguments) -> Self {
        Value::Map(m)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Scalar(String::new()),
            serde_json::Value::Bool(true) => Value::Scalar("1".to_string()),
            serde_json::Value::Bool(false) => Value::Scalar(String::new()),
            serde_json::Value::Number(n) => Value::Scalar(n.to_string()),
            serde_json::Value::String(s) => Value::Scalar(s),
            serde_json::Value::Array(items) => Value::Map(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(i, v)| (i.to_string(), Value::from(v)))
                    .collect(),
            ),
            serde_json::Value::Object(fields) => Value::Map(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

// =============================================================================
// Path helpers
// =============================================================================

/// Look up the value at `path` in `args`.
pub fn get_path<'a, S: AsRef<str>>(args: &'a Arguments, path: &[S]) -> Option<&'a Value> {
    let (first, rest) = path.split_first()?;
    args.get(first.as_ref())?.get_path(rest)
}

/// Write `value` at `path`, creating intermediate maps as needed.
///
/// Scalars met on the way are replaced by maps. An empty path is a no-op.
pub fn set_path<S: AsRef<str>>(args: &mut Arguments, path: &[S], value: Value) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };

    let mut current = args;
    for segment in parents {
        let slot = current
            .entry(segment.as_ref().to_string())
            .or_insert_with(Value::map);
        if !slot.is_map() {
            *slot = Value::map();
        }
        let Value::Map(next) = slot else {
            return;
        };
        current = next;
    }
    current.insert(last.as_ref().to_string(), value);
}

/// Convert a JSON object into an argument tree.
///
/// Non-object JSON values produce an empty tree.
pub fn arguments_from_json(json: serde_json::Value) -> Arguments {
    match Value::from(json) {
        Value::Map(m) => m,
        Value::Scalar(_) => Arguments::new(),
    }
}
