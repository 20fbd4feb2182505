//! DOM-path dictionary: replaces repeated descendant-selector strings with
//! integer references so large diffs stay compact and stable.
//!
//! A path such as `div#root > span.foo > button.bar` is stored once in
//! [`DomPathDictionary::paths`]; every occurrence in a processed value
//! becomes a [`DomPathRef`] that serializes as `{"$domPath": 0}`.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Descendant combinator separating DOM path segments.
pub const PATH_SEPARATOR: &str = " > ";

/// Shortest string length considered DOM-path shaped (exclusive).
const MIN_PATH_LEN: usize = 20;

/// Reference to an entry of [`DomPathDictionary::paths`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DomPathRef {
    /// Index into the dictionary's path list.
    #[serde(rename = "$domPath")]
    pub index: usize,
}

/// Counters describing how much deduplication happened.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DictionaryStats {
    /// Every `add_path` call.
    pub total_paths: usize,
    /// Calls that inserted a new path.
    pub unique_paths: usize,
    /// Calls that hit an existing path.
    pub duplicate_references: usize,
    /// Approximate bytes saved by references over repeated literals.
    pub bytes_saved: usize,
}

/// Append-only table of DOM paths.
///
/// `paths[lookup[p]] == p` holds for every inserted `p`; indexes follow
/// insertion order and are never reused.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DomPathDictionary {
    /// Unique paths in insertion order.
    pub paths: Vec<String>,
    #[serde(skip)]
    lookup: HashMap<String, usize>,
    /// Deduplication counters.
    pub stats: DictionaryStats,
}

impl DomPathDictionary {
    /// Creates an empty dictionary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `path`, returning its stable reference.
    pub fn add_path(&mut self, path: &str) -> DomPathRef {
        self.stats.total_paths += 1;
        if let Some(&index) = self.lookup.get(path) {
            self.stats.duplicate_references += 1;
            let reference_len = format!("{{\"$domPath\":{index}}}").len();
            self.stats.bytes_saved += path.len().saturating_sub(reference_len);
            return DomPathRef { index };
        }
        let index = self.paths.len();
        self.paths.push(path.to_string());
        self.lookup.insert(path.to_string(), index);
        self.stats.unique_paths += 1;
        DomPathRef { index }
    }

    /// Index of `path` if it has been added.
    #[must_use]
    pub fn index_of(&self, path: &str) -> Option<usize> {
        self.lookup.get(path).copied()
    }

    /// Resolves a reference back to its path.
    #[must_use]
    pub fn resolve(&self, reference: DomPathRef) -> Option<&str> {
        self.paths.get(reference.index).map(String::as_str)
    }

    /// Number of unique paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Returns `true` when no path has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Heuristic: `s` looks like a descendant selector path.
///
/// Longer than 20 characters, contains `" > "`, contains a `.` or `#`, and
/// starts with a letter. Malformed strings such as ones embedding `@media`
/// still qualify; see [`is_valid_dom_path`].
#[must_use]
pub fn is_dom_path(s: &str) -> bool {
    s.len() > MIN_PATH_LEN
        && s.contains(PATH_SEPARATOR)
        && (s.contains('.') || s.contains('#'))
        && s.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
}

/// Stricter check used for deduplication: [`is_dom_path`], no media query
/// or braces, and more than two segments.
#[must_use]
pub fn is_valid_dom_path(s: &str) -> bool {
    is_dom_path(s)
        && !s.contains("@media")
        && !s.contains('{')
        && !s.contains('}')
        && s.split(PATH_SEPARATOR).count() > 2
}

/// A JSON value in which DOM paths may have been replaced by references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DedupValue {
    /// `null`
    Null,
    /// Boolean literal.
    Bool(bool),
    /// Numeric literal.
    Number(Number),
    /// String that was not deduplicated.
    String(String),
    /// Dictionary reference standing in for a DOM path.
    DomPath(DomPathRef),
    /// Array of values.
    Array(Vec<DedupValue>),
    /// Object of values, key order preserved.
    Object(IndexMap<String, DedupValue>),
}

impl DedupValue {
    /// Renders references back to literal paths using `dict`.
    ///
    /// A reference outside the dictionary is rendered as its marker object.
    #[must_use]
    pub fn expand(&self, dict: &DomPathDictionary) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Number(n) => Value::Number(n.clone()),
            Self::String(s) => Value::String(s.clone()),
            Self::DomPath(reference) => match dict.resolve(*reference) {
                Some(path) => Value::String(path.to_string()),
                None => serde_json::json!({ "$domPath": reference.index }),
            },
            Self::Array(items) => Value::Array(items.iter().map(|v| v.expand(dict)).collect()),
            Self::Object(map) => {
                Value::Object(map.iter().map(|(k, v)| (k.clone(), v.expand(dict))).collect())
            }
        }
    }
}

/// Walks `value`, replacing every string that passes [`is_valid_dom_path`]
/// with its dictionary reference. The input is left untouched.
pub fn process_paths(value: &Value, dict: &mut DomPathDictionary) -> DedupValue {
    match value {
        Value::Null => DedupValue::Null,
        Value::Bool(b) => DedupValue::Bool(*b),
        Value::Number(n) => DedupValue::Number(n.clone()),
        Value::String(s) if is_valid_dom_path(s) => DedupValue::DomPath(dict.add_path(s)),
        Value::String(s) => DedupValue::String(s.clone()),
        Value::Array(items) => {
            DedupValue::Array(items.iter().map(|v| process_paths(v, dict)).collect())
        }
        Value::Object(map) => DedupValue::Object(
            map.iter().map(|(k, v)| (k.clone(), process_paths(v, dict))).collect(),
        ),
    }
}
