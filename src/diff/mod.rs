//! Contract diff engine.
//!
//! [`compute_diff`] produces the raw structural differences between two JSON
//! trees. [`consolidate`] prunes redundant removals, [`consolidate_with_dedup`]
//! additionally swaps DOM paths for dictionary references, and
//! [`group_by_domain_and_type`] / [`generate_diff_summary`] shape the result
//! for reporting.

mod compute;
mod consolidate;
mod group;
mod report;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use compute::{compute_diff, diff_contracts, strip_volatile};
pub use consolidate::{consolidate, consolidate_with_dedup, is_child_path, DedupResult};
pub use group::{
    generate_diff_summary, group_by_domain_and_type, ChangeCounts, DiffSummary, DomainChanges,
    Grouping, ROOT_DOMAIN,
};
pub use report::ContractDiffReport;

/// Kind of an elementary difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeType {
    /// Present only in the second tree.
    Add,
    /// Present only in the first tree.
    Remove,
    /// Present in both with different values.
    Change,
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Add => "ADD",
            Self::Remove => "REMOVE",
            Self::Change => "CHANGE",
        })
    }
}

/// One step from the contract root towards a value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Object key.
    Key(String),
    /// Array index.
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index(index) => write!(f, "[{index}]"),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// An elementary difference between two trees.
///
/// `V` is the value representation: plain JSON, or
/// [`crate::dom_path::DedupValue`] after deduplication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Difference<V = Value> {
    /// Kind of difference.
    #[serde(rename = "type")]
    pub kind: ChangeType,
    /// Keys and indexes from the root to the differing value.
    pub path: Vec<PathSegment>,
    /// Value before, for `REMOVE` and `CHANGE`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_value: Option<V>,
    /// Value after, for `ADD` and `CHANGE`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<V>,
}

impl<V> Difference<V> {
    /// An `ADD` of `value` at `path`.
    pub fn add(path: Vec<PathSegment>, value: V) -> Self {
        Self { kind: ChangeType::Add, path, old_value: None, value: Some(value) }
    }

    /// A `REMOVE` of `old_value` at `path`.
    pub fn remove(path: Vec<PathSegment>, old_value: V) -> Self {
        Self { kind: ChangeType::Remove, path, old_value: Some(old_value), value: None }
    }

    /// A `CHANGE` from `old_value` to `value` at `path`.
    pub fn change(path: Vec<PathSegment>, old_value: V, value: V) -> Self {
        Self { kind: ChangeType::Change, path, old_value: Some(old_value), value: Some(value) }
    }

    /// Dotted rendering of the path, e.g. `styles.rules.div` or
    /// `dom.children[0]`. Keys containing `.` are written as quoted
    /// brackets: `styles.rules[".card"].properties`.
    #[must_use]
    pub fn path_string(&self) -> String {
        let mut out = String::new();
        for segment in &self.path {
            match segment {
                PathSegment::Key(key) if key.contains('.') => {
                    out.push_str(&format!("[{}]", Value::from(key.as_str())));
                }
                PathSegment::Key(key) => {
                    if !out.is_empty() {
                        out.push('.');
                    }
                    out.push_str(key);
                }
                PathSegment::Index(index) => out.push_str(&format!("[{index}]")),
            }
        }
        out
    }
}

/// Builds a path from mixed keys and indexes: `path!["dom", 0, "tag"]`.
#[macro_export]
macro_rules! path {
    ($($segment:expr),* $(,)?) => {
        vec![$($crate::diff::PathSegment::from($segment)),*]
    };
}
