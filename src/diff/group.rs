//! Domain grouping and summary statistics.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{ChangeType, Difference, PathSegment};

/// Domain for differences with an empty path (whole-document replacement).
pub const ROOT_DOMAIN: &str = "(root)";

/// Differences of one domain, split by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainChanges<V> {
    /// Additions.
    #[serde(rename = "ADD")]
    pub add: Vec<Difference<V>>,
    /// Removals.
    #[serde(rename = "REMOVE")]
    pub remove: Vec<Difference<V>>,
    /// Changes.
    #[serde(rename = "CHANGE")]
    pub change: Vec<Difference<V>>,
}

impl<V> Default for DomainChanges<V> {
    fn default() -> Self {
        Self { add: Vec::new(), remove: Vec::new(), change: Vec::new() }
    }
}

impl<V> DomainChanges<V> {
    fn bucket(&mut self, kind: ChangeType) -> &mut Vec<Difference<V>> {
        match kind {
            ChangeType::Add => &mut self.add,
            ChangeType::Remove => &mut self.remove,
            ChangeType::Change => &mut self.change,
        }
    }

    /// Total differences in this domain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.add.len() + self.remove.len() + self.change.len()
    }

    /// Returns `true` when the domain holds no differences.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Domain (first path segment) → differences by kind, in first-seen order.
pub type Grouping<V = serde_json::Value> = IndexMap<String, DomainChanges<V>>;

fn domain_of<V>(diff: &Difference<V>) -> String {
    match diff.path.first() {
        Some(PathSegment::Key(key)) => key.clone(),
        Some(index @ PathSegment::Index(_)) => index.to_string(),
        None => ROOT_DOMAIN.to_string(),
    }
}

/// Partitions `diffs` by domain, then by kind. Unknown domains are kept
/// under their literal first segment.
#[must_use]
pub fn group_by_domain_and_type<V: Clone>(diffs: &[Difference<V>]) -> Grouping<V> {
    let mut grouping: Grouping<V> = IndexMap::new();
    for diff in diffs {
        grouping
            .entry(domain_of(diff))
            .or_insert_with(DomainChanges::default)
            .bucket(diff.kind)
            .push(diff.clone());
    }
    grouping
}

/// Counts per difference kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeCounts {
    /// Additions.
    #[serde(rename = "ADD")]
    pub add: usize,
    /// Removals.
    #[serde(rename = "REMOVE")]
    pub remove: usize,
    /// Changes.
    #[serde(rename = "CHANGE")]
    pub change: usize,
}

impl ChangeCounts {
    fn record(&mut self, kind: ChangeType) {
        match kind {
            ChangeType::Add => self.add += 1,
            ChangeType::Remove => self.remove += 1,
            ChangeType::Change => self.change += 1,
        }
    }

    /// Sum over all kinds.
    #[must_use]
    pub fn total(&self) -> usize {
        self.add + self.remove + self.change
    }
}

/// Headline numbers for a diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffSummary {
    /// Number of differences.
    pub total_changes: usize,
    /// Counts per kind.
    pub change_types: ChangeCounts,
    /// Counts per kind within each domain.
    pub changes_by_domain: IndexMap<String, ChangeCounts>,
}

/// Summarizes `diffs`.
///
/// Counts come from `diffs` itself, so passing the unconsolidated list
/// reports true volume even when `grouping` was built from the consolidated
/// or deduplicated list. Domains are listed in `grouping` order, followed by
/// any domain only `diffs` mentions.
#[must_use]
pub fn generate_diff_summary<V, W>(diffs: &[Difference<V>], grouping: &Grouping<W>) -> DiffSummary {
    let mut change_types = ChangeCounts::default();
    let mut changes_by_domain: IndexMap<String, ChangeCounts> =
        grouping.keys().map(|domain| (domain.clone(), ChangeCounts::default())).collect();
    for diff in diffs {
        change_types.record(diff.kind);
        changes_by_domain.entry(domain_of(diff)).or_default().record(diff.kind);
    }
    DiffSummary { total_changes: diffs.len(), change_types, changes_by_domain }
}
