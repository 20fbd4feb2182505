//! Consolidation of redundant removals, with optional DOM-path
//! deduplication.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::{ChangeType, Difference, PathSegment};
use crate::dom_path::{process_paths, DedupValue, DomPathDictionary};

/// `true` when `candidate` is a strict descendant of `ancestor`.
#[must_use]
pub fn is_child_path(candidate: &[PathSegment], ancestor: &[PathSegment]) -> bool {
    candidate.len() > ancestor.len() && candidate.starts_with(ancestor)
}

/// Prunes and merges removals.
///
/// 1. A `REMOVE` below another `REMOVE` is dropped, since the ancestor's
///    removal implies it.
/// 2. Two or more `REMOVE`s of keys of the same mapping collapse into one
///    `REMOVE` at the mapping with the removed keys as `oldValue`, provided
///    every difference under that mapping is a `REMOVE`.
///
/// Rule 1 is applied again after merging, since a merged removal can sit
/// above another one. Additions and changes are never merged. Output order
/// follows the input, with a merged removal taking the place of its first
/// member.
#[must_use]
pub fn consolidate(diffs: &[Difference]) -> Vec<Difference> {
    let removals: Vec<&[PathSegment]> = diffs
        .iter()
        .filter(|d| d.kind == ChangeType::Remove)
        .map(|d| d.path.as_slice())
        .collect();
    let pruned: Vec<&Difference> = diffs
        .iter()
        .filter(|d| d.kind != ChangeType::Remove || !removals.iter().any(|r| is_child_path(&d.path, r)))
        .collect();

    // parent path → positions (in `pruned`) of key removals directly under it
    let mut groups: IndexMap<&[PathSegment], Vec<usize>> = IndexMap::new();
    for (position, diff) in pruned.iter().enumerate() {
        if diff.kind != ChangeType::Remove {
            continue;
        }
        if let Some((PathSegment::Key(_), parent)) = diff.path.split_last() {
            if !parent.is_empty() {
                groups.entry(parent).or_default().push(position);
            }
        }
    }
    groups.retain(|parent, members| {
        members.len() >= 2
            && pruned
                .iter()
                .filter(|d| is_child_path(&d.path, parent))
                .all(|d| d.kind == ChangeType::Remove)
    });

    let mut merged_at: IndexMap<usize, &[PathSegment]> = IndexMap::new();
    let mut absorbed = vec![false; pruned.len()];
    for (parent, members) in &groups {
        merged_at.insert(members[0], parent);
        for &member in members {
            absorbed[member] = true;
        }
    }

    let mut out = Vec::with_capacity(pruned.len());
    for (position, diff) in pruned.iter().enumerate() {
        if let Some(parent) = merged_at.get(&position) {
            let keys = groups[parent]
                .iter()
                .filter_map(|&m| match pruned[m].path.last() {
                    Some(PathSegment::Key(key)) => Some(Value::String(key.clone())),
                    _ => None,
                })
                .collect();
            out.push(Difference::remove(parent.to_vec(), Value::Array(keys)));
        } else if !absorbed[position] {
            out.push((*diff).clone());
        }
    }
    let merged: Vec<Vec<PathSegment>> = merged_at.values().map(|parent| parent.to_vec()).collect();
    out.retain(|d| d.kind != ChangeType::Remove || !merged.iter().any(|m| is_child_path(&d.path, m)));
    debug!(input = diffs.len(), output = out.len(), "consolidated differences");
    out
}

/// Consolidated differences with DOM paths replaced by references.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DedupResult {
    /// Differences whose values may contain `{"$domPath": n}` references.
    pub processed_result: Vec<Difference<DedupValue>>,
    /// Dictionary the references point into.
    pub dom_path_dict: DomPathDictionary,
}

/// [`consolidate`], then replace every DOM-path-shaped string in `oldValue`
/// and `value` with a dictionary reference.
#[must_use]
pub fn consolidate_with_dedup(diffs: &[Difference]) -> DedupResult {
    let mut dict = DomPathDictionary::new();
    let processed_result = consolidate(diffs)
        .into_iter()
        .map(|diff| Difference {
            kind: diff.kind,
            old_value: diff.old_value.as_ref().map(|v| process_paths(v, &mut dict)),
            value: diff.value.as_ref().map(|v| process_paths(v, &mut dict)),
            path: diff.path,
        })
        .collect();
    debug!(
        unique = dict.stats.unique_paths,
        duplicates = dict.stats.duplicate_references,
        "deduplicated dom paths"
    );
    DedupResult { processed_result, dom_path_dict: dict }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom_path::DomPathRef;
    use crate::path;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn child_path_relation_is_strict() {
        let ancestor = path!["dom", "elements"];
        assert!(is_child_path(&path!["dom", "elements", 0], &ancestor));
        assert!(!is_child_path(&path!["dom", "elements"], &ancestor));
        assert!(!is_child_path(&path!["dom"], &ancestor));
        assert!(!is_child_path(&path!["styles", "elements", 0], &ancestor));
    }

    #[test]
    fn sibling_key_removals_collapse_into_the_parent() {
        let diffs = vec![
            Difference::remove(path!["styles", "rules", "div"], json!({"color": "red"})),
            Difference::remove(path!["styles", "rules", "span"], json!({"color": "blue"})),
        ];

        let out = consolidate(&diffs);

        assert_eq!(out, vec![Difference::remove(path!["styles", "rules"], json!(["div", "span"]))]);
    }

    #[test]
    fn descendant_removals_are_pruned() {
        let diffs = vec![
            Difference::remove(path!["dom", "elements"], json!([{"attributes": []}])),
            Difference::remove(path!["dom", "elements", 0, "attributes"], json!([])),
        ];

        let out = consolidate(&diffs);

        assert_eq!(out, vec![Difference::remove(path!["dom", "elements"], json!([{"attributes": []}]))]);
    }

    #[test]
    fn merged_removals_swallow_nested_merges() {
        let diffs = vec![
            Difference::remove(path!["styles", "rules", ".a"], json!({})),
            Difference::remove(path!["styles", "rules", ".b"], json!({})),
            Difference::remove(path!["styles", "rules", ".c", "properties", "color"], json!("red")),
            Difference::remove(path!["styles", "rules", ".c", "properties", "margin"], json!("0")),
        ];

        let out = consolidate(&diffs);

        assert_eq!(out, vec![Difference::remove(path!["styles", "rules"], json!([".a", ".b"]))]);
        for outer in out.iter().filter(|d| d.kind == ChangeType::Remove) {
            assert!(!out.iter().any(|inner| inner.kind == ChangeType::Remove && is_child_path(&inner.path, &outer.path)));
        }
    }

    #[test]
    fn removals_next_to_additions_are_kept_individually() {
        let diffs = vec![
            Difference::remove(path!["styles", "rules", "div"], json!({})),
            Difference::remove(path!["styles", "rules", "span"], json!({})),
            Difference::add(path!["styles", "rules", "p"], json!({})),
        ];

        assert_eq!(consolidate(&diffs), diffs);
    }

    #[test]
    fn a_single_removal_is_not_merged() {
        let diffs = vec![
            Difference::remove(path!["publicApi", "properties", "title"], json!({})),
            Difference::change(path!["meta", "name"], json!("A"), json!("B")),
        ];

        assert_eq!(consolidate(&diffs), diffs);
    }

    #[test]
    fn index_removals_are_not_merged() {
        let diffs = vec![
            Difference::remove(path!["publicApi", "lifecycle", 1], json!("ngOnInit")),
            Difference::remove(path!["publicApi", "lifecycle", 2], json!("ngOnDestroy")),
        ];

        assert_eq!(consolidate(&diffs), diffs);
    }

    #[test]
    fn merged_removal_keeps_its_position() {
        let diffs = vec![
            Difference::change(path!["meta", "name"], json!("A"), json!("B")),
            Difference::remove(path!["slots", "header"], json!("[header]")),
            Difference::add(path!["dom", "p"], json!({})),
            Difference::remove(path!["slots", "footer"], json!("[footer]")),
        ];

        let out = consolidate(&diffs);

        assert_eq!(
            out,
            vec![
                Difference::change(path!["meta", "name"], json!("A"), json!("B")),
                Difference::remove(path!["slots"], json!(["header", "footer"])),
                Difference::add(path!["dom", "p"], json!({})),
            ]
        );
    }

    #[test]
    fn dedup_replaces_dom_paths_in_every_kind_of_difference() {
        let p = "div#root > span.foo > button.bar";
        let diffs = vec![
            Difference::add(path!["styles", "rules", ".bar", "appliesTo", 0], json!(p)),
            Difference::change(path!["dom", "x", "parent"], json!(p), json!("div.short")),
            Difference::remove(path!["dom", "y"], json!({"children": [p]})),
        ];

        let DedupResult { processed_result, dom_path_dict } = consolidate_with_dedup(&diffs);

        let reference = DedupValue::DomPath(DomPathRef { index: 0 });
        assert_eq!(processed_result[0].value, Some(reference.clone()));
        assert_eq!(processed_result[1].old_value, Some(reference));
        assert_eq!(processed_result[1].value, Some(DedupValue::String("div.short".into())));
        assert_eq!(
            serde_json::to_value(&processed_result[2].old_value).unwrap(),
            json!({"children": [{"$domPath": 0}]})
        );
        assert_eq!(dom_path_dict.paths, vec![p.to_string()]);
        assert_eq!(dom_path_dict.stats.total_paths, 3);
    }
}
