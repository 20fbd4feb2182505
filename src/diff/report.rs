//! Report bundling the consolidated diff with its grouping and summary.

use serde::Serialize;
use serde_json::Value;

use super::{
    consolidate, consolidate_with_dedup, generate_diff_summary, group_by_domain_and_type,
    DedupResult, DiffSummary, Difference, Grouping,
};
use crate::dom_path::{DedupValue, DomPathDictionary};

/// Everything a consumer needs to render a contract diff.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractDiffReport<V = Value> {
    /// Consolidated differences.
    pub diff: Vec<Difference<V>>,
    /// `diff` grouped by domain and kind.
    pub grouping: Grouping<V>,
    /// Counts over the unconsolidated differences.
    pub summary: DiffSummary,
    /// Dictionary for `$domPath` references, when deduplicated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dom_path_dict: Option<DomPathDictionary>,
}

impl ContractDiffReport {
    /// Consolidates, groups and summarizes `raw`.
    #[must_use]
    pub fn new(raw: &[Difference]) -> Self {
        let diff = consolidate(raw);
        let grouping = group_by_domain_and_type(&diff);
        let summary = generate_diff_summary(raw, &grouping);
        Self { diff, grouping, summary, dom_path_dict: None }
    }

    /// `true` when the two contracts were structurally identical.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.diff.is_empty()
    }
}

impl ContractDiffReport<DedupValue> {
    /// Like [`ContractDiffReport::new`], with DOM paths replaced by
    /// dictionary references.
    #[must_use]
    pub fn with_dedup(raw: &[Difference]) -> Self {
        let DedupResult { processed_result, dom_path_dict } = consolidate_with_dedup(raw);
        let grouping = group_by_domain_and_type(&processed_result);
        let summary = generate_diff_summary(raw, &grouping);
        Self { diff: processed_result, grouping, summary, dom_path_dict: Some(dom_path_dict) }
    }
}
