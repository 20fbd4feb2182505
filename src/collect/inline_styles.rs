//! Inline-style collector for the decorator's `styles` entries.

use tracing::debug;

use crate::contract::{DomStructure, StylesSection};
use crate::error::Result;
use crate::parse::{ParsedAsset, StylesheetAsset};

use super::selector::SelectorMatcher;
use super::styles::rules_for;

/// Collects every inline stylesheet into one section, in declaration order.
///
/// The section's `sourceFile` is the class file the styles were written in.
///
/// # Errors
///
/// Propagates the first parse failure, reported at its class-file line.
pub async fn collect_inline_styles(
    assets: &[StylesheetAsset],
    dom: &DomStructure,
    matcher: &dyn SelectorMatcher,
) -> Result<StylesSection> {
    let mut section = StylesSection::default();
    for asset in assets {
        let sheet = asset.parse().await?;
        section.merge(StylesSection {
            source_file: asset.file_path().display().to_string(),
            rules: rules_for(&sheet, dom, matcher),
        });
    }
    debug!(blocks = assets.len(), rules = section.rules.len(), "collected inline styles");
    Ok(section)
}
