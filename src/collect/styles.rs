//! Style collector for external stylesheets.

use indexmap::IndexMap;
use tracing::debug;

use crate::contract::{DomStructure, StyleRule, StylesSection};
use crate::error::Result;
use crate::parse::css::Stylesheet;
use crate::parse::{ParsedAsset, StylesheetAsset};

use super::selector::SelectorMatcher;

/// Parses `asset` and maps every rule onto the DOM snapshot through
/// `matcher`.
///
/// Rules that match nothing are kept with an empty `appliesTo`. A selector
/// repeated later in the sheet merges into the first occurrence, with later
/// declarations winning.
///
/// # Errors
///
/// Propagates the stylesheet parse failure.
pub async fn collect_styles(
    asset: &StylesheetAsset,
    dom: &DomStructure,
    matcher: &dyn SelectorMatcher,
) -> Result<StylesSection> {
    let sheet = asset.parse().await?;
    let section = StylesSection {
        source_file: asset.file_path().display().to_string(),
        rules: rules_for(&sheet, dom, matcher),
    };
    debug!(
        file = %asset.file_path().display(),
        rules = section.rules.len(),
        "collected stylesheet rules"
    );
    Ok(section)
}

/// Maps parsed rules onto `dom`, keyed by [`crate::parse::css::CssRule::key`].
///
/// `appliesTo` lists, in DOM order, every element that `matcher` accepts for
/// any selector of the rule.
#[must_use]
pub fn rules_for(
    sheet: &Stylesheet,
    dom: &DomStructure,
    matcher: &dyn SelectorMatcher,
) -> IndexMap<String, StyleRule> {
    let mut rules: IndexMap<String, StyleRule> = IndexMap::new();
    for rule in &sheet.rules {
        let entry = rules.entry(rule.key()).or_default();
        for (key, element) in dom {
            if !entry.applies_to.contains(key)
                && rule.selectors.iter().any(|selector| matcher.matches(selector, key, element))
            {
                entry.applies_to.push(key.clone());
            }
        }
        for declaration in &rule.declarations {
            entry.properties.insert(declaration.name.clone(), declaration.value.clone());
        }
    }
    rules
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect::dom::flatten;
    use crate::collect::selector::DomSelectorMatcher;
    use crate::contract::DomElement;
    use crate::parse::template::parse_template;
    use crate::parse::SourceAsset;
    use pretty_assertions::assert_eq;

    /// Accepts an element when its key ends with the selector text.
    struct KeySuffixMatcher;

    impl SelectorMatcher for KeySuffixMatcher {
        fn matches(&self, selector: &str, key: &str, _element: &DomElement) -> bool {
            key.ends_with(selector)
        }
    }

    async fn collect(css: &str, dom: &DomStructure) -> Result<StylesSection> {
        collect_styles(&sheet(css), dom, &DomSelectorMatcher::new(dom)).await
    }

    fn card_dom() -> DomStructure {
        flatten(&parse_template(r#"<div class="card"><h2 class="title"></h2><p class="body"></p></div>"#).unwrap())
    }

    fn sheet(css: &str) -> StylesheetAsset {
        StylesheetAsset(SourceAsset::whole_file("card.component.scss", css))
    }

    #[tokio::test]
    async fn rules_record_matches_and_declarations() {
        let dom = card_dom();
        let section = collect(".card { padding: 4px; .title { color: red; } }", &dom).await.unwrap();

        assert_eq!(section.source_file, "card.component.scss");
        let title = &section.rules[".card .title"];
        assert_eq!(title.applies_to, vec!["div.card > h2.title"]);
        assert_eq!(title.properties["color"], "red");
        assert_eq!(section.rules[".card"].properties["padding"], "4px");
    }

    #[tokio::test]
    async fn unused_rules_are_kept_with_empty_applies_to() {
        let dom = card_dom();
        let section = collect(".ghost { display: none; }", &dom).await.unwrap();

        assert!(section.rules[".ghost"].applies_to.is_empty());
        assert_eq!(section.rules[".ghost"].properties["display"], "none");
    }

    #[tokio::test]
    async fn selector_lists_union_in_dom_order() {
        let dom = card_dom();
        let section = collect(".body, .title { margin: 0; }", &dom).await.unwrap();

        assert_eq!(
            section.rules[".body, .title"].applies_to,
            vec!["div.card > h2.title", "div.card > p.body"]
        );
    }

    #[tokio::test]
    async fn at_rule_context_prefixes_the_key() {
        let dom = card_dom();
        let section = collect(".title { color: red; }\n@media (max-width: 600px) { .title { color: blue; } }", &dom)
            .await
            .unwrap();

        let keys: Vec<&str> = section.rules.keys().map(String::as_str).collect();
        assert_eq!(keys, vec![".title", "@media (max-width: 600px) .title"]);
        assert_eq!(section.rules["@media (max-width: 600px) .title"].applies_to, vec!["div.card > h2.title"]);
    }

    #[tokio::test]
    async fn repeated_selectors_merge_with_later_declarations_winning() {
        let dom = card_dom();
        let section = collect(".title { color: red; margin: 0; }\n.title { color: blue; }", &dom).await.unwrap();

        assert_eq!(section.rules.len(), 1);
        assert_eq!(section.rules[".title"].properties["color"], "blue");
        assert_eq!(section.rules[".title"].properties["margin"], "0");
    }

    #[tokio::test]
    async fn applies_to_comes_from_the_given_matcher() {
        let dom = card_dom();
        let section = collect_styles(&sheet("p.body { x: y; } h2 { x: y; }"), &dom, &KeySuffixMatcher)
            .await
            .unwrap();

        assert_eq!(section.rules["p.body"].applies_to, vec!["div.card > p.body"]);
        assert!(section.rules["h2"].applies_to.is_empty());
    }

    #[tokio::test]
    async fn parse_failures_name_the_stylesheet() {
        let err = collect(".a {", &card_dom()).await.unwrap_err();
        assert!(err.to_string().contains("card.component.scss"));
    }
}
