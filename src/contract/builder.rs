//! Contract builder: composes the collector outputs into one sealed
//! contract.
//!
//! The class file is read first since its decorator names the template and
//! stylesheets. Those assets are then read concurrently, the template is
//! flattened, and both style collectors run concurrently against the DOM
//! snapshot. Any failure aborts the build; nothing partial is returned.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use super::hash::content_hash;
use super::{ComponentContract, DomStructure, StylesSection};
use crate::collect::{
    collect_dom, collect_inline_styles, collect_slots, collect_styles, generate_meta, public_api,
    DomSelectorMatcher, MetaSource, SelectorMatcher,
};
use crate::context::ServiceContext;
use crate::error::Result;
use crate::parse::{ClassAsset, ParsedAsset, SourceAsset, StylesheetAsset, TemplateAsset};

/// Input files of one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    /// Component class file.
    pub typescript: PathBuf,
    /// Template file; defaults to the decorator's `templateUrl` or inline
    /// `template`.
    pub template: Option<PathBuf>,
    /// Stylesheet; defaults to the decorator's `styleUrl(s)`.
    pub styles: Option<PathBuf>,
}

impl BuildRequest {
    /// A request that takes everything but the class file from the decorator.
    #[must_use]
    pub fn for_class(typescript: impl Into<PathBuf>) -> Self {
        Self { typescript: typescript.into(), template: None, styles: None }
    }
}

/// A sealed contract and its hash.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltContract {
    /// The contract, with `meta.hash` filled in.
    pub contract: ComponentContract,
    /// Content hash, equal to `contract.meta.hash`.
    pub hash: String,
}

/// Builds contracts through a [`ServiceContext`].
pub struct ContractBuilder<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ContractBuilder<'a> {
    /// Creates a builder reading through `ctx`.
    #[must_use]
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Builds, validates and hashes the contract for `request`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ContractError::MissingAsset`] for an absent
    /// source, template or stylesheet, `ParseFailure` for a malformed one,
    /// and `InvalidContractFormat` if the composed contract breaks a
    /// referential invariant.
    pub async fn build(&self, request: &BuildRequest) -> Result<BuiltContract> {
        let source = &request.typescript;
        let class = ClassAsset(SourceAsset::whole_file(source, self.ctx.read_source(source).await?));
        let surface = class.parse().await?;
        let decorator = surface.decorator.clone().unwrap_or_default();
        let base = source.parent().unwrap_or_else(|| Path::new(""));

        let template_path = request
            .template
            .clone()
            .or_else(|| decorator.template_url.as_deref().map(|url| resolve(base, url)));
        let style_paths: Vec<PathBuf> = match &request.styles {
            Some(path) => vec![path.clone()],
            None => decorator.style_urls.iter().map(|url| resolve(base, url)).collect(),
        };
        debug!(
            source = %source.display(),
            template = ?template_path,
            styles = style_paths.len(),
            "resolved component assets"
        );

        let (template_text, style_texts) =
            tokio::try_join!(self.read_optional(template_path.as_deref()), self.read_all(&style_paths))?;

        let (template, inline_template) = match (&template_path, template_text) {
            (Some(path), Some(text)) => (Some(TemplateAsset(SourceAsset::whole_file(path, text))), false),
            _ => match &decorator.template {
                Some(text) => (
                    Some(TemplateAsset(SourceAsset::new(source, decorator.template_line, text.as_str()))),
                    true,
                ),
                None => (None, false),
            },
        };
        let dom = match &template {
            Some(template) => collect_dom(template).await?,
            None => DomStructure::new(),
        };

        let meta = generate_meta(&MetaSource {
            class_name: surface.class_name.as_deref(),
            selector: decorator.selector.as_deref(),
            source_file: source,
            template_file: if inline_template { None } else { template_path.as_deref() },
            inline_template,
            generated_at: self.ctx.clock.now(),
        });

        let external: Vec<StylesheetAsset> = style_paths
            .iter()
            .zip(style_texts)
            .map(|(path, text)| StylesheetAsset(SourceAsset::whole_file(path, text)))
            .collect();
        let inline: Vec<StylesheetAsset> = decorator
            .styles
            .iter()
            .map(|(text, line)| StylesheetAsset(SourceAsset::new(source, *line, text.as_str())))
            .collect();
        let styles = {
            let matcher = DomSelectorMatcher::new(&dom);
            let (mut styles, inline_styles) = tokio::try_join!(
                collect_external(&external, &dom, &matcher),
                collect_inline_styles(&inline, &dom, &matcher)
            )?;
            styles.merge(inline_styles);
            styles
        };

        let mut contract = ComponentContract {
            meta,
            public_api: public_api(&surface),
            slots: collect_slots(&dom),
            dom,
            styles,
        };
        contract.validate(source)?;
        let hash = content_hash(&contract)?;
        contract.meta.hash.clone_from(&hash);

        info!(
            component = %contract.meta.name,
            elements = contract.dom.len(),
            rules = contract.styles.rules.len(),
            hash = %hash,
            "built contract"
        );
        Ok(BuiltContract { contract, hash })
    }

    async fn read_optional(&self, path: Option<&Path>) -> Result<Option<Arc<str>>> {
        match path {
            Some(path) => self.ctx.read_source(path).await.map(Some),
            None => Ok(None),
        }
    }

    async fn read_all(&self, paths: &[PathBuf]) -> Result<Vec<Arc<str>>> {
        let mut texts = Vec::with_capacity(paths.len());
        for path in paths {
            texts.push(self.ctx.read_source(path).await?);
        }
        Ok(texts)
    }
}

async fn collect_external(
    assets: &[StylesheetAsset],
    dom: &DomStructure,
    matcher: &dyn SelectorMatcher,
) -> Result<StylesSection> {
    let mut section = StylesSection::default();
    for asset in assets {
        section.merge(collect_styles(asset, dom, matcher).await?);
    }
    Ok(section)
}

/// Resolves a decorator URL against the class file's directory.
fn resolve(base: &Path, url: &str) -> PathBuf {
    base.join(url.strip_prefix("./").unwrap_or(url))
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::contract::TemplateType;
    use crate::error::ContractError;
    use pretty_assertions::assert_eq;

    const CARD: &str = "/app/card/card.component.ts";

    #[tokio::test]
    async fn builds_every_section_from_decorator_urls() {
        let ctx = card_context("2025-06-15T10:00:00Z");

        let built = ContractBuilder::new(&ctx).build(&BuildRequest::for_class(CARD)).await.unwrap();
        let contract = &built.contract;

        assert_eq!(contract.meta.name, "CardComponent");
        assert_eq!(contract.meta.selector, "app-card");
        assert_eq!(contract.meta.template_type, TemplateType::External);
        assert_eq!(contract.meta.generated_at, "2025-06-15T10:00:00+00:00");
        assert_eq!(contract.meta.hash, built.hash);
        assert!(built.hash.starts_with("sha256:"));

        let keys: Vec<&str> = contract.dom.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec!["div.card", "div.card > h2.title", "div.card > ng-content", "div.card > button.close"]
        );
        assert_eq!(contract.dom["div.card > button.close"].events[0].handler, "close()");

        assert_eq!(contract.styles.source_file, "/app/card/card.component.scss");
        assert_eq!(contract.styles.rules[".card .title"].applies_to, vec!["div.card > h2.title"]);
        assert!(contract.styles.rules[".unused"].applies_to.is_empty());

        assert_eq!(contract.slots["card-body"], "[card-body]");
        assert!(contract.public_api.properties["title"].is_input);
        assert_eq!(contract.public_api.events["closed"].type_name, "void");
        assert_eq!(contract.public_api.lifecycle, vec!["ngOnInit"]);
        assert_eq!(ctx.cache.len(), 3);
    }

    #[tokio::test]
    async fn rebuilding_unchanged_sources_yields_identical_hash() {
        let first = card_context("2025-06-15T10:00:00Z");
        let second = card_context("2025-06-16T08:30:00Z");
        let request = BuildRequest::for_class(CARD);

        let a = ContractBuilder::new(&first).build(&request).await.unwrap();
        let b = ContractBuilder::new(&second).build(&request).await.unwrap();

        assert_eq!(a.hash, b.hash);
        assert_ne!(a.contract.meta.generated_at, b.contract.meta.generated_at);
    }

    #[tokio::test]
    async fn missing_template_aborts_the_build() {
        let ctx = context(
            "2025-06-15T10:00:00Z",
            &[("/app/card/card.component.ts", CARD_TS), ("/app/card/card.component.scss", CARD_SCSS)],
        );

        let err = ContractBuilder::new(&ctx).build(&BuildRequest::for_class(CARD)).await.unwrap_err();

        match err {
            ContractError::MissingAsset { path } => {
                assert_eq!(path, PathBuf::from("/app/card/card.component.html"));
            }
            other => panic!("expected MissingAsset, got {other}"),
        }
    }

    #[tokio::test]
    async fn explicit_paths_override_the_decorator() {
        let ctx = context(
            "2025-06-15T10:00:00Z",
            &[
                ("/app/card/card.component.ts", CARD_TS),
                ("/other/alt.html", "<section class=\"alt\"></section>"),
                ("/other/alt.css", ".alt { margin: 0; }"),
            ],
        );
        let request = BuildRequest {
            typescript: CARD.into(),
            template: Some("/other/alt.html".into()),
            styles: Some("/other/alt.css".into()),
        };

        let built = ContractBuilder::new(&ctx).build(&request).await.unwrap();

        assert_eq!(built.contract.dom.keys().collect::<Vec<_>>(), vec!["section.alt"]);
        assert_eq!(built.contract.styles.rules[".alt"].applies_to, vec!["section.alt"]);
    }

    #[tokio::test]
    async fn inline_template_and_styles() {
        let source = "@Component({\n  selector: 'app-badge',\n  template: `<span class=\"badge\"><ng-content></ng-content></span>`,\n  styles: [`.badge { color: red; }`],\n})\nexport class BadgeComponent {}\n";
        let ctx = context("2025-06-15T10:00:00Z", &[("/app/badge.ts", source)]);

        let built = ContractBuilder::new(&ctx).build(&BuildRequest::for_class("/app/badge.ts")).await.unwrap();

        assert_eq!(built.contract.meta.template_type, TemplateType::Inline);
        assert_eq!(built.contract.styles.source_file, "/app/badge.ts");
        assert_eq!(built.contract.styles.rules[".badge"].applies_to, vec!["span.badge"]);
        assert_eq!(built.contract.slots["default"], "*");
    }

    #[tokio::test]
    async fn inline_template_errors_report_class_file_lines() {
        let source = "@Component({\n  selector: 'app-x',\n  template: `\n<div>`,\n})\nexport class X {}\n";
        let ctx = context("2025-06-15T10:00:00Z", &[("/app/x.ts", source)]);

        let err = ContractBuilder::new(&ctx).build(&BuildRequest::for_class("/app/x.ts")).await.unwrap_err();

        assert!(matches!(err, ContractError::ParseFailure { .. }));
        assert!(err.to_string().starts_with("failed to parse /app/x.ts: line 4"));
    }
}
