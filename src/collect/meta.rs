//! Meta generator: contract identity and provenance.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::contract::{Meta, TemplateType};

/// What the meta generator needs to know about one build.
#[derive(Debug, Clone)]
pub struct MetaSource<'a> {
    /// Class name from the parsed source, if one was found.
    pub class_name: Option<&'a str>,
    /// Decorator selector, if declared.
    pub selector: Option<&'a str>,
    /// Component class file.
    pub source_file: &'a Path,
    /// External template file, if any.
    pub template_file: Option<&'a Path>,
    /// The template came from the decorator's `template` field.
    pub inline_template: bool,
    /// Build time.
    pub generated_at: DateTime<Utc>,
}

/// Derives [`Meta`] for a build.
///
/// Name and selector come from the parsed source when available; otherwise
/// both fall back to the template file's base name (`foo.component.html`
/// yields `foo.component` and `.foo.component`), then to the class file's.
/// The hash is left empty for the builder to fill in.
#[must_use]
pub fn generate_meta(source: &MetaSource<'_>) -> Meta {
    let base = source
        .template_file
        .unwrap_or(source.source_file)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    Meta {
        name: source.class_name.map_or_else(|| base.clone(), String::from),
        selector: source.selector.map_or_else(|| format!(".{base}"), String::from),
        source_file: source.source_file.display().to_string(),
        template_type: if source.inline_template { TemplateType::Inline } else { TemplateType::External },
        generated_at: source.generated_at.to_rfc3339_opts(SecondsFormat::Secs, false),
        hash: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-06-15T10:00:00Z").unwrap().with_timezone(&Utc)
    }

    #[test]
    fn parsed_metadata_wins() {
        let meta = generate_meta(&MetaSource {
            class_name: Some("CardComponent"),
            selector: Some("app-card"),
            source_file: Path::new("src/card/card.component.ts"),
            template_file: Some(Path::new("src/card/card.component.html")),
            inline_template: false,
            generated_at: at(),
        });

        assert_eq!(meta.name, "CardComponent");
        assert_eq!(meta.selector, "app-card");
        assert_eq!(meta.source_file, "src/card/card.component.ts");
        assert_eq!(meta.template_type, TemplateType::External);
        assert_eq!(meta.generated_at, "2025-06-15T10:00:00+00:00");
        assert!(meta.hash.is_empty());
    }

    #[test]
    fn falls_back_to_template_base_name() {
        let meta = generate_meta(&MetaSource {
            class_name: None,
            selector: None,
            source_file: Path::new("foo.component.ts"),
            template_file: Some(Path::new("views/foo.component.html")),
            inline_template: false,
            generated_at: at(),
        });

        assert_eq!(meta.name, "foo.component");
        assert_eq!(meta.selector, ".foo.component");
    }

    #[test]
    fn inline_only_when_flagged() {
        let meta = generate_meta(&MetaSource {
            class_name: Some("Badge"),
            selector: None,
            source_file: Path::new("badge.ts"),
            template_file: None,
            inline_template: true,
            generated_at: at(),
        });

        assert_eq!(meta.template_type, TemplateType::Inline);
        assert_eq!(meta.selector, ".badge");
    }
}
