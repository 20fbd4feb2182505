//! Parsers producing the intermediate form the collectors consume.
//!
//! Each source facet is wrapped in an asset handle that knows where its text
//! came from (`file_path`, `start_line`) and parses on demand. Inline
//! templates and styles start part-way into the class file, so parse errors
//! are reported against the file line rather than the snippet line.

pub mod css;
pub mod template;
pub mod typescript;

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

use crate::error::{ContractError, Result};

use self::css::Stylesheet;
use self::template::TemplateNode;
use self::typescript::ClassSurface;

/// Boxed future type alias used by [`ParsedAsset`] to keep the trait usable
/// behind references without generic async methods.
pub type ParseFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Source text plus its provenance.
#[derive(Debug, Clone)]
pub struct SourceAsset {
    /// File the text was read from.
    pub path: PathBuf,
    /// 1-based line of `path` on which `text` starts.
    pub start_line: usize,
    /// The text itself.
    pub text: Arc<str>,
}

impl SourceAsset {
    /// Wraps `text` read from `path` at line `start_line`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, start_line: usize, text: impl Into<Arc<str>>) -> Self {
        Self { path: path.into(), start_line: start_line.max(1), text: text.into() }
    }

    /// Wraps the whole contents of a file.
    #[must_use]
    pub fn whole_file(path: impl Into<PathBuf>, text: impl Into<Arc<str>>) -> Self {
        Self::new(path, 1, text)
    }

    fn failure(&self, line: usize, message: &str) -> ContractError {
        let line = self.start_line + line.saturating_sub(1);
        ContractError::parse(&self.path, format!("line {line}: {message}"))
    }
}

/// A parsed-source handle as seen by a collector.
pub trait ParsedAsset: Send + Sync {
    /// Intermediate form produced by [`ParsedAsset::parse`].
    type Ast: Send;

    /// File the asset was read from.
    fn file_path(&self) -> &Path;

    /// 1-based line of [`ParsedAsset::file_path`] the asset starts on.
    fn start_line(&self) -> usize;

    /// Parses the asset.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::ParseFailure`] carrying the file line.
    fn parse(&self) -> ParseFuture<'_, Self::Ast>;
}

macro_rules! asset_handle {
    ($(#[$doc:meta])* $name:ident, $ast:ty, $parser:path) => {
        $(#[$doc])*
        #[derive(Debug, Clone)]
        pub struct $name(pub SourceAsset);

        impl ParsedAsset for $name {
            type Ast = $ast;

            fn file_path(&self) -> &Path {
                &self.0.path
            }

            fn start_line(&self) -> usize {
                self.0.start_line
            }

            fn parse(&self) -> ParseFuture<'_, Self::Ast> {
                Box::pin(async move {
                    $parser(&self.0.text).map_err(|e| self.0.failure(e.line, &e.message))
                })
            }
        }
    };
}

asset_handle!(
    /// External or inline stylesheet.
    StylesheetAsset,
    Stylesheet,
    css::parse_stylesheet
);

asset_handle!(
    /// External or inline template.
    TemplateAsset,
    Vec<TemplateNode>,
    template::parse_template
);

asset_handle!(
    /// Component class source.
    ClassAsset,
    ClassSurface,
    typescript::parse_class_surface
);
