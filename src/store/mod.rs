//! Contract store: persistence and listing of built contracts.
//!
//! Contracts are written as pretty JSON, one file per build, directly under
//! the store root:
//!
//! ```text
//! <root>/
//!   ├── cardcomponent-1718445600000.contract.json
//!   └── cardcomponent-1718532000000.contract.json
//! ```
//!
//! The file name carries the component and the generation time in epoch
//! milliseconds, so listing never has to open a file.

use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};
use tracing::{debug, info, warn};

use crate::context::ServiceContext;
use crate::contract::ComponentContract;
use crate::error::{ContractError, Result};

/// Suffix of every stored contract file.
pub const CONTRACT_SUFFIX: &str = ".contract.json";

/// A contract file found in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredContract {
    /// Full path of the file.
    pub path: PathBuf,
    /// Sanitized component name from the file name.
    pub component: String,
    /// Generation time from the file name.
    pub timestamp: DateTime<Utc>,
}

/// Narrows [`ContractStore::list`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    /// Case-insensitive substring of the component name.
    pub component: Option<String>,
    /// Maximum number of entries returned.
    pub limit: Option<usize>,
}

/// Persistence layer for contracts.
///
/// All I/O goes through `ctx.fs`, so the store works the same against disk
/// and against an in-memory filesystem.
pub struct ContractStore<'a> {
    ctx: &'a ServiceContext,
    root: PathBuf,
}

impl<'a> ContractStore<'a> {
    /// Creates a store rooted at `root`.
    #[must_use]
    pub fn new(ctx: &'a ServiceContext, root: &Path) -> Self {
        Self { ctx, root: root.to_path_buf() }
    }

    /// Directory the store writes to.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Validates `contract` and writes it to a new file, returning its path.
    ///
    /// The file is named after `meta.name` and `meta.generatedAt`; if the
    /// timestamp cannot be parsed the store's clock is used instead.
    ///
    /// # Errors
    ///
    /// Returns `InvalidContractFormat` if the contract breaks a referential
    /// invariant (nothing is written), `Serialize` if it cannot be encoded,
    /// and `Io` if the write fails.
    pub fn save(&self, contract: &ComponentContract) -> Result<PathBuf> {
        let path = self.root.join(file_name(&contract.meta.name, self.generated_at(contract)));
        contract.validate(&path)?;
        let json = contract.to_json()?;
        self.ctx
            .fs
            .write(&path, &json)
            .map_err(|source| ContractError::Io { path: path.clone(), source })?;
        info!(path = %path.display(), component = %contract.meta.name, "saved contract");
        Ok(path)
    }

    /// Loads and validates the contract at `path`.
    ///
    /// # Errors
    ///
    /// Returns `MissingAsset` when the file does not exist, `Io` when it
    /// cannot be read, and `InvalidContractFormat` when it does not hold a
    /// well-formed contract.
    pub fn load(&self, path: &Path) -> Result<ComponentContract> {
        if !self.ctx.fs.exists(path) {
            return Err(ContractError::MissingAsset { path: path.to_path_buf() });
        }
        let json = self
            .ctx
            .fs
            .read_to_string(path)
            .map_err(|source| ContractError::Io { path: path.to_path_buf(), source })?;
        ComponentContract::from_json(path, &json)
    }

    /// Lists stored contracts, newest first.
    ///
    /// Files that do not follow the store's naming scheme are skipped.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the store directory exists but cannot be listed.
    pub fn list(&self, filter: &ListFilter) -> Result<Vec<StoredContract>> {
        if !self.ctx.fs.exists(&self.root) {
            return Ok(Vec::new());
        }
        let names = self
            .ctx
            .fs
            .list_dir(&self.root)
            .map_err(|source| ContractError::Io { path: self.root.clone(), source })?;

        let needle = filter.component.as_deref().map(str::to_lowercase);
        let mut found: Vec<StoredContract> = names
            .iter()
            .filter_map(|name| {
                let parsed = parse_file_name(name);
                if parsed.is_none() && name.ends_with(CONTRACT_SUFFIX) {
                    warn!(file = %name, "skipping contract with unrecognized name");
                }
                let (component, timestamp) = parsed?;
                Some(StoredContract { path: self.root.join(name), component, timestamp })
            })
            .filter(|stored| needle.as_deref().map_or(true, |n| stored.component.contains(n)))
            .collect();
        found.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| a.component.cmp(&b.component)));
        if let Some(limit) = filter.limit {
            found.truncate(limit);
        }
        debug!(root = %self.root.display(), count = found.len(), "listed contracts");
        Ok(found)
    }

    /// Most recent contract for `component`, if any.
    ///
    /// # Errors
    ///
    /// Propagates [`ContractStore::list`] failures.
    pub fn latest(&self, component: &str) -> Result<Option<StoredContract>> {
        let filter = ListFilter { component: Some(component.to_string()), limit: Some(1) };
        Ok(self.list(&filter)?.into_iter().next())
    }

    fn generated_at(&self, contract: &ComponentContract) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(&contract.meta.generated_at)
            .map_or_else(|_| self.ctx.clock.now(), |t| t.with_timezone(&Utc))
    }
}

/// Lowercases `name` and replaces anything outside `[a-z0-9_]` with `-`.
fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c.to_ascii_lowercase() } else { '-' })
        .collect();
    let trimmed = cleaned.trim_matches('-');
    if trimmed.is_empty() { "component".to_string() } else { trimmed.to_string() }
}

fn file_name(component: &str, at: DateTime<Utc>) -> String {
    format!("{}-{}{CONTRACT_SUFFIX}", sanitize(component), at.timestamp_millis())
}

fn parse_file_name(name: &str) -> Option<(String, DateTime<Utc>)> {
    let stem = name.strip_suffix(CONTRACT_SUFFIX)?;
    let (component, millis) = stem.rsplit_once('-')?;
    let millis: i64 = millis.parse().ok()?;
    let timestamp = Utc.timestamp_millis_opt(millis).single()?;
    (!component.is_empty()).then(|| (component.to_string(), timestamp))
}
