//! Runtime settings: where contracts are stored and how verbosely to log.
//!
//! Resolution order, first hit wins:
//!
//! 1. environment (`CONTRACT_STORE`, `NGCONTRACT_LOG` then `RUST_LOG`), which
//!    `main` pre-populates from a `.env` file via `dotenvy`;
//! 2. `ngcontract.yaml` in the working directory;
//! 3. built-in defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{ContractError, Result};
use crate::ports::FileSystem;

/// Store directory used when nothing else is configured.
pub const DEFAULT_CONTRACTS_DIR: &str = ".ngcontract/contracts";
/// Log filter used when nothing else is configured.
pub const DEFAULT_LOG_FILTER: &str = "warn";
/// Optional project configuration file.
pub const CONFIG_FILE: &str = "ngcontract.yaml";
/// Environment variable overriding the store directory.
pub const STORE_ENV: &str = "CONTRACT_STORE";
/// Environment variable overriding the log filter.
pub const LOG_ENV: &str = "NGCONTRACT_LOG";

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    contracts_dir: Option<PathBuf>,
    log: Option<String>,
}

/// Resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Directory contracts are saved to and listed from.
    pub contracts_dir: PathBuf,
    /// `tracing_subscriber::EnvFilter` directive string.
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            contracts_dir: PathBuf::from(DEFAULT_CONTRACTS_DIR),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Settings {
    /// Resolves settings for a project rooted at `dir` from the process
    /// environment.
    ///
    /// # Errors
    ///
    /// See [`Settings::resolve`].
    pub fn from_env(fs: &dyn FileSystem, dir: &Path) -> Result<Self> {
        Self::resolve(fs, dir, |key| std::env::var(key).ok())
    }

    /// Resolves settings with `env` standing in for the environment.
    ///
    /// A relative `contracts_dir` in the YAML file is taken relative to
    /// `dir`. Empty environment values count as unset.
    ///
    /// # Errors
    ///
    /// Returns `ParseFailure` when the YAML file exists but is malformed and
    /// `Io` when it cannot be read.
    pub fn resolve(fs: &dyn FileSystem, dir: &Path, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());
        let file = load_file(fs, &dir.join(CONFIG_FILE))?;
        let defaults = Self::default();

        let contracts_dir = env(STORE_ENV)
            .map(PathBuf::from)
            .or_else(|| file.contracts_dir.map(|p| if p.is_absolute() { p } else { dir.join(p) }))
            .unwrap_or(defaults.contracts_dir);
        let log_filter = env(LOG_ENV)
            .or_else(|| env("RUST_LOG"))
            .or(file.log)
            .unwrap_or(defaults.log_filter);

        debug!(contracts_dir = %contracts_dir.display(), log_filter = %log_filter, "resolved settings");
        Ok(Self { contracts_dir, log_filter })
    }
}

fn load_file(fs: &dyn FileSystem, path: &Path) -> Result<FileConfig> {
    if !fs.exists(path) {
        return Ok(FileConfig::default());
    }
    let text = fs
        .read_to_string(path)
        .map_err(|source| ContractError::Io { path: path.to_path_buf(), source })?;
    if text.trim().is_empty() {
        return Ok(FileConfig::default());
    }
    serde_yaml::from_str(&text).map_err(|e| ContractError::parse(path, e.to_string()))
}
