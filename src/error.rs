//! Error type shared by the parsers, collectors, builder and store.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failures raised while building, loading or persisting a contract.
///
/// Every variant that originates from a file carries its path so that the
/// caller can report which asset was being processed.
#[derive(Debug, Error)]
pub enum ContractError {
    /// A stylesheet, template or class source could not be parsed.
    #[error("failed to parse {}: {message}", path.display())]
    ParseFailure {
        /// File being parsed.
        path: PathBuf,
        /// Parser diagnostic, including the line when known.
        message: String,
    },

    /// A referenced template, stylesheet or source file does not exist.
    #[error("missing asset {}", path.display())]
    MissingAsset {
        /// Path that was expected to exist.
        path: PathBuf,
    },

    /// A persisted contract does not match the contract shape.
    #[error("invalid contract {}: {reason}", path.display())]
    InvalidContractFormat {
        /// Contract file that was loaded.
        path: PathBuf,
        /// What made the document unusable.
        reason: String,
    },

    /// An I/O operation failed for a reason other than a missing file.
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        /// Path being read or written.
        path: PathBuf,
        /// Underlying port error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Contract serialization failed.
    #[error("failed to serialize contract: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ContractError {
    /// Builds a [`ContractError::ParseFailure`] for `path`.
    pub fn parse(path: &Path, message: impl Into<String>) -> Self {
        Self::ParseFailure { path: path.to_path_buf(), message: message.into() }
    }

    /// Builds a [`ContractError::InvalidContractFormat`] for `path`.
    pub fn invalid(path: &Path, reason: impl Into<String>) -> Self {
        Self::InvalidContractFormat { path: path.to_path_buf(), reason: reason.into() }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = ContractError> = std::result::Result<T, E>;
