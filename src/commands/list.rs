//! `ngcontract list` command.

use std::fmt::Write as _;
use std::path::Path;

use chrono::SecondsFormat;

use crate::context::ServiceContext;
use crate::store::{ContractStore, ListFilter};

/// Lists contracts saved under `store_dir`, newest first.
///
/// # Errors
///
/// Returns an error string if the store directory cannot be read.
pub fn execute(ctx: &ServiceContext, store_dir: &Path, filter: &ListFilter) -> Result<String, String> {
    let entries = ContractStore::new(ctx, store_dir).list(filter).map_err(|e| e.to_string())?;
    if entries.is_empty() {
        return Ok(format!("No contracts found in {}.\n", store_dir.display()));
    }
    let width = entries.iter().map(|e| e.component.len()).max().unwrap_or(0);
    let mut out = String::new();
    for entry in &entries {
        let _ = writeln!(
            out,
            "{}  {:<width$}  {}",
            entry.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            entry.component,
            entry.path.display(),
        );
    }
    Ok(out)
}
