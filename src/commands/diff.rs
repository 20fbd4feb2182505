//! `ngcontract diff` command.

use std::path::{Path, PathBuf};

use crate::context::ServiceContext;
use crate::diff::{diff_contracts, ContractDiffReport};
use crate::store::ContractStore;

/// Diffs the contracts saved at `before` and `after` and returns the JSON
/// report. A bare file name that does not exist as given is looked up in
/// `store_dir`.
///
/// # Errors
///
/// Returns an error string if either file is missing or malformed.
pub fn execute(
    ctx: &ServiceContext,
    store_dir: &Path,
    before: &Path,
    after: &Path,
    dedup: bool,
) -> Result<String, String> {
    let store = ContractStore::new(ctx, store_dir);
    let before = locate(ctx, store_dir, before);
    let after = locate(ctx, store_dir, after);
    let old = store.load(&before).map_err(|e| e.to_string())?;
    let new = store.load(&after).map_err(|e| e.to_string())?;
    let raw = diff_contracts(&old, &new).map_err(|e| e.to_string())?;

    let json = if dedup {
        serde_json::to_string_pretty(&ContractDiffReport::with_dedup(&raw))
    } else {
        serde_json::to_string_pretty(&ContractDiffReport::new(&raw))
    }
    .map_err(|e| format!("Failed to serialize diff report: {e}"))?;
    Ok(format!("{json}\n"))
}

fn locate(ctx: &ServiceContext, store_dir: &Path, path: &Path) -> PathBuf {
    let stored = store_dir.join(path);
    if !ctx.fs.exists(path) && path.components().count() == 1 && ctx.fs.exists(&stored) {
        stored
    } else {
        path.to_path_buf()
    }
}
