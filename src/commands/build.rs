//! `ngcontract build` command.

use std::fmt::Write as _;
use std::path::Path;

use super::block_on;
use crate::context::ServiceContext;
use crate::contract::builder::{BuildRequest, ContractBuilder};
use crate::store::ContractStore;

/// Builds the contract for `request`, saves it under `store_dir` and
/// returns the text to print.
///
/// # Errors
///
/// Returns an error string naming the offending file if the build or the
/// save fails. Nothing is saved when the build fails.
pub fn execute(
    ctx: &ServiceContext,
    store_dir: &Path,
    request: &BuildRequest,
    print: bool,
) -> Result<String, String> {
    let built = block_on(ContractBuilder::new(ctx).build(request))?.map_err(|e| e.to_string())?;
    let path = ContractStore::new(ctx, store_dir).save(&built.contract).map_err(|e| e.to_string())?;

    let mut out = String::new();
    if print {
        out.push_str(&built.contract.to_json().map_err(|e| e.to_string())?);
        out.push('\n');
    }
    let _ = writeln!(out, "Saved {} ({})", path.display(), built.hash);
    Ok(out)
}
