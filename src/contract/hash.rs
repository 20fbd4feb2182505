//! Content hashing for sealed contracts.

use sha2::{Digest, Sha256};

use super::ComponentContract;
use crate::error::Result;

/// Computes the content hash of `contract`.
///
/// The hash covers the compact JSON body with `meta.hash` and
/// `meta.generatedAt` blanked, so rebuilding an unchanged component yields
/// the same value.
///
/// # Errors
///
/// Returns [`crate::error::ContractError::Serialize`] if serialization fails.
pub fn content_hash(contract: &ComponentContract) -> Result<String> {
    let mut body = contract.clone();
    body.meta.hash.clear();
    body.meta.generated_at.clear();
    let json = serde_json::to_string(&body)?;
    let digest = Sha256::digest(json.as_bytes());
    Ok(format!("sha256:{}", hex::encode(digest)))
}
