use std::fmt::Write;

use sha2::{Digest, Sha256};
use tessera_core::{AppError, AppResult};
use tessera_domain::InviteCodeHash;

/// Generates a random invite code and its stored digest.
///
/// Returns `(raw_code_hex, digest)`.
pub(super) fn generate_code() -> AppResult<(String, InviteCodeHash)> {
    let mut bytes = [0u8; 32];
    getrandom::fill(&mut bytes)
        .map_err(|error| AppError::Internal(format!("failed to generate invite code: {error}")))?;

    let raw_code = to_hex(&bytes);
    let digest = hash_code(&raw_code)?;
    Ok((raw_code, digest))
}

/// Computes the SHA-256 digest of a presented code.
pub(super) fn hash_code(raw_code: &str) -> AppResult<InviteCodeHash> {
    let mut hasher = Sha256::new();
    hasher.update(raw_code.as_bytes());
    InviteCodeHash::new(to_hex(&hasher.finalize()))
}

fn to_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .fold(String::with_capacity(bytes.len() * 2), |mut acc, byte| {
            let _ = write!(acc, "{byte:02x}");
            acc
        })
}
