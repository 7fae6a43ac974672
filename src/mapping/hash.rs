//! Canonical payload hashing.
//!
//! Payload property maps are `BTreeMap`s and multi-valued properties are
//! sorted at assembly time, so serializing a payload already yields
//! canonical bytes; SHA-256 over those bytes is the idempotence and echo
//! basis.

use crate::destination::domain::PagePayload;
use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of a payload's canonical JSON.
///
/// # Errors
///
/// Returns [`serde_json::Error`] when the payload cannot be serialized,
/// which indicates a programming error in the payload types.
pub fn payload_hash(payload: &PagePayload) -> Result<String, serde_json::Error> {
    let bytes = serde_json::to_vec(payload)?;
    Ok(hex_digest(&bytes))
}

/// Hex-encoded SHA-256 of an arbitrary JSON value's canonical form.
///
/// # Errors
///
/// Returns [`serde_json::Error`] when the value cannot be serialized.
pub fn digest_value(value: &serde_json::Value) -> Result<String, serde_json::Error> {
    let bytes = serde_json::to_vec(value)?;
    Ok(hex_digest(&bytes))
}

fn hex_digest(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}
