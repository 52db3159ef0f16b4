// Copyright (c) 2026 Pet Operator Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Command Signature Codec
//!
//! HMAC-SHA-256 over a newline-joined canonical string:
//!
//! ```text
//! trim(actor) \n trim(command) \n compact_json(args) \n timestamp \n trim(nonce)
//! ```
//!
//! Fields are separated explicitly so that no two distinct field tuples can
//! produce the same bytes (`"ab" + "c"` never collides with `"a" + "bc"`).
//! `args` serializes with sorted keys at every nesting level.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::domain::command::CommandArgs;
use crate::domain::errors::SignatureError;

type HmacSha256 = Hmac<Sha256>;

/// Length of a hex-encoded SHA-256 digest.
const SIGNATURE_HEX_LEN: usize = 64;

/// Build the canonical signing string.
pub fn canonicalize(
    actor_user_id: &str,
    command: &str,
    args: &CommandArgs,
    timestamp: i64,
    nonce: &str,
) -> String {
    format!(
        "{}\n{}\n{}\n{}\n{}",
        actor_user_id.trim(),
        command.trim(),
        canonical_args(args),
        timestamp,
        nonce.trim(),
    )
}

fn canonical_args(args: &CommandArgs) -> String {
    // serde_json cannot fail on a map of `Value`s with string keys.
    serde_json::to_string(args).unwrap_or_else(|_| "{}".to_string())
}

/// Lower-case hex HMAC-SHA-256 of `canonical` under `secret`.
pub fn sign(secret: &str, canonical: &str) -> String {
    hex::encode(mac_bytes(secret, canonical))
}

fn mac_bytes(secret: &str, canonical: &str) -> Vec<u8> {
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => unreachable!("HMAC-SHA-256 accepts keys of any length"),
    };
    mac.update(canonical.as_bytes());
    mac.finalize().into_bytes().to_vec()
}

/// Recompute the expected signature and compare it in constant time.
pub fn verify(
    secret: &str,
    actor_user_id: &str,
    command: &str,
    args: &CommandArgs,
    timestamp: i64,
    nonce: &str,
    provided_signature: &str,
) -> Result<(), SignatureError> {
    let provided = provided_signature.trim().to_ascii_lowercase();
    if provided.len() != SIGNATURE_HEX_LEN || !provided.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(SignatureError::Malformed);
    }

    let canonical = canonicalize(actor_user_id, command, args, timestamp, nonce);
    let expected = sign(secret, &canonical);

    if bool::from(expected.as_bytes().ct_eq(provided.as_bytes())) {
        Ok(())
    } else {
        Err(SignatureError::Mismatch)
    }
}
