//! ID generation utilities with prefix support
//!
//! Prefixed, URL-safe identifiers with at least 96 bits of entropy, in the
//! style of Stripe's API ids. Account ids use the `usr` prefix, challenge
//! handles the `chl` prefix. Challenge handles double as the opaque
//! session-in-progress handle returned to login callers, so the entropy floor
//! is what makes them unguessable.

use base64::{Engine, prelude::BASE64_URL_SAFE_NO_PAD};
use rand::{TryRngCore, rngs::OsRng};

/// Generate a prefixed ID with at least 96 bits of entropy
///
/// The ID format is: `{prefix}_{random_string}`
/// where the random string is base64 URL-safe encoded without padding.
pub fn generate_prefixed_id(prefix: &str) -> String {
    // 12 bytes (96 bits) of random data
    let mut bytes = [0u8; 12];
    OsRng.try_fill_bytes(&mut bytes).unwrap();

    let encoded = BASE64_URL_SAFE_NO_PAD.encode(bytes);

    format!("{prefix}_{encoded}")
}

/// Generate a random URL-safe string with `length` bytes of entropy
///
/// Used for opaque refresh tokens, which need at least 128 bits.
pub fn generate_random_string(length: usize) -> String {
    if length < 16 {
        panic!("Length must be at least 16");
    }
    let mut bytes = vec![0u8; length];
    OsRng.try_fill_bytes(&mut bytes).unwrap();
    BASE64_URL_SAFE_NO_PAD.encode(bytes)
}

/// Validate that a prefixed ID has the expected format
pub fn validate_prefixed_id(id: &str, expected_prefix: &str) -> bool {
    if !id.starts_with(&format!("{expected_prefix}_")) {
        return false;
    }

    let random_part = &id[expected_prefix.len() + 1..];

    match BASE64_URL_SAFE_NO_PAD.decode(random_part) {
        Ok(decoded) => decoded.len() >= 12, // At least 96 bits
        Err(_) => false,
    }
}
