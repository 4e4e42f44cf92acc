//! Salted password hashing for the credential directory.
//!
//! Stored form is `hex(salt)$hex(sha256(salt || password))`. The salt is a
//! fresh UUID per account, so equal passwords never share a digest.

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Hash a plaintext password with a fresh per-account salt.
pub fn hash_password(password: &str) -> String {
    let salt = Uuid::now_v7();
    encode(salt.as_bytes(), password)
}

/// Check a plaintext password against a stored hash.
///
/// Malformed stored values never verify.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt_hex, _digest_hex)) = stored.split_once('$') else {
        return false;
    };
    let Some(salt) = decode_hex(salt_hex) else {
        return false;
    };
    encode(&salt, password) == stored
}

fn encode(salt: &[u8], password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    let digest = hasher.finalize();
    format!("{}${}", encode_hex(salt), encode_hex(&digest))
}

fn encode_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn decode_hex(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
        .collect()
}
