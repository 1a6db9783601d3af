use base64::{Engine, engine::general_purpose::STANDARD};
use rand::RngExt;
use sha2::{Digest, Sha256};

/// Number of salt bytes drawn per encode.
const SALT_LEN: usize = 16;

/// Hash a password into its stored encoded form: `base64(salt) "$" base64(digest)`
/// where digest = SHA-256 over `salt ‖ password`. A fresh 16-byte salt is drawn
/// from the CSPRNG on every call, so encoding the same password twice yields
/// different forms.
///
/// This is deliberately a single salted digest rather than a slow KDF — the
/// encoded form must stay byte-compatible with hashes already in storage.
/// Known hardening gap; see DESIGN.md before changing the algorithm.
pub fn hash_password(password: &str) -> String {
    let mut rng = rand::rng();
    let salt: [u8; SALT_LEN] = rng.random();
    let digest = salted_digest(&salt, password);
    format!("{}${}", STANDARD.encode(salt), STANDARD.encode(digest))
}

/// Check a password against an encoded form. Malformed forms (wrong part
/// count, bad base64) are `false`, never an error.
pub fn verify_password(password: &str, encoded: &str) -> bool {
    let mut parts = encoded.splitn(3, '$');
    let (Some(salt_part), Some(hash_part), None) = (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    let (Ok(salt), Ok(stored)) = (STANDARD.decode(salt_part), STANDARD.decode(hash_part)) else {
        return false;
    };
    let computed = salted_digest(&salt, password);
    constant_time_eq(&computed, &stored)
}

fn salted_digest(salt: &[u8], password: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().into()
}

/// Byte-for-byte comparison without content-dependent short-circuiting.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
