//! Password hashing primitives (Argon2id, PHC string format).
//!
//! The storefront registered users with a bcrypt cost of 12; here the same
//! job is done with `Argon2::default()`, which is the current recommended
//! parameter set of comparable strength. Hashes are stored and compared as
//! PHC strings only; plaintext never leaves the call frame.

use anyhow::{Result, anyhow};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use once_cell::sync::Lazy;
use password_hash::{PasswordHash, SaltString};

pub fn hash_password(password: &str) -> Result<String> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| anyhow!(e.to_string()))?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| anyhow!(e.to_string()))?;
    let argon2 = Argon2::default();
    let phc = argon2.hash_password(password.as_bytes(), &salt).map_err(|e| anyhow!(e.to_string()))?.to_string();
    Ok(phc)
}

pub fn verify_password(hash: &str, password: &str) -> bool {
    if let Ok(parsed) = PasswordHash::new(hash) {
        let argon2 = Argon2::default();
        argon2.verify_password(password.as_bytes(), &parsed).is_ok()
    } else { false }
}

// Hash of an unguessable throwaway value, computed once per process. Verified
// against when the email is unknown so the failure path costs the same as a
// wrong password and the response cannot be used for account enumeration.
static DUMMY_PHC: Lazy<String> = Lazy::new(|| {
    hash_password("otogift-dummy-credential").unwrap_or_default()
});

/// Burn one Argon2 verification without revealing anything.
pub fn burn_verification(password: &str) {
    let _ = verify_password(&DUMMY_PHC, password);
}
