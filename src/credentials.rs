//! Doctor credentials: PBKDF2-SHA256 hashes, compared in constant time.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::db::{EntityStore, ReferenceStore};
use crate::error::ServiceError;

#[cfg(not(test))]
pub const PBKDF2_ITERATIONS: u32 = 600_000;
#[cfg(test)]
pub const PBKDF2_ITERATIONS: u32 = 1_000;

pub const HASH_LENGTH: usize = 32;
pub const SALT_LENGTH: usize = 16;

/// Stored credential; hash and salt are base64 text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    pub login_id: String,
    pub password_hash: String,
    pub salt: String,
}

impl CredentialRecord {
    /// Hash `password` under a fresh random salt.
    pub fn new(login_id: &str, password: &str) -> Self {
        let salt = generate_salt();
        let mut hash = derive(password, &salt);
        let record = Self {
            login_id: login_id.to_string(),
            password_hash: STANDARD.encode(hash),
            salt: STANDARD.encode(salt),
        };
        hash.zeroize();
        record
    }

    /// Constant-time comparison against a candidate password. A record
    /// whose salt or hash cannot be decoded never matches.
    pub fn matches(&self, password: &str) -> bool {
        let (Ok(salt), Ok(expected)) = (STANDARD.decode(&self.salt), STANDARD.decode(&self.password_hash)) else {
            return false;
        };
        let mut candidate = derive(password, &salt);
        let equal: bool = candidate.as_slice().ct_eq(expected.as_slice()).into();
        candidate.zeroize();
        equal
    }
}

fn derive(password: &str, salt: &[u8]) -> [u8; HASH_LENGTH] {
    let mut out = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut out);
    out
}

fn generate_salt() -> [u8; SALT_LENGTH] {
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}

/// Check a login against the stored credential. Unknown logins and wrong
/// passwords both yield `false`.
pub fn verify_credentials(
    store: &dyn EntityStore,
    login_id: &str,
    password: &str,
) -> Result<bool, ServiceError> {
    let verified = match store.credential(login_id)? {
        Some(record) => record.matches(password),
        None => false,
    };
    if !verified {
        tracing::warn!(login_id, "credential check failed");
    }
    Ok(verified)
}
