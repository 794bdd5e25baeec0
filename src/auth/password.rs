use bcrypt::{hash, verify, DEFAULT_COST};
use lazy_static::lazy_static;

const UNKNOWN_ACCOUNT_SECRET: &str = "no-account-matches-this-login";

lazy_static! {
    // Same cost as real accounts, so a check against it takes as long.
    static ref UNKNOWN_ACCOUNT_HASH: Option<String> =
        hash(UNKNOWN_ACCOUNT_SECRET, DEFAULT_COST).ok();
}

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// bcrypt could not produce a hash (RNG or algorithm failure).
    #[error("failed to hash password: {0}")]
    Hashing(String),
    /// The plaintext does not match the stored hash.
    #[error("password mismatch")]
    Mismatch,
}

pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    hash(password, DEFAULT_COST).map_err(|e| PasswordError::Hashing(e.to_string()))
}

/// Checks `password` against a stored bcrypt hash.
///
/// An unparsable stored hash is reported as a mismatch as well, so callers
/// only ever have one "access denied" path to map.
pub fn verify_password(password: &str, hashed_password: &str) -> Result<(), PasswordError> {
    match verify(password, hashed_password) {
        Ok(true) => Ok(()),
        Ok(false) => Err(PasswordError::Mismatch),
        Err(e) => {
            log::warn!("Stored password hash could not be verified: {}", e);
            Err(PasswordError::Mismatch)
        }
    }
}

/// Spends one bcrypt verification on a login that matched no account and
/// always reports a mismatch.
///
/// Login runs this in place of `verify_password` so both failures take the
/// same time.
pub fn verify_unknown_account(password: &str) -> Result<(), PasswordError> {
    match UNKNOWN_ACCOUNT_HASH.as_deref() {
        Some(hashed) => {
            let _ = verify(password, hashed);
        }
        None => log::warn!("No placeholder hash available for unknown-account logins"),
    }
    Err(PasswordError::Mismatch)
}
