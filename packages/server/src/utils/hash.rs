use std::sync::LazyLock;

use argon2::Argon2;
use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

pub fn hash_password(password: &str) -> Result<String, password_hash::Error> {
    let salt = SaltString::encode_b64(&rand::random::<[u8; 16]>())?;
    let phc = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(phc.to_string())
}

/// Returns `Ok(false)` on a wrong password; `Err` only for a malformed hash.
pub fn verify_password(password: &str, phc: &str) -> Result<bool, password_hash::Error> {
    let parsed = PasswordHash::new(phc)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Hash checked for usernames that do not exist.
static DUMMY_PHC: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("unknown-user-placeholder").ok());

/// Spend one argon2 verification on behalf of an unknown user, so the
/// response takes as long as a wrong password would. Never authenticates.
pub fn verify_unknown_user(password: &str) -> bool {
    if let Some(phc) = DUMMY_PHC.as_deref() {
        let _ = verify_password(password, phc);
    }
    false
}
