//! Master password hashing for the admin surface.
//!
//! Uses Argon2id for secure password hashing. Per-file retrieval passwords
//! are a lightweight sharing mechanism and are not hashed; only the master
//! password that guards the admin panel and the management API goes through
//! this module.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, Params,
};
use rand_core::OsRng;

use crate::{Result, StashError};

/// Minimum master password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum master password length.
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Create the Argon2 hasher with recommended parameters.
///
/// Parameters:
/// - Memory cost: 64 MB (65536 KiB)
/// - Time cost: 3 iterations
/// - Parallelism: 4 threads
fn create_argon2() -> Argon2<'static> {
    let m_cost = 65536;
    let t_cost = 3;
    let p_cost = 4;

    let params = Params::new(m_cost, t_cost, p_cost, None).expect("valid Argon2 params");
    Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params)
}

/// Hash a master password using Argon2id.
///
/// Returns a PHC-formatted hash string that includes the salt and parameters.
pub fn hash_password(password: &str) -> Result<String> {
    validate_password(password)?;

    let salt = SaltString::generate(&mut OsRng);

    let argon2 = create_argon2();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| StashError::Auth(format!("password hashing failed: {e}")))?;

    Ok(hash.to_string())
}

/// Verify a master password against a stored hash.
///
/// Returns `Ok(())` if the password matches, or an error if it doesn't.
pub fn verify_password(password: &str, hash: &str) -> Result<()> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| StashError::Auth("invalid password hash format".to_string()))?;

    // Parameters are taken from the parsed hash, not from create_argon2()
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| StashError::Auth("password verification failed".to_string()))
}

/// Validate master password length requirements.
pub fn validate_password(password: &str) -> Result<()> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(StashError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(StashError::Validation(format!(
            "password must be at most {MAX_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}
