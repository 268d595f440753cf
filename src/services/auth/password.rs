use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;
use tracing::{debug, error};

use crate::repos::error::RepoError;
use crate::repos::user_repo::{UserRecord, UserRepo};

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("failed to hash password: {0}")]
    Hash(String),
    #[error("stored password hash is unreadable: {0}")]
    CorruptHash(String),
}

/// Hash a password with Argon2id. Returns a PHC string.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hash).map_err(|e| PasswordError::CorruptHash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[derive(Debug, Error)]
pub enum CredentialError {
    /// Unknown email and wrong password are deliberately the same variant.
    #[error("bad credentials")]
    BadCredentials,
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Email/password check used by the login endpoint.
pub async fn authenticate<R>(
    users: &R,
    email: &str,
    password: &str,
) -> Result<UserRecord, CredentialError>
where
    R: UserRepo + ?Sized,
{
    let email = email.trim();
    let password = password.trim();

    let Some(user) = users.find_by_email(email).await? else {
        debug!(email, "login attempt for unknown email");
        return Err(CredentialError::BadCredentials);
    };

    let matches = verify_password(password, &user.password_hash).inspect_err(|e| {
        error!(user_id = %user.id, error = %e, "failed to verify password hash");
    })?;

    if !matches {
        debug!(user_id = %user.id, "password mismatch");
        return Err(CredentialError::BadCredentials);
    }

    Ok(user)
}
