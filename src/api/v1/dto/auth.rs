/*
 * Responsibility
 * - /auth 系の request/response DTO
 */
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.email.trim().is_empty() {
            return Err("email is required");
        }
        if self.password.trim().is_empty() {
            return Err("password is required");
        }
        Ok(())
    }
}

/// Body returned by login and refresh. The refresh token travels only in `Set-Cookie`.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Access token expiry as Unix epoch milliseconds.
    pub expires_in: i64,
}
