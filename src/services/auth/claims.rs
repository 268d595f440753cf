use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Discriminator carried in the `type` claim.
///
/// Access and refresh tokens are signed with the same secret, so this claim is the only thing
/// that keeps one from being accepted where the other is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    #[serde(rename = "access_token")]
    Access,
    #[serde(rename = "refresh_token")]
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access_token",
            Self::Refresh => "refresh_token",
        }
    }
}

/// Signed payload of every token this service issues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub iss: String,
    pub sub: String,
    #[serde(rename = "type")]
    pub kind: TokenKind,
    /// Seconds since the Unix epoch (JWT NumericDate).
    pub exp: i64,
}

impl TokenClaims {
    pub fn new(issuer: &str, subject: &str, kind: TokenKind, expires_at: DateTime<Utc>) -> Self {
        Self {
            iss: issuer.to_string(),
            sub: subject.to_string(),
            kind,
            exp: expires_at.timestamp(),
        }
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Expiry is exclusive: the token is dead at `exp` itself.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at() {
            Some(exp) => now >= exp,
            None => true,
        }
    }
}
