use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use tracing::{debug, error};

use crate::services::auth::claims::{TokenClaims, TokenKind};

/// Errors surfaced by the codec and the token service.
///
/// Every verification failure (signature, issuer, kind, expiry, garbage input) collapses into
/// `Invalid`. The concrete reason is only written to the debug log.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid token")]
    Invalid,

    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error("token expiry is out of the representable range")]
    ExpiryOutOfRange,
}

/// HS256 signer/verifier bound to one shared secret and one issuer.
///
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct TokenCodec {
    issuer: String,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("TokenCodec")
            .field("issuer", &self.issuer)
            .finish()
    }
}

impl TokenCodec {
    pub fn new(secret: &[u8], issuer: String) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        // exp is checked against the injected clock in `decode`, not the system time.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;

        Self {
            issuer,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn encode(&self, claims: &TokenClaims) -> Result<String, TokenError> {
        let header = Header::new(Algorithm::HS256);
        jsonwebtoken::encode(&header, claims, &self.encoding_key).map_err(|e| {
            error!(error = %e, kind = claims.kind.as_str(), "failed to sign JWT");
            TokenError::Signing(e)
        })
    }

    /// Verify signature, issuer, kind and expiry (in that order) and return the claims.
    pub fn decode(
        &self,
        token: &str,
        expected_kind: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<TokenClaims, TokenError> {
        let data = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                debug!(error = %e, expected = expected_kind.as_str(), "jwt verification failed");
                TokenError::Invalid
            })?;
        let claims = data.claims;

        if claims.kind != expected_kind {
            debug!(
                expected = expected_kind.as_str(),
                actual = claims.kind.as_str(),
                "token kind mismatch"
            );
            return Err(TokenError::Invalid);
        }

        if claims.sub.trim().is_empty() {
            debug!("empty 'sub' claim");
            return Err(TokenError::Invalid);
        }

        if claims.is_expired_at(now) {
            debug!(exp = claims.exp, now = %now, "token expired");
            return Err(TokenError::Invalid);
        }

        Ok(claims)
    }
}
