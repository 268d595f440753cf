use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::services::auth::claims::{TokenClaims, TokenKind};
use crate::services::auth::identity::Identity;
use crate::services::auth::jwt::{TokenCodec, TokenError};
use crate::services::clock::Clock;

/// Token pair handed out at login and refresh time.
#[derive(Debug, Clone)]
pub struct IssuedTokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub access_expires_at: DateTime<Utc>,
}

/// The only component that issues and validates tokens.
///
/// - Holds the codec (secret + issuer), both expiration windows and the clock.
/// - Read-only after construction; shared across requests behind an `Arc`.
#[derive(Clone)]
pub struct TokenService {
    codec: TokenCodec,
    access_ttl: Duration,
    refresh_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("codec", &self.codec)
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

impl TokenService {
    pub fn new(
        codec: TokenCodec,
        access_ttl: Duration,
        refresh_ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            codec,
            access_ttl,
            refresh_ttl,
            clock,
        }
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    pub fn issue_access(&self, identity: &Identity) -> Result<String, TokenError> {
        debug!(subject = identity.id(), "issuing access token");
        self.issue(identity, TokenKind::Access, self.access_ttl)
    }

    pub fn issue_refresh(&self, identity: &Identity) -> Result<String, TokenError> {
        debug!(subject = identity.id(), "issuing refresh token");
        self.issue(identity, TokenKind::Refresh, self.refresh_ttl)
    }

    /// Returns the subject of a valid access token.
    pub fn validate_access(&self, token: &str) -> Result<String, TokenError> {
        self.codec
            .decode(token, TokenKind::Access, self.clock.now())
            .map(|claims| claims.sub)
    }

    /// Returns the subject of a valid refresh token.
    pub fn validate_refresh(&self, token: &str) -> Result<String, TokenError> {
        self.codec
            .decode(token, TokenKind::Refresh, self.clock.now())
            .map(|claims| claims.sub)
    }

    /// Absolute expiry of a still-valid access token.
    pub fn expiration_of(&self, access_token: &str) -> Result<DateTime<Utc>, TokenError> {
        let claims = self
            .codec
            .decode(access_token, TokenKind::Access, self.clock.now())?;
        claims.expires_at().ok_or(TokenError::Invalid)
    }

    /// Issue a fresh access/refresh pair for the same subject.
    pub fn issue_pair(&self, identity: &Identity) -> Result<IssuedTokenPair, TokenError> {
        let access_token = self.issue_access(identity)?;
        let refresh_token = self.issue_refresh(identity)?;
        let access_expires_at = self.expiration_of(&access_token)?;

        Ok(IssuedTokenPair {
            access_token,
            refresh_token,
            access_expires_at,
        })
    }

    fn issue(
        &self,
        identity: &Identity,
        kind: TokenKind,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        let expires_at = self
            .clock
            .now()
            .checked_add_signed(ttl)
            .ok_or(TokenError::ExpiryOutOfRange)?;
        let claims = TokenClaims::new(self.codec.issuer(), identity.id(), kind, expires_at);
        self.codec.encode(&claims)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::services::auth::identity::Role;
    use crate::services::clock::ManualClock;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 6, 1, 12, 0, 0).unwrap()
    }

    fn service_with(secret: &[u8], clock: Arc<ManualClock>) -> TokenService {
        TokenService::new(
            TokenCodec::new(secret, "staff-manager".into()),
            Duration::minutes(15),
            Duration::minutes(1440),
            clock,
        )
    }

    fn service() -> (TokenService, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::at(start()));
        (service_with(SECRET, clock.clone()), clock)
    }

    fn identities() -> Vec<Identity> {
        vec![
            Identity::new("jane@example.com", Role::User),
            Identity::new("root@example.com", Role::Admin),
            Identity::new("weird+tag@sub.example.org", Role::User),
        ]
    }

    #[test]
    fn access_token_validates_to_its_subject() {
        let (tokens, _) = service();
        for identity in identities() {
            let token = tokens.issue_access(&identity).unwrap();
            assert_eq!(tokens.validate_access(&token).unwrap(), identity.id());
        }
    }

    #[test]
    fn refresh_token_validates_to_its_subject() {
        let (tokens, _) = service();
        for identity in identities() {
            let token = tokens.issue_refresh(&identity).unwrap();
            assert_eq!(tokens.validate_refresh(&token).unwrap(), identity.id());
        }
    }

    #[test]
    fn unrepresentable_expiry_is_an_error() {
        let tokens = TokenService::new(
            TokenCodec::new(SECRET, "staff-manager".into()),
            Duration::minutes(15),
            Duration::MAX,
            Arc::new(ManualClock::at(start())),
        );
        let identity = Identity::new("jane@example.com", Role::User);

        assert!(tokens.issue_access(&identity).is_ok());
        assert!(matches!(
            tokens.issue_refresh(&identity),
            Err(TokenError::ExpiryOutOfRange)
        ));
        assert!(matches!(
            tokens.issue_pair(&identity),
            Err(TokenError::ExpiryOutOfRange)
        ));
    }

    #[test]
    fn kinds_are_not_interchangeable() {
        let (tokens, _) = service();
        let identity = Identity::new("jane@example.com", Role::User);

        let access = tokens.issue_access(&identity).unwrap();
        let refresh = tokens.issue_refresh(&identity).unwrap();

        assert!(matches!(
            tokens.validate_refresh(&access),
            Err(TokenError::Invalid)
        ));
        assert!(matches!(
            tokens.validate_access(&refresh),
            Err(TokenError::Invalid)
        ));
        assert!(tokens.expiration_of(&refresh).is_err());
    }

    #[test]
    fn access_token_expires_exactly_at_window_end() {
        let (tokens, clock) = service();
        let identity = Identity::new("jane@example.com", Role::User);
        let token = tokens.issue_access(&identity).unwrap();
        let exp = start() + Duration::minutes(15);

        clock.set(exp - Duration::milliseconds(1));
        assert!(tokens.validate_access(&token).is_ok());

        clock.set(exp);
        assert!(matches!(
            tokens.validate_access(&token),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn refresh_token_outlives_access_token() {
        let (tokens, clock) = service();
        let identity = Identity::new("jane@example.com", Role::User);
        let access = tokens.issue_access(&identity).unwrap();
        let refresh = tokens.issue_refresh(&identity).unwrap();

        clock.advance(Duration::hours(1));
        assert!(tokens.validate_access(&access).is_err());
        assert!(tokens.validate_refresh(&refresh).is_ok());

        clock.advance(Duration::hours(23));
        assert!(tokens.validate_refresh(&refresh).is_err());
    }

    #[test]
    fn other_secret_never_validates() {
        let clock = Arc::new(ManualClock::at(start()));
        let ours = service_with(SECRET, clock.clone());
        let theirs = service_with(b"fedcba9876543210fedcba9876543210", clock);
        let identity = Identity::new("jane@example.com", Role::Admin);

        let access = theirs.issue_access(&identity).unwrap();
        let refresh = theirs.issue_refresh(&identity).unwrap();

        assert!(ours.validate_access(&access).is_err());
        assert!(ours.validate_refresh(&refresh).is_err());
    }

    #[test]
    fn expiration_of_reports_absolute_expiry() {
        let (tokens, _) = service();
        let identity = Identity::new("jane@example.com", Role::User);
        let token = tokens.issue_access(&identity).unwrap();

        assert_eq!(
            tokens.expiration_of(&token).unwrap(),
            start() + Duration::minutes(15)
        );
    }

    #[test]
    fn issue_pair_shares_subject_and_reports_access_expiry() {
        let (tokens, clock) = service();
        let identity = Identity::new("root@example.com", Role::Admin);
        let pair = tokens.issue_pair(&identity).unwrap();

        assert_eq!(pair.access_expires_at, start() + Duration::minutes(15));
        assert_eq!(
            tokens.validate_access(&pair.access_token).unwrap(),
            identity.id()
        );
        assert_eq!(
            tokens.validate_refresh(&pair.refresh_token).unwrap(),
            identity.id()
        );

        // a later pair is a new token, the old one is untouched
        clock.advance(Duration::seconds(5));
        let next = tokens.issue_pair(&identity).unwrap();
        assert_ne!(next.refresh_token, pair.refresh_token);
        assert!(tokens.validate_refresh(&pair.refresh_token).is_ok());
    }
}
