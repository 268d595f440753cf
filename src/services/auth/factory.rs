/// Factory: build auth services from application `Config`.
use std::sync::Arc;

use chrono::Duration;

use crate::config::Config;
use crate::services::auth::{CookiePolicy, TokenCodec, TokenService};
use crate::services::clock::Clock;

pub fn build_token_service(config: &Config, clock: Arc<dyn Clock>) -> Arc<TokenService> {
    let codec = TokenCodec::new(config.jwt_secret.as_bytes(), config.jwt_issuer.clone());

    Arc::new(TokenService::new(
        codec,
        Duration::minutes(config.access_token_ttl_minutes),
        Duration::minutes(config.refresh_token_ttl_minutes),
        clock,
    ))
}

pub fn build_cookie_policy(config: &Config) -> CookiePolicy {
    CookiePolicy::new(config.cookie_secure, config.cookie_http_only)
}
