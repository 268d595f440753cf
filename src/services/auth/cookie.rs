//! Refresh-token cookie policy.
//!
//! Login, refresh and logout all render their `Set-Cookie` through the same policy, so the
//! `Secure` / `HttpOnly` flags can only differ by configuration, never by endpoint.

use axum::http::HeaderMap;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Duration;

pub const REFRESH_COOKIE_NAME: &str = "refresh-token";
const REFRESH_COOKIE_PATH: &str = "/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookiePolicy {
    secure: bool,
    http_only: bool,
}

impl CookiePolicy {
    pub fn new(secure: bool, http_only: bool) -> Self {
        Self { secure, http_only }
    }

    /// `Set-Cookie` value carrying a freshly issued refresh token.
    pub fn refresh_cookie(&self, token: &str, max_age: Duration) -> String {
        self.render(token, max_age.num_seconds().max(0))
    }

    /// `Set-Cookie` value that makes the browser drop the refresh token.
    pub fn clear_refresh_cookie(&self) -> String {
        self.render("", 0)
    }

    fn render(&self, value: &str, max_age_seconds: i64) -> String {
        Cookie::build((REFRESH_COOKIE_NAME, value.to_string()))
            .path(REFRESH_COOKIE_PATH)
            .max_age(time::Duration::seconds(max_age_seconds))
            .http_only(self.http_only)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .build()
            .to_string()
    }
}

/// Value of the `refresh-token` cookie, if the request carries a non-empty one.
pub fn read_refresh_cookie(headers: &HeaderMap) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(REFRESH_COOKIE_NAME)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}
