/*
 * Responsibility
 * - 環境変数や設定の読み込み (DATABASE_URL, JWT 設定, Cookie/CORS 設定など)
 * - 設定値のバリデーション (不足・不正なら起動失敗)
 * - テストでは from_lookup に任意の key → value 関数を渡す
 */
use std::net::SocketAddr;
use std::str::FromStr;

use thiserror::Error;

/// HMAC-SHA256 の鍵として最低限必要な長さ (bytes)
const MIN_SECRET_LEN: usize = 32;
/// token window の上限 (10 年)
const MAX_TTL_MINUTES: i64 = 60 * 24 * 365 * 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: Option<String>) -> Self {
        match value
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Seed account created at startup when both email and password are configured.
#[derive(Clone)]
pub struct DefaultAdmin {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for DefaultAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultAdmin")
            .field("name", &self.name)
            .field("email", &self.email)
            .finish()
    }
}

#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub database_url: String,
    pub database_max_connections: u32,

    pub jwt_secret: String,
    pub jwt_issuer: String,
    // Token lifetimes (minutes)
    pub access_token_ttl_minutes: i64,
    pub refresh_token_ttl_minutes: i64,

    pub cookie_secure: bool,
    pub cookie_http_only: bool,

    pub cors_allowed_origins: Vec<String>,
    pub http_timeout_seconds: u64,
    pub http_body_limit_bytes: usize,

    pub default_admin: Option<DefaultAdmin>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print the secret or the database credentials
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("jwt_issuer", &self.jwt_issuer)
            .field("access_token_ttl_minutes", &self.access_token_ttl_minutes)
            .field("refresh_token_ttl_minutes", &self.refresh_token_ttl_minutes)
            .field("cookie_secure", &self.cookie_secure)
            .field("cookie_http_only", &self.cookie_http_only)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("default_admin", &self.default_admin)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = parse_or(&lookup, "PORT", 3000)?;
        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(lookup("APP_ENV"));

        let database_url = required(&lookup, "DATABASE_URL")?;
        let database_max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 5)?;

        let jwt_secret = required(&lookup, "JWT_SECRET")?;
        if jwt_secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::Invalid("JWT_SECRET"));
        }
        let jwt_issuer = lookup("JWT_ISSUER")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "staff-manager".to_string());

        let access_token_ttl_minutes = parse_or(&lookup, "ACCESS_TOKEN_TTL_MINUTES", 15)?; // 15 min
        if !(1..=MAX_TTL_MINUTES).contains(&access_token_ttl_minutes) {
            return Err(ConfigError::Invalid("ACCESS_TOKEN_TTL_MINUTES"));
        }
        let refresh_token_ttl_minutes = parse_or(&lookup, "REFRESH_TOKEN_TTL_MINUTES", 1440)?; // 24 h
        if !(1..=MAX_TTL_MINUTES).contains(&refresh_token_ttl_minutes) {
            return Err(ConfigError::Invalid("REFRESH_TOKEN_TTL_MINUTES"));
        }

        let cookie_secure = parse_bool_or(&lookup, "COOKIE_SECURE", app_env.is_production())?;
        let cookie_http_only = parse_bool_or(&lookup, "COOKIE_HTTP_ONLY", true)?;

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let http_timeout_seconds = parse_or(&lookup, "HTTP_TIMEOUT_SECONDS", 30)?;
        let http_body_limit_bytes = parse_or(&lookup, "HTTP_BODY_LIMIT_BYTES", 1024 * 1024)?;

        let default_admin = match (
            lookup("DEFAULT_ADMIN_EMAIL").filter(|s| !s.trim().is_empty()),
            lookup("DEFAULT_ADMIN_PASSWORD").filter(|s| !s.trim().is_empty()),
        ) {
            (Some(email), Some(password)) => Some(DefaultAdmin {
                name: lookup("DEFAULT_ADMIN_NAME").unwrap_or_else(|| "Administrator".to_string()),
                email: email.trim().to_string(),
                password: password.trim().to_string(),
            }),
            _ => None,
        };

        Ok(Self {
            addr,
            app_env,
            database_url,
            database_max_connections,
            jwt_secret,
            jwt_issuer,
            access_token_ttl_minutes,
            refresh_token_ttl_minutes,
            cookie_secure,
            cookie_http_only,
            cors_allowed_origins,
            http_timeout_seconds,
            http_body_limit_bytes,
            default_admin,
        })
    }
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(key))
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

fn parse_bool_or<F>(lookup: &F, key: &'static str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) => match v.as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid(key)),
        },
    }
}
