/*
 * Responsibility
 * - POST /auth/login, /auth/refresh-token, /auth/logout
 * - token の発行は TokenService、cookie の組み立ては CookiePolicy に任せる
 * - refresh は filter が cookie から解決した Identity をそのまま使う (handler では検証しない)
 */
use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
};
use tracing::info;

use crate::api::v1::dto::auth::{LoginRequest, TokenResponse};
use crate::api::v1::extractors::CurrentIdentity;
use crate::error::AppError;
use crate::services::auth::{Identity, password};
use crate::state::AppState;

type SessionResponse = ([(header::HeaderName, String); 1], Json<TokenResponse>);

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<SessionResponse, AppError> {
    req.validate().map_err(AppError::invalid_request)?;
    info!(email = %req.email.trim(), "login requested");

    let user = password::authenticate(state.users.as_ref(), &req.email, &req.password).await?;

    issue_session(&state, &user.identity())
}

pub async fn refresh_token(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
) -> Result<SessionResponse, AppError> {
    info!(subject = identity.id(), "token refresh requested");
    issue_session(&state, &identity)
}

pub async fn logout(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
) -> (StatusCode, [(header::HeaderName, String); 1]) {
    info!(subject = identity.id(), "logout requested");
    // stateless: 発行済み token はそのまま期限まで有効、cookie を消すだけ
    (
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, state.cookies.clear_refresh_cookie())],
    )
}

fn issue_session(state: &AppState, identity: &Identity) -> Result<SessionResponse, AppError> {
    let pair = state.tokens.issue_pair(identity)?;
    let cookie = state
        .cookies
        .refresh_cookie(&pair.refresh_token, state.tokens.refresh_ttl());

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(TokenResponse {
            access_token: pair.access_token,
            expires_in: pair.access_expires_at.timestamp_millis(),
        }),
    ))
}
