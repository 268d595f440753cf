/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON error body)
 * - RepoError / TokenError / CredentialError / AuthError を統一的に変換
 *
 * Notes
 * - 401 のメッセージはどの検証で落ちたか (期限切れ/改ざん/種別違い) を区別しない
 */
use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::repos::error::RepoError;
use crate::services::auth::jwt::TokenError;
use crate::services::auth::password::{CredentialError, PasswordError};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidRequest(String),
    #[error("The provided JWT token is missing, expired, or invalid.")]
    Unauthorized,
    #[error("Nonexistent email or invalid password.")]
    BadCredentials,
    #[error("Access denied.")]
    Forbidden,
    #[error("{0} not found.")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(String),
    #[error("An unexpected error has occurred.")]
    Internal,
}

impl AppError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            AppError::BadCredentials => (StatusCode::UNAUTHORIZED, "BAD_CREDENTIALS"),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL"),
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code,
                message: self.to_string(),
            },
        };

        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Conflict => AppError::conflict("resource already exists"),
            other => {
                error!(error = %other, "repository failure");
                AppError::Internal
            }
        }
    }
}

impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Invalid => AppError::Unauthorized,
            // issuance failures are server-side, not the client's
            TokenError::Signing(_) | TokenError::ExpiryOutOfRange => {
                error!(error = %e, "token issuance failure");
                AppError::Internal
            }
        }
    }
}

impl From<PasswordError> for AppError {
    fn from(e: PasswordError) -> Self {
        error!(error = %e, "password hashing failure");
        AppError::Internal
    }
}

impl From<CredentialError> for AppError {
    fn from(e: CredentialError) -> Self {
        match e {
            CredentialError::BadCredentials => AppError::BadCredentials,
            CredentialError::Password(e) => e.into(),
            CredentialError::Repo(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_carries_challenge_and_generic_message() {
        let response = AppError::Unauthorized.into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }

    #[test]
    fn token_errors_never_distinguish_causes() {
        assert!(matches!(
            AppError::from(TokenError::Invalid),
            AppError::Unauthorized
        ));
        assert!(matches!(
            AppError::from(TokenError::ExpiryOutOfRange),
            AppError::Internal
        ));
    }

    #[test]
    fn status_mapping() {
        let cases = [
            (AppError::invalid_request("x"), StatusCode::BAD_REQUEST),
            (AppError::BadCredentials, StatusCode::UNAUTHORIZED),
            (AppError::Forbidden, StatusCode::FORBIDDEN),
            (AppError::NotFound("User"), StatusCode::NOT_FOUND),
            (AppError::conflict("dup"), StatusCode::CONFLICT),
            (AppError::Internal, StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn repo_conflict_maps_to_409() {
        assert!(matches!(
            AppError::from(RepoError::Conflict),
            AppError::Conflict(_)
        ));
        assert!(matches!(
            AppError::from(RepoError::InvalidRole("ROOT".into())),
            AppError::Internal
        ));
    }
}
