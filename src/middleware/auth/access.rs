//! Request filter: credential 抽出 → token 検証 → Identity 解決 → AuthCtx を extensions に入れる
//!
//! - refresh-token route では `refresh-token` cookie だけを見る
//! - それ以外の route では `Authorization: Bearer <token>` だけを見る
//! - credential が無い / 検証に失敗した場合は匿名のまま通す（拒否は gate の責務）
//! - token は正しいが subject のユーザーが消えている場合は 401 を返す

use axum::{
    Router,
    body::Body,
    extract::{OriginalUri, State},
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::Response,
};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::repos::error::RepoError;
use crate::services::auth::cookie::read_refresh_cookie;
use crate::services::auth::{IdentityLookup, TokenService};
use crate::state::AppState;

/// refresh token を cookie で受け取る唯一の route
pub const REFRESH_TOKEN_PATH: &str = "/api/v1/auth/refresh-token";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    Access(String),
    Refresh(String),
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("identity not found for token subject")]
    IdentityNotFound,
    #[error(transparent)]
    Lookup(#[from] RepoError),
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::IdentityNotFound => AppError::Unauthorized,
            AuthError::Lookup(e) => e.into(),
        }
    }
}

/// Router 全体に filter を掛ける。
///
/// path で refresh route を判定するので、`/api/v1` を nest した後の外側の Router に適用すること。
pub fn apply(router: Router, state: AppState) -> Router {
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let credential = {
        let path = req
            .extensions()
            .get::<OriginalUri>()
            .map(|uri| uri.0.path())
            .unwrap_or_else(|| req.uri().path());
        extract_credential(path, req.headers())
    };

    let auth_ctx = authenticate(&state.tokens, state.users.as_ref(), credential).await?;

    // middleware → gate / extractor への受け渡し
    req.extensions_mut().insert(auth_ctx);

    Ok(next.run(req).await)
}

/// route に応じて credential を 1 つだけ取り出す
pub fn extract_credential(path: &str, headers: &HeaderMap) -> Option<Credential> {
    if path == REFRESH_TOKEN_PATH {
        return read_refresh_cookie(headers).map(Credential::Refresh);
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| Credential::Access(token.to_string()))
}

/// credential を検証して AuthCtx を作る
///
/// - 検証失敗は匿名扱い (`Ok(AuthCtx::anonymous())`)
/// - subject が引けない場合は `AuthError::IdentityNotFound`
pub async fn authenticate<L>(
    tokens: &TokenService,
    lookup: &L,
    credential: Option<Credential>,
) -> Result<AuthCtx, AuthError>
where
    L: IdentityLookup + ?Sized,
{
    let validated = match credential {
        None => return Ok(AuthCtx::anonymous()),
        Some(Credential::Access(token)) => tokens.validate_access(&token),
        Some(Credential::Refresh(token)) => tokens.validate_refresh(&token),
    };

    let subject = match validated {
        Ok(subject) => subject,
        Err(err) => {
            warn!(error = %err, "credential rejected, continuing as anonymous");
            return Ok(AuthCtx::anonymous());
        }
    };

    let identity = lookup
        .find_by_identifier(&subject)
        .await
        .inspect_err(|e| error!(error = %e, "identity lookup failed"))?
        .ok_or_else(|| {
            warn!(subject = %subject, "token subject no longer exists");
            AuthError::IdentityNotFound
        })?;

    debug!(subject = identity.id(), role = %identity.role(), "request authenticated");
    Ok(AuthCtx::authenticated(identity))
}
