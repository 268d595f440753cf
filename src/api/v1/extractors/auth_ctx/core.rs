use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::auth::Identity;
use crate::state::AppState;

use super::AuthCtx;

/// Handler で、認証済み Identity を受け取るための extractor
/// middleware が AuthCtx を request.extensions() に insert 済みである前提
/// 匿名 (または middleware 未設定) なら 401 を返す
pub struct CurrentIdentity(pub Identity);

impl FromRequestParts<AppState> for CurrentIdentity
where
    AppState: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthCtx>()
            .and_then(AuthCtx::identity)
            .cloned()
            .map(CurrentIdentity)
            .ok_or(AppError::Unauthorized)
    }
}
