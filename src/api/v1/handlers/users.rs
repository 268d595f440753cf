/*
 * Responsibility
 * - /users 系 handler (登録 / 自分 / 一覧 / 詳細)
 * - Path/Json/Query を extractor で受け、DTO validation → repo 呼び出し
 * - 権限チェックは gate 側で済んでいる前提 (handler では Identity を使うだけ)
 */
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    api::v1::{
        dto::users::{
            CreateUserRequest, PageQuery, PageResponse, UserDetailsResponse, UserSummaryResponse,
        },
        extractors::CurrentIdentity,
    },
    error::AppError,
    repos::user_repo::NewUser,
    services::auth::{Role, password::hash_password},
    state::AppState,
};

pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserSummaryResponse>), AppError> {
    let req = req.normalized().map_err(AppError::invalid_request)?;

    if state.users.exists_by_email(&req.email).await? {
        debug!(email = %req.email, "registration with existing email");
        return Err(AppError::conflict(
            "A user with the provided email address already exists.",
        ));
    }

    let password_hash = hash_password(&req.password)?;
    let row = state
        .users
        .insert(NewUser {
            name: req.name,
            email: req.email,
            password_hash,
            role: Role::User,
        })
        .await?;

    info!(user_id = %row.id, "user registered");
    Ok((StatusCode::CREATED, Json(row.into())))
}

pub async fn me(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
) -> Result<Json<UserDetailsResponse>, AppError> {
    let row = state
        .users
        .find_by_email(identity.id())
        .await?
        .ok_or(AppError::NotFound("User"))?;

    Ok(Json(row.into()))
}

pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PageResponse<UserSummaryResponse>>, AppError> {
    let window = query.resolve().map_err(AppError::invalid_request)?;

    let rows = state.users.list(window.offset, window.size).await?;
    let total = state.users.count().await?;

    Ok(Json(PageResponse {
        items: rows.into_iter().map(Into::into).collect(),
        page: window.page,
        size: window.size,
        total,
    }))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserDetailsResponse>, AppError> {
    let row = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or(AppError::NotFound("User"))?;

    Ok(Json(row.into()))
}
