/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - route ごとの要求 (PUBLIC / USER / ADMIN) を gate::require でまとめて宣言する
 * - 同じ path でも method 単位で別 group に置ける (merge 時に MethodRouter が合成される)
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::api::v1::handlers::{
    auth::{login, logout, refresh_token},
    health::health,
    users::{create_user, get_user, list_users, me},
};
use crate::middleware::auth::gate::{self, Requirement};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    let public = Router::new()
        .route("/health", get(health))
        .route("/auth/login", post(login))
        .route("/users", post(create_user));

    // refresh-token: filter が cookie から Identity を解決する
    let user = Router::new()
        .route("/auth/refresh-token", post(refresh_token))
        .route("/auth/logout", post(logout))
        .route("/users/me", get(me));

    let admin = Router::new()
        .route("/users", get(list_users))
        .route("/users/{user_id}", get(get_user));

    Router::new()
        .merge(gate::require(public, Requirement::Public))
        .merge(gate::require(user, Requirement::User))
        .merge(gate::require(admin, Requirement::Admin))
}
