/*
 * Responsibility
 * - Config読み込み → 依存生成 (DB pool / TokenService / CookiePolicy) → Router 組み立て
 * - Middleware の適用順をここで決める (外側から http → cors → security headers → auth filter)
 * - 初期管理者の投入
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc};

use anyhow::{Context, Result};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    api,
    config::{Config, DefaultAdmin},
    middleware,
    repos::user_repo::{NewUser, PgUserRepo, UserRepo},
    services::{
        auth::{Role, build_cookie_policy, build_token_service, password::hash_password},
        clock::SystemClock,
    },
    state::AppState,
};

fn init_tracing() {
    // RUST_LOG があればそれを優先
    // Ex:
    // RUST_LOG=info,staff_manager=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // development: 即落とす / production: default hook に任せてプロセスは生かす
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to run migrations")?;

    let users: Arc<dyn UserRepo> = Arc::new(PgUserRepo::new(pool));

    if let Some(admin) = &config.default_admin {
        // 失敗しても起動は続ける (ログイン可能な管理者がいないだけ)
        if let Err(e) = seed_default_admin(users.as_ref(), admin).await {
            tracing::error!(error = %e, email = %admin.email, "failed to seed default admin");
        }
    }

    let tokens = build_token_service(config, Arc::new(SystemClock));
    let cookies = build_cookie_policy(config);

    Ok(AppState::new(tokens, users, cookies))
}

/// 初期管理者が未登録なら ADMIN で作る (既にあれば何もしない)
async fn seed_default_admin(users: &dyn UserRepo, admin: &DefaultAdmin) -> Result<()> {
    if users.exists_by_email(&admin.email).await? {
        tracing::debug!(email = %admin.email, "default admin already present");
        return Ok(());
    }

    let password_hash = hash_password(&admin.password)?;
    let created = users
        .insert(NewUser {
            name: admin.name.clone(),
            email: admin.email.clone(),
            password_hash,
            role: Role::Admin,
        })
        .await?;

    tracing::info!(user_id = %created.id, email = %created.email, "default admin created");
    Ok(())
}

fn build_router(state: AppState, config: &Config) -> Router {
    let router = Router::new()
        .nest("/api/v1", api::v1::routes())
        .with_state(state.clone());

    // 後から layer したものほど外側
    let router = middleware::auth::access::apply(router, state);
    let router = middleware::security_headers::apply(router);
    let router = middleware::cors::apply(router, config);
    middleware::http::apply(router, config)
}
