/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - tokens: TokenService, users: UserRepo, cookies: CookiePolicy
 * - Clone 前提で持つ (内部は Arc/Copy で cheap)
 * - リクエスト毎の状態は持たない (Identity は request extensions 側)
 */
use std::sync::Arc;

use crate::repos::user_repo::UserRepo;
use crate::services::auth::{CookiePolicy, TokenService};

#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<TokenService>,
    pub users: Arc<dyn UserRepo>,
    pub cookies: CookiePolicy,
}

impl AppState {
    pub fn new(tokens: Arc<TokenService>, users: Arc<dyn UserRepo>, cookies: CookiePolicy) -> Self {
        Self {
            tokens,
            users,
            cookies,
        }
    }
}
