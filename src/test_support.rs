//! Test-only doubles: an in-memory `UserRepo` and a ready-made `AppState`.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use crate::repos::error::{RepoError, RepoResult};
use crate::repos::user_repo::{NewUser, UserRecord, UserRepo};
use crate::services::auth::cookie::CookiePolicy;
use crate::services::auth::identity::Role;
use crate::services::auth::jwt::TokenCodec;
use crate::services::auth::password::hash_password;
use crate::services::auth::token_service::TokenService;
use crate::services::clock::ManualClock;
use crate::state::AppState;

pub const TEST_SECRET: &[u8] = b"test-secret-test-secret-test-sec";
pub const TEST_ISSUER: &str = "staff-manager";

pub fn test_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 6, 1, 12, 0, 0).unwrap()
}

#[derive(Debug, Default)]
pub struct MemoryUserRepo {
    users: Mutex<Vec<UserRecord>>,
}

impl MemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, name: &str, email: &str, password: &str, role: Role) -> UserRecord {
        let now = test_start();
        let record = UserRecord {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: hash_password(password).unwrap(),
            role,
            created_at: now,
            updated_at: now,
        };
        self.users.lock().unwrap().push(record.clone());
        record
    }

    pub fn remove(&self, email: &str) {
        self.users.lock().unwrap().retain(|u| u.email != email);
    }
}

#[async_trait]
impl UserRepo for MemoryUserRepo {
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<UserRecord>> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<UserRecord>> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn exists_by_email(&self, email: &str) -> RepoResult<bool> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().any(|u| u.email == email))
    }

    async fn list(&self, offset: i64, limit: i64) -> RepoResult<Vec<UserRecord>> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .rev()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn count(&self) -> RepoResult<i64> {
        Ok(self.users.lock().unwrap().len() as i64)
    }

    async fn insert(&self, user: NewUser) -> RepoResult<UserRecord> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(RepoError::Conflict);
        }
        let now = test_start();
        let record = UserRecord {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        users.push(record.clone());
        Ok(record)
    }
}

/// Every call fails as if the database were unreachable.
#[derive(Debug, Default)]
pub struct FailingUserRepo;

#[async_trait]
impl UserRepo for FailingUserRepo {
    async fn find_by_email(&self, _email: &str) -> RepoResult<Option<UserRecord>> {
        Err(RepoError::Db(sqlx::Error::PoolTimedOut))
    }

    async fn find_by_id(&self, _id: Uuid) -> RepoResult<Option<UserRecord>> {
        Err(RepoError::Db(sqlx::Error::PoolTimedOut))
    }

    async fn exists_by_email(&self, _email: &str) -> RepoResult<bool> {
        Err(RepoError::Db(sqlx::Error::PoolTimedOut))
    }

    async fn list(&self, _offset: i64, _limit: i64) -> RepoResult<Vec<UserRecord>> {
        Err(RepoError::Db(sqlx::Error::PoolTimedOut))
    }

    async fn count(&self) -> RepoResult<i64> {
        Err(RepoError::Db(sqlx::Error::PoolTimedOut))
    }

    async fn insert(&self, _user: NewUser) -> RepoResult<UserRecord> {
        Err(RepoError::Db(sqlx::Error::PoolTimedOut))
    }
}

pub struct TestApp {
    pub state: AppState,
    pub users: Arc<MemoryUserRepo>,
    pub clock: Arc<ManualClock>,
}

/// State with a frozen clock, 15 min / 24 h windows and a Secure-less cookie.
pub fn test_app() -> TestApp {
    let users = Arc::new(MemoryUserRepo::new());
    let clock = Arc::new(ManualClock::at(test_start()));
    let tokens = TokenService::new(
        TokenCodec::new(TEST_SECRET, TEST_ISSUER.to_string()),
        Duration::minutes(15),
        Duration::minutes(1440),
        clock.clone(),
    );
    let cookies = CookiePolicy::new(false, true);
    let state = AppState::new(Arc::new(tokens), users.clone(), cookies);

    TestApp {
        state,
        users,
        clock,
    }
}
