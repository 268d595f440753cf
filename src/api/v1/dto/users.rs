/*
 * Responsibility
 * - Users の request/response DTO
 * - validation (形式チェック) 用の validate() を持たせる
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repos::user_repo::UserRecord;
use crate::services::auth::Role;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl CreateUserRequest {
    /// 前後の空白を落とした上で検証する
    pub fn normalized(self) -> Result<Self, &'static str> {
        let req = Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.trim().to_string(),
        };

        if req.name.is_empty() {
            return Err("name is required");
        }
        if req.name.len() > 255 {
            return Err("name must be <= 255 chars");
        }
        if !is_plausible_email(&req.email) {
            return Err("email must be a valid email address");
        }
        if req.password.is_empty() {
            return Err("password is required");
        }

        Ok(req)
    }
}

fn is_plausible_email(email: &str) -> bool {
    if email.len() > 254 || email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
}

/// 検証済みのページ指定 (page は 0 始まり)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: i64,
    pub size: i64,
    pub offset: i64,
}

impl PageQuery {
    pub fn resolve(&self) -> Result<PageWindow, &'static str> {
        let page = self.page.unwrap_or(0);
        let size = self.size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page < 0 {
            return Err("page must be >= 0");
        }
        if !(1..=MAX_PAGE_SIZE).contains(&size) {
            return Err("size must be between 1 and 100");
        }
        let offset = page.checked_mul(size).ok_or("page is out of range")?;
        Ok(PageWindow { page, size, offset })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserSummaryResponse {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserDetailsResponse {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub size: i64,
    pub total: i64,
}

impl From<UserRecord> for UserSummaryResponse {
    fn from(u: UserRecord) -> Self {
        Self {
            user_id: u.id,
            name: u.name,
            email: u.email,
        }
    }
}

impl From<UserRecord> for UserDetailsResponse {
    fn from(u: UserRecord) -> Self {
        Self {
            user_id: u.id,
            name: u.name,
            email: u.email,
            role: u.role,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(name: &str, email: &str, password: &str) -> CreateUserRequest {
        CreateUserRequest {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn normalizes_whitespace() {
        let r = req("  Jane ", " jane@example.com ", " pwd ").normalized().unwrap();
        assert_eq!(r.name, "Jane");
        assert_eq!(r.email, "jane@example.com");
        assert_eq!(r.password, "pwd");
    }

    #[test]
    fn rejects_blank_fields_and_bad_email() {
        assert!(req(" ", "jane@example.com", "pwd").normalized().is_err());
        assert!(req("Jane", "jane@example.com", "  ").normalized().is_err());
        for email in ["", "jane", "@example.com", "jane@", "ja ne@example.com", "a@b@c"] {
            assert!(req("Jane", email, "pwd").normalized().is_err(), "{email}");
        }
    }

    #[test]
    fn page_query_bounds() {
        let q = |page, size| PageQuery { page, size }.resolve();
        assert_eq!(
            q(None, None),
            Ok(PageWindow {
                page: 0,
                size: DEFAULT_PAGE_SIZE,
                offset: 0
            })
        );
        assert_eq!(
            q(Some(2), Some(100)),
            Ok(PageWindow {
                page: 2,
                size: 100,
                offset: 200
            })
        );
        assert!(q(Some(-1), None).is_err());
        assert!(q(None, Some(0)).is_err());
        assert!(q(None, Some(101)).is_err());
    }

    #[test]
    fn page_offset_never_overflows() {
        let q = |page, size| PageQuery { page, size }.resolve();
        assert!(q(Some(i64::MAX), None).is_err());
        assert!(q(Some(i64::MAX / 100 + 1), Some(100)).is_err());
        assert_eq!(
            q(Some(i64::MAX / 100), Some(100)).map(|w| w.offset),
            Ok(i64::MAX / 100 * 100)
        );
    }
}
