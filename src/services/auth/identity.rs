/*
 * Responsibility
 * - 認証済み主体 (Identity) と権限 (Capability) の型
 * - 保存されている Role → Capability 集合 の写像 (ADMIN ⇒ {ADMIN, USER})
 * - Identity を引くための外部協力者インターフェース (IdentityLookup)
 */
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::repos::error::RepoError;

/// Role as persisted on a user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Admin => "ADMIN",
        }
    }

    pub fn capabilities(&self) -> CapabilitySet {
        match self {
            Self::User => CapabilitySet::USER,
            Self::Admin => CapabilitySet::ADMIN,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = RepoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Self::User),
            "ADMIN" => Ok(Self::Admin),
            other => Err(RepoError::InvalidRole(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    User,
    Admin,
}

/// Capabilities granted to an identity.
///
/// Only constructible from a [`Role`], so ADMIN always comes with USER.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilitySet {
    user: bool,
    admin: bool,
}

impl CapabilitySet {
    const USER: Self = Self {
        user: true,
        admin: false,
    };
    const ADMIN: Self = Self {
        user: true,
        admin: true,
    };

    pub fn contains(&self, capability: Capability) -> bool {
        match capability {
            Capability::User => self.user,
            Capability::Admin => self.admin,
        }
    }
}

/// Authenticated principal. Built per request from a validated token, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    id: String,
    role: Role,
}

impl Identity {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }

    /// Identifier carried as the token subject (the account email).
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn capabilities(&self) -> CapabilitySet {
        self.role.capabilities()
    }

    pub fn has(&self, capability: Capability) -> bool {
        self.capabilities().contains(capability)
    }
}

/// Resolves a token subject into a full [`Identity`].
///
/// `Ok(None)` means the subject no longer exists.
#[async_trait]
pub trait IdentityLookup: Send + Sync {
    async fn find_by_identifier(&self, subject: &str) -> Result<Option<Identity>, RepoError>;
}
