use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;

/// Privilege tiers, lowest first. The wire form is the numeric string the
/// backend uses ("0", "1", "2"); names are accepted as aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "0", alias = "guest")]
    Guest,
    #[serde(rename = "1", alias = "user")]
    User,
    #[serde(rename = "2", alias = "admin")]
    Admin,
}

impl Role {
    pub const HIGHEST: Role = Role::Admin;
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "0" | "guest" => Ok(Role::Guest),
            "1" | "user" => Ok(Role::User),
            "2" | "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// Who is logged in (`base_role`) and what the session currently acts as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub base_role: Role,
    pub active_role: Role,
}

impl Identity {
    pub fn new(base_role: Role, active_role: Role) -> Self {
        Self {
            base_role,
            active_role,
        }
    }
}

/// Elevation may be offered only to a top-tier principal that is currently
/// acting below that tier.
pub fn is_eligible(identity: &Identity) -> bool {
    identity.active_role != Role::HIGHEST && identity.base_role == Role::HIGHEST
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionRole {
    Normal,
    Elevated,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Elevation lifetime must be positive")]
    NonPositiveTtl,

    #[error("Elevation expiry is out of the representable time range")]
    ExpiryOverflow,
}

/// In-memory elevation record. Never persisted; a fresh login starts inactive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SudoSession {
    pub active: bool,
    pub role: SessionRole,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Default for SudoSession {
    fn default() -> Self {
        Self {
            active: false,
            role: SessionRole::Normal,
            expires_at: None,
        }
    }
}

impl SudoSession {
    /// Activate until `now + ttl`. On error the session is left unchanged,
    /// so an active session always expires strictly after `now`.
    pub fn elevate(&mut self, now: DateTime<Utc>, ttl: Duration) -> Result<(), SessionError> {
        if ttl <= Duration::zero() {
            return Err(SessionError::NonPositiveTtl);
        }
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or(SessionError::ExpiryOverflow)?;

        self.active = true;
        self.role = SessionRole::Elevated;
        self.expires_at = Some(expires_at);
        Ok(())
    }

    pub fn close(&mut self) {
        *self = Self::default();
    }

    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.active && self.expires_at.is_some_and(|expires| expires > now)
    }
}

/// Process-wide shared view of the sudo session
#[derive(Debug, Clone, Default)]
pub struct SessionHandle {
    inner: Arc<RwLock<SudoSession>>,
}

impl SessionHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> SudoSession {
        self.read().clone()
    }

    pub fn elevate(&self, now: DateTime<Utc>, ttl: Duration) -> Result<(), SessionError> {
        self.write().elevate(now, ttl)
    }

    /// Expiry or logout reported by the session store
    pub fn close(&self) {
        self.write().close();
    }

    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.read().is_active_at(now)
    }

    fn read(&self) -> RwLockReadGuard<'_, SudoSession> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, SudoSession> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
