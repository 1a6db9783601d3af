//! In-memory store implementations.
//!
//! Persistence technology is a deployment concern; these maps behind
//! `RwLock` are the bundled implementation and double as the test fixture.
//! The conditional `update_status` is the primitive the lifecycle relies
//! on: only Active rows transition, so terminal states never revert no
//! matter how calls interleave.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::repository::{OtpStore, PolicyStore, UserStore};
use crate::domain::types::{OtpCode, OtpPolicy, OtpStatus, User, UserRole};
use crate::error::OtpServiceError;

// ── InMemoryUserStore ────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl UserStore for InMemoryUserStore {
    async fn save(&self, user: &User) -> Result<Uuid, OtpServiceError> {
        let mut users = self.users.write().unwrap();
        let duplicate = users
            .values()
            .any(|u| u.username == user.username && u.id != user.id);
        if duplicate {
            return Err(OtpServiceError::Conflict("username already exists"));
        }
        users.insert(user.id, user.clone());
        Ok(user.id)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, OtpServiceError> {
        let users = self.users.read().unwrap();
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, OtpServiceError> {
        Ok(self.users.read().unwrap().get(&id).cloned())
    }

    async fn has_admin(&self) -> Result<bool, OtpServiceError> {
        let users = self.users.read().unwrap();
        Ok(users.values().any(|u| u.role == UserRole::Admin))
    }

    async fn list_users(&self, role: Option<UserRole>) -> Result<Vec<User>, OtpServiceError> {
        let users = self.users.read().unwrap();
        let mut listed: Vec<User> = users
            .values()
            .filter(|u| role.is_none_or(|r| u.role == r))
            .cloned()
            .collect();
        listed.sort_by_key(|u| u.created_at);
        Ok(listed)
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, OtpServiceError> {
        let mut users = self.users.write().unwrap();
        match users.get(&id) {
            // Admin rows are not deletable.
            Some(u) if u.role == UserRole::Admin => Ok(false),
            Some(_) => {
                users.remove(&id);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

// ── InMemoryOtpStore ─────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct InMemoryOtpStore {
    codes: Arc<RwLock<HashMap<Uuid, OtpCode>>>,
}

impl OtpStore for InMemoryOtpStore {
    async fn save(&self, code: &OtpCode) -> Result<Uuid, OtpServiceError> {
        self.codes.write().unwrap().insert(code.id, code.clone());
        Ok(code.id)
    }

    async fn find_by_operation_id(
        &self,
        operation_id: &str,
    ) -> Result<Option<OtpCode>, OtpServiceError> {
        let codes = self.codes.read().unwrap();
        let mut matching: Vec<&OtpCode> = codes
            .values()
            .filter(|c| c.operation_id == operation_id)
            .collect();
        if let Some(active) = matching.iter().find(|c| c.status == OtpStatus::Active) {
            return Ok(Some((*active).clone()));
        }
        matching.sort_by_key(|c| c.created_at);
        Ok(matching.last().map(|c| (*c).clone()))
    }

    async fn list_by_operation_id(
        &self,
        operation_id: &str,
    ) -> Result<Vec<OtpCode>, OtpServiceError> {
        let codes = self.codes.read().unwrap();
        let mut matching: Vec<OtpCode> = codes
            .values()
            .filter(|c| c.operation_id == operation_id)
            .cloned()
            .collect();
        matching.sort_by_key(|c| std::cmp::Reverse(c.created_at));
        Ok(matching)
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: OtpStatus,
        used_at: Option<DateTime<Utc>>,
    ) -> Result<bool, OtpServiceError> {
        let mut codes = self.codes.write().unwrap();
        match codes.get_mut(&id) {
            // Conditional write: only Active rows leave Active.
            Some(code) if code.status == OtpStatus::Active => {
                code.status = status;
                code.used_at = used_at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn bulk_expire(&self, now: DateTime<Utc>) -> Result<u64, OtpServiceError> {
        let mut codes = self.codes.write().unwrap();
        let mut count = 0;
        for code in codes.values_mut() {
            if code.status == OtpStatus::Active && code.is_expired_at(now) {
                code.status = OtpStatus::Expired;
                count += 1;
            }
        }
        Ok(count)
    }

    async fn delete_for_user(&self, user_id: Uuid) -> Result<u64, OtpServiceError> {
        let mut codes = self.codes.write().unwrap();
        let before = codes.len();
        codes.retain(|_, c| c.user_id != user_id);
        Ok((before - codes.len()) as u64)
    }
}

// ── InMemoryPolicyStore ──────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct InMemoryPolicyStore {
    policy: Arc<RwLock<OtpPolicy>>,
}

impl PolicyStore for InMemoryPolicyStore {
    async fn get(&self) -> Result<OtpPolicy, OtpServiceError> {
        Ok(self.policy.read().unwrap().clone())
    }

    async fn update(
        &self,
        code_length: u8,
        expiry_minutes: i64,
    ) -> Result<OtpPolicy, OtpServiceError> {
        let mut policy = self.policy.write().unwrap();
        policy.code_length = code_length;
        policy.expiry_minutes = expiry_minutes;
        policy.updated_at = Utc::now();
        Ok(policy.clone())
    }
}
