#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::types::{DeliveryMethod, OtpCode, OtpPolicy, OtpStatus, User, UserRole};
use crate::error::OtpServiceError;

/// Store for registered accounts.
pub trait UserStore: Send + Sync {
    /// Insert a user. The store guarantees username uniqueness and surfaces
    /// a duplicate as [`OtpServiceError::Conflict`].
    async fn save(&self, user: &User) -> Result<Uuid, OtpServiceError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, OtpServiceError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, OtpServiceError>;

    /// Whether an Admin account exists. Must be a live query — the
    /// admin-singleton invariant spans concurrent server instances, so this
    /// is never answered from a cached flag.
    async fn has_admin(&self) -> Result<bool, OtpServiceError>;

    /// List accounts, optionally filtered by role.
    async fn list_users(&self, role: Option<UserRole>) -> Result<Vec<User>, OtpServiceError>;

    /// Delete an account. Returns `false` when nothing was deleted; Admin
    /// rows are refused and also report `false`.
    async fn delete_by_id(&self, id: Uuid) -> Result<bool, OtpServiceError>;
}

/// Store for OTP code records.
pub trait OtpStore: Send + Sync {
    async fn save(&self, code: &OtpCode) -> Result<Uuid, OtpServiceError>;

    /// The Active record for an operation id if one exists, else the newest
    /// record regardless of status.
    async fn find_by_operation_id(
        &self,
        operation_id: &str,
    ) -> Result<Option<OtpCode>, OtpServiceError>;

    /// Full history for an operation id, newest first.
    async fn list_by_operation_id(
        &self,
        operation_id: &str,
    ) -> Result<Vec<OtpCode>, OtpServiceError>;

    /// Conditionally transition a record out of Active. Returns whether the
    /// transition was applied; terminal rows are left untouched and report
    /// `false` rather than erroring, so duplicate transitions are no-ops.
    async fn update_status(
        &self,
        id: Uuid,
        status: OtpStatus,
        used_at: Option<DateTime<Utc>>,
    ) -> Result<bool, OtpServiceError>;

    /// Transition every Active record past its expiry to Expired, returning
    /// how many rows changed.
    async fn bulk_expire(&self, now: DateTime<Utc>) -> Result<u64, OtpServiceError>;

    /// Remove every record belonging to a user, returning how many were removed.
    async fn delete_for_user(&self, user_id: Uuid) -> Result<u64, OtpServiceError>;
}

/// Store for the singleton generation policy.
pub trait PolicyStore: Send + Sync {
    async fn get(&self) -> Result<OtpPolicy, OtpServiceError>;

    async fn update(
        &self,
        code_length: u8,
        expiry_minutes: i64,
    ) -> Result<OtpPolicy, OtpServiceError>;
}

/// Outbound delivery channel. Implementations are single-attempt; the core
/// never retries, and a failed send never reverts a committed record.
pub trait NotificationSink: Send + Sync {
    async fn send(
        &self,
        user_id: Uuid,
        code: &str,
        method: DeliveryMethod,
    ) -> Result<(), OtpServiceError>;
}
