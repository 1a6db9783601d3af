use uuid::Uuid;

use crate::domain::repository::{OtpStore, PolicyStore, UserStore};
use crate::domain::types::{
    MAX_CODE_LENGTH, MIN_CODE_LENGTH, MIN_EXPIRY_MINUTES, OtpPolicy, User, UserRole,
};
use crate::error::OtpServiceError;

// ── GetPolicy ────────────────────────────────────────────────────────────────

pub struct GetPolicyUseCase<P: PolicyStore> {
    pub policy: P,
}

impl<P: PolicyStore> GetPolicyUseCase<P> {
    pub async fn execute(&self) -> Result<OtpPolicy, OtpServiceError> {
        self.policy.get().await
    }
}

// ── UpdatePolicy ─────────────────────────────────────────────────────────────

pub struct UpdatePolicyUseCase<P: PolicyStore> {
    pub policy: P,
}

impl<P: PolicyStore> UpdatePolicyUseCase<P> {
    /// Replace the generation policy. Prospective only — codes already
    /// issued keep the length and expiry they were created with.
    pub async fn execute(
        &self,
        code_length: u8,
        expiry_minutes: i64,
    ) -> Result<OtpPolicy, OtpServiceError> {
        if !(MIN_CODE_LENGTH..=MAX_CODE_LENGTH).contains(&code_length) {
            return Err(OtpServiceError::Validation {
                field: "code_length",
                reason: "must be between 4 and 8",
            });
        }
        if expiry_minutes < MIN_EXPIRY_MINUTES {
            return Err(OtpServiceError::Validation {
                field: "expiry_minutes",
                reason: "must be at least 1",
            });
        }
        self.policy.update(code_length, expiry_minutes).await
    }
}

// ── ListUsers ────────────────────────────────────────────────────────────────

pub struct ListUsersUseCase<U: UserStore> {
    pub users: U,
}

impl<U: UserStore> ListUsersUseCase<U> {
    /// User-role accounts only; the Admin account is not listed.
    pub async fn execute(&self) -> Result<Vec<User>, OtpServiceError> {
        self.users.list_users(Some(UserRole::User)).await
    }
}

// ── DeleteUser ───────────────────────────────────────────────────────────────

pub struct DeleteUserUseCase<U: UserStore, O: OtpStore> {
    pub users: U,
    pub otp_codes: O,
}

impl<U: UserStore, O: OtpStore> DeleteUserUseCase<U, O> {
    /// Remove an account and every OTP record it owns. Codes go first so a
    /// crash in between leaves no orphaned records. The store refuses Admin
    /// rows, which surfaces here as NotFound.
    pub async fn execute(&self, user_id: Uuid) -> Result<(), OtpServiceError> {
        self.otp_codes.delete_for_user(user_id).await?;
        if !self.users.delete_by_id(user_id).await? {
            return Err(OtpServiceError::NotFound);
        }
        Ok(())
    }
}
