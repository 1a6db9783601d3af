use chrono::Utc;
use uuid::Uuid;

use crate::domain::repository::UserStore;
use crate::domain::types::{User, UserRole};
use crate::error::OtpServiceError;
use crate::usecase::password::{hash_password, verify_password};
use crate::usecase::token::issue_token;

// ── RegisterUser ─────────────────────────────────────────────────────────────

pub struct RegisterUserInput {
    pub username: String,
    pub password: String,
    pub role: UserRole,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub chat_id: Option<String>,
}

pub struct RegisterUserUseCase<U: UserStore> {
    pub users: U,
}

impl<U: UserStore> RegisterUserUseCase<U> {
    pub async fn execute(&self, input: RegisterUserInput) -> Result<User, OtpServiceError> {
        if input.username.is_empty() {
            return Err(OtpServiceError::Validation {
                field: "username",
                reason: "must not be empty",
            });
        }
        if input.password.is_empty() {
            return Err(OtpServiceError::Validation {
                field: "password",
                reason: "must not be empty",
            });
        }

        // At most one Admin system-wide. The check is a live store query;
        // caching it would break the invariant across concurrent instances.
        if input.role == UserRole::Admin && self.users.has_admin().await? {
            return Err(OtpServiceError::Conflict("admin already exists"));
        }

        let user = User {
            id: Uuid::now_v7(),
            username: input.username,
            password_hash: hash_password(&input.password),
            role: input.role,
            email: input.email,
            phone: input.phone,
            chat_id: input.chat_id,
            created_at: Utc::now(),
        };
        // Duplicate usernames surface as Conflict via the store's uniqueness
        // guarantee.
        self.users.save(&user).await?;
        Ok(user)
    }
}

// ── Login ────────────────────────────────────────────────────────────────────

pub struct LoginInput {
    pub username: String,
    pub password: String,
}

pub struct LoginUseCase<U: UserStore> {
    pub users: U,
    pub jwt_secret: String,
    pub token_ttl_secs: u64,
}

impl<U: UserStore> LoginUseCase<U> {
    /// Exchange credentials for a signed session token. Unknown username and
    /// wrong password are indistinguishable to the caller.
    pub async fn execute(&self, input: LoginInput) -> Result<String, OtpServiceError> {
        let user = self
            .users
            .find_by_username(&input.username)
            .await?
            .ok_or(OtpServiceError::Authentication)?;

        if !verify_password(&input.password, &user.password_hash) {
            return Err(OtpServiceError::Authentication);
        }

        issue_token(&user, &self.jwt_secret, self.token_ttl_secs)
    }
}
