use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account role. At most one Admin account exists system-wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Admin,
    User,
}

/// Registered account.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    /// Encoded form produced by `usecase::password::hash_password`.
    pub password_hash: String,
    pub role: UserRole,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub chat_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Lifecycle state of an OTP code. Transitions are monotone:
/// Active → Used or Active → Expired, terminal states never revert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OtpStatus {
    Active,
    Expired,
    Used,
}

/// Channel an OTP code is delivered through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryMethod {
    Sms,
    Email,
    Chat,
    File,
}

impl DeliveryMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sms => "SMS",
            Self::Email => "EMAIL",
            Self::Chat => "CHAT",
            Self::File => "FILE",
        }
    }
}

/// One-time passcode bound to a caller-supplied operation id.
#[derive(Debug, Clone)]
pub struct OtpCode {
    pub id: Uuid,
    pub user_id: Uuid,
    pub operation_id: String,
    /// Fixed-length digit string; leading zeros allowed, never parsed as an integer.
    pub code: String,
    pub status: OtpStatus,
    pub delivery_method: DeliveryMethod,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
}

impl OtpCode {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Singleton policy governing new code generation. Never retroactive:
/// already-issued codes keep the length and expiry they were created with.
#[derive(Debug, Clone, Serialize)]
pub struct OtpPolicy {
    pub code_length: u8,
    pub expiry_minutes: i64,
    pub updated_at: DateTime<Utc>,
}

impl Default for OtpPolicy {
    fn default() -> Self {
        Self {
            code_length: DEFAULT_CODE_LENGTH,
            expiry_minutes: DEFAULT_EXPIRY_MINUTES,
            updated_at: Utc::now(),
        }
    }
}

/// Allowed range for `OtpPolicy::code_length`.
pub const MIN_CODE_LENGTH: u8 = 4;
pub const MAX_CODE_LENGTH: u8 = 8;

/// Minimum `OtpPolicy::expiry_minutes`.
pub const MIN_EXPIRY_MINUTES: i64 = 1;

pub const DEFAULT_CODE_LENGTH: u8 = 6;
pub const DEFAULT_EXPIRY_MINUTES: i64 = 5;
