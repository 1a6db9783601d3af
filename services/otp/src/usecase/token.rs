use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::domain::repository::UserStore;
use crate::domain::types::{User, UserRole};
use crate::error::OtpServiceError;

/// JWT claims carried by a session token. The server holds no revocation
/// state; a token is valid until `exp`.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Username.
    pub sub: String,
    pub user_id: Uuid,
    pub role: UserRole,
    /// Issued-at, seconds since UNIX epoch.
    pub iat: u64,
    /// Expiration, seconds since UNIX epoch.
    pub exp: u64,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before UNIX epoch")
        .as_secs()
}

/// Sign a session token for a user. HS256 over the server-held secret.
pub fn issue_token(user: &User, secret: &str, ttl_secs: u64) -> Result<String, OtpServiceError> {
    let iat = now_secs();
    let claims = TokenClaims {
        sub: user.username.clone(),
        user_id: user.id,
        role: user.role,
        iat,
        exp: iat + ttl_secs,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| OtpServiceError::Storage(e.into()))
}

/// Decode and validate a session token (signature + expiry). Any failure
/// collapses to the single Authentication error.
pub fn decode_token(token: &str, secret: &str) -> Result<TokenClaims, OtpServiceError> {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = true;
    validation.required_spec_claims.clear();
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|_| OtpServiceError::Authentication)?;

    Ok(data.claims)
}

// ── Authenticate ─────────────────────────────────────────────────────────────

/// Resolve a session token to its live user record.
///
/// The user is re-resolved against the store on every call — never cached —
/// so deletions and role changes take effect on the very next request. A
/// dangling `user_id` fails exactly like a bad signature.
pub struct AuthenticateUseCase<U: UserStore> {
    pub users: U,
    pub jwt_secret: String,
}

impl<U: UserStore> AuthenticateUseCase<U> {
    pub async fn execute(&self, token: &str) -> Result<User, OtpServiceError> {
        let claims = decode_token(token, &self.jwt_secret)?;
        self.users
            .find_by_id(claims.user_id)
            .await?
            .ok_or(OtpServiceError::Authentication)
    }
}
