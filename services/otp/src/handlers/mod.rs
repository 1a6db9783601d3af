pub mod admin;
pub mod auth;
pub mod otp;

use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;

use crate::domain::types::{User, UserRole};
use crate::error::OtpServiceError;
use crate::state::AppState;
use crate::usecase::token::AuthenticateUseCase;

/// Resolve the Bearer token to a live user and enforce the endpoint's role.
/// A missing header fails exactly like a bad token; the wrong role is the
/// only condition that surfaces separately (403).
pub(crate) async fn require_role(
    state: &AppState,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    role: UserRole,
) -> Result<User, OtpServiceError> {
    let TypedHeader(auth) = bearer.ok_or(OtpServiceError::Authentication)?;
    let usecase = AuthenticateUseCase {
        users: state.users.clone(),
        jwt_secret: state.jwt_secret.clone(),
    };
    let user = usecase.execute(auth.token()).await?;
    if user.role != role {
        return Err(OtpServiceError::Authorization);
    }
    Ok(user)
}
