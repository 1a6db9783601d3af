use axum::{Json, extract::State};
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use serde::{Deserialize, Serialize};

use crate::domain::types::{DeliveryMethod, UserRole};
use crate::error::OtpServiceError;
use crate::handlers::require_role;
use crate::state::AppState;
use crate::usecase::otp::{GenerateOtpInput, GenerateOtpUseCase, ValidateOtpUseCase};

// ── POST /otp/generate ───────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct GenerateOtpRequest {
    pub operation_id: String,
    pub delivery_method: DeliveryMethod,
}

#[derive(Serialize)]
pub struct GenerateOtpResponse {
    pub operation_id: String,
}

pub async fn generate_otp(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    Json(body): Json<GenerateOtpRequest>,
) -> Result<Json<GenerateOtpResponse>, OtpServiceError> {
    let user = require_role(&state, bearer, UserRole::User).await?;

    let usecase = GenerateOtpUseCase {
        otp_codes: state.otp_codes.clone(),
        policy: state.policy.clone(),
        notifier: state.notifier.clone(),
        locks: state.locks.clone(),
    };
    let operation_id = usecase
        .execute(GenerateOtpInput {
            user_id: user.id,
            operation_id: body.operation_id,
            delivery_method: body.delivery_method,
        })
        .await?;

    Ok(Json(GenerateOtpResponse { operation_id }))
}

// ── POST /otp/validate ───────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ValidateOtpRequest {
    pub operation_id: String,
    pub code: String,
}

#[derive(Serialize)]
pub struct ValidateOtpResponse {
    pub valid: bool,
}

pub async fn validate_otp(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    Json(body): Json<ValidateOtpRequest>,
) -> Result<Json<ValidateOtpResponse>, OtpServiceError> {
    require_role(&state, bearer, UserRole::User).await?;

    let usecase = ValidateOtpUseCase {
        otp_codes: state.otp_codes.clone(),
        locks: state.locks.clone(),
    };
    let valid = usecase.execute(&body.operation_id, &body.code).await?;
    Ok(Json(ValidateOtpResponse { valid }))
}
