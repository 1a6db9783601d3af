use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::types::{OtpPolicy, UserRole};
use crate::error::OtpServiceError;
use crate::handlers::require_role;
use crate::state::AppState;
use crate::usecase::admin::{
    DeleteUserUseCase, GetPolicyUseCase, ListUsersUseCase, UpdatePolicyUseCase,
};

// ── GET /admin/config ────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct ConfigResponse {
    pub code_length: u8,
    pub expiry_minutes: i64,
}

pub async fn get_config(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
) -> Result<Json<ConfigResponse>, OtpServiceError> {
    require_role(&state, bearer, UserRole::Admin).await?;

    let usecase = GetPolicyUseCase {
        policy: state.policy.clone(),
    };
    let policy = usecase.execute().await?;
    Ok(Json(ConfigResponse {
        code_length: policy.code_length,
        expiry_minutes: policy.expiry_minutes,
    }))
}

// ── PUT /admin/config ────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateConfigRequest {
    pub code_length: u8,
    pub expiry_minutes: i64,
}

pub async fn update_config(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    Json(body): Json<UpdateConfigRequest>,
) -> Result<Json<OtpPolicy>, OtpServiceError> {
    require_role(&state, bearer, UserRole::Admin).await?;

    let usecase = UpdatePolicyUseCase {
        policy: state.policy.clone(),
    };
    let policy = usecase
        .execute(body.code_length, body.expiry_minutes)
        .await?;
    Ok(Json(policy))
}

// ── GET /admin/users ─────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub async fn list_users(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
) -> Result<Json<Vec<UserSummary>>, OtpServiceError> {
    require_role(&state, bearer, UserRole::Admin).await?;

    let usecase = ListUsersUseCase {
        users: state.users.clone(),
    };
    let users = usecase.execute().await?;
    let summaries = users
        .into_iter()
        .map(|u| UserSummary {
            id: u.id,
            username: u.username,
            email: u.email,
            created_at: u.created_at,
        })
        .collect();
    Ok(Json(summaries))
}

// ── DELETE /admin/users/{id} ─────────────────────────────────────────────────

pub async fn delete_user(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    Path(user_id): Path<Uuid>,
) -> Result<StatusCode, OtpServiceError> {
    require_role(&state, bearer, UserRole::Admin).await?;

    let usecase = DeleteUserUseCase {
        users: state.users.clone(),
        otp_codes: state.otp_codes.clone(),
    };
    usecase.execute(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
