use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::types::UserRole;
use crate::error::OtpServiceError;
use crate::state::AppState;
use crate::usecase::auth::{LoginInput, LoginUseCase, RegisterUserInput, RegisterUserUseCase};

// ── POST /auth/register ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub role: UserRole,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub chat_id: Option<String>,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub id: Uuid,
    pub username: String,
    pub role: UserRole,
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse, OtpServiceError> {
    let usecase = RegisterUserUseCase {
        users: state.users.clone(),
    };
    let user = usecase
        .execute(RegisterUserInput {
            username: body.username,
            password: body.password,
            role: body.role,
            email: body.email,
            phone: body.phone,
            chat_id: body.chat_id,
        })
        .await?;

    let response = RegisterResponse {
        id: user.id,
        username: user.username,
        role: user.role,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

// ── POST /auth/login ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, OtpServiceError> {
    let usecase = LoginUseCase {
        users: state.users.clone(),
        jwt_secret: state.jwt_secret.clone(),
        token_ttl_secs: state.token_ttl_secs,
    };
    let token = usecase
        .execute(LoginInput {
            username: body.username,
            password: body.password,
        })
        .await?;
    Ok(Json(LoginResponse { token }))
}
