use axum::{
    Router,
    routing::{delete, get, post, put},
};
use tower_http::trace::TraceLayer;

use passgate_core::health::{healthz, readyz};
use passgate_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    admin::{delete_user, get_config, list_users, update_config},
    auth::{login, register},
    otp::{generate_otp, validate_otp},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Credentials
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        // OTP lifecycle
        .route("/otp/generate", post(generate_otp))
        .route("/otp/validate", post(validate_otp))
        // Admin
        .route("/admin/config", get(get_config))
        .route("/admin/config", put(update_config))
        .route("/admin/users", get(list_users))
        .route("/admin/users/{id}", delete(delete_user))
        // Set outermost so the id is present for the trace span; propagate
        // innermost so responses echo it back.
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
