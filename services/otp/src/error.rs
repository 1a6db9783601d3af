use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// OTP service domain error variants.
///
/// Every credential/token failure collapses into [`Authentication`] so the
/// response carries no username-enumeration signal.
///
/// [`Authentication`]: OtpServiceError::Authentication
#[derive(Debug, thiserror::Error)]
pub enum OtpServiceError {
    #[error("invalid {field}: {reason}")]
    Validation {
        field: &'static str,
        reason: &'static str,
    },
    #[error("not authenticated")]
    Authentication,
    #[error("access denied")]
    Authorization,
    #[error("not found")]
    NotFound,
    #[error("{0}")]
    Conflict(&'static str),
    #[error("storage error")]
    Storage(#[from] anyhow::Error),
    #[error("delivery failed")]
    Delivery(#[source] anyhow::Error),
}

impl OtpServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION",
            Self::Authentication => "AUTHENTICATION",
            Self::Authorization => "AUTHORIZATION",
            Self::NotFound => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::Storage(_) => "STORAGE",
            Self::Delivery(_) => "DELIVERY",
        }
    }
}

impl IntoResponse for OtpServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Authentication => StatusCode::UNAUTHORIZED,
            Self::Authorization => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Delivery(_) => StatusCode::BAD_GATEWAY,
        };
        // Log 5xx only — tower-http TraceLayer already records method/uri/status for all
        // requests. 4xx are expected client errors; logging them here would be noise.
        // Storage/delivery errors need the source chain logged so the root cause is
        // traceable.
        match &self {
            Self::Storage(e) => {
                tracing::error!(error = %e, kind = "STORAGE", "storage error");
            }
            Self::Delivery(e) => {
                tracing::error!(error = %e, kind = "DELIVERY", "delivery failed");
            }
            _ => {}
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
