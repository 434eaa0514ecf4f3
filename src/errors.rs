use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::db::StoreError;
use crate::models::Slot;
use crate::services::identity::IdentityError;
use crate::services::ledger::LedgerError;
use crate::services::session::SessionError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("slot already booked: {slot}")]
    Conflict { slot: Slot },

    #[error("temporarily unavailable: {0}")]
    Transient(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("verification failed")]
    VerificationFailed,

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "not_found",
            AppError::Validation { .. } => "validation",
            AppError::Conflict { .. } => "conflict",
            AppError::Transient(_) => "transient",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::Forbidden(_) => "forbidden",
            AppError::VerificationFailed => "verification_failed",
            AppError::Internal(_) => "internal",
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::NotFound { entity, id } => AppError::NotFound(format!("{entity} not found: {id}")),
            LedgerError::Validation { field, message } => AppError::Validation {
                field: field.to_string(),
                message,
            },
            LedgerError::Conflict { slot } => AppError::Conflict { slot },
            LedgerError::Transient(msg) => AppError::Transient(msg),
        }
    }
}

impl From<IdentityError> for AppError {
    fn from(e: IdentityError) -> Self {
        match e {
            IdentityError::InvalidPhone(_) => AppError::validation("phone_number", e.to_string()),
            IdentityError::VerificationFailed => AppError::VerificationFailed,
            IdentityError::Transient(msg) => AppError::Transient(msg),
        }
    }
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        AppError::Unauthorized(e.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::TimedOut(_) | StoreError::Busy => AppError::Transient(e.to_string()),
            StoreError::Failed(err) => {
                tracing::error!(error = %err, "storage failure");
                AppError::Internal("storage failure".to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Transient(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::VerificationFailed => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let mut body = serde_json::json!({ "error": self.to_string(), "kind": self.kind() });
        match &self {
            AppError::Validation { field, .. } => body["field"] = serde_json::json!(field),
            AppError::Conflict { slot } => body["slot"] = serde_json::json!(slot),
            _ => {}
        }
        (status, axum::Json(body)).into_response()
    }
}
