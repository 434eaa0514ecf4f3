use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::User;
use crate::state::AppState;

// POST /api/auth/request-code
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestCodeBody {
    pub phone_number: String,
}

#[derive(Serialize)]
pub struct RequestCodeResponse {
    challenge: String,
}

pub async fn request_code(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RequestCodeBody>,
) -> Result<Json<RequestCodeResponse>, AppError> {
    let challenge = state.identity.request_code(&body.phone_number).await?;
    Ok(Json(RequestCodeResponse { challenge }))
}

// POST /api/auth/verify
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VerifyBody {
    pub challenge: String,
    pub code: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

#[derive(Serialize)]
pub struct VerifyResponse {
    token: String,
    user: User,
}

pub async fn verify(
    State(state): State<Arc<AppState>>,
    Json(body): Json<VerifyBody>,
) -> Result<Json<VerifyResponse>, AppError> {
    let user = state
        .identity
        .verify_code(&body.challenge, &body.code, body.full_name)
        .await?;
    let token = state.sessions.issue(&user.id);

    Ok(Json(VerifyResponse { token, user }))
}
