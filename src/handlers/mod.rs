pub mod auth;
pub mod bookings;
pub mod health;
pub mod salons;

use std::sync::Arc;

use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::errors::AppError;
use crate::services::session::{Session, SessionError};
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/auth/request-code", post(auth::request_code))
        .route("/api/auth/verify", post(auth::verify))
        .route(
            "/api/salons",
            get(salons::list_salons).post(salons::create_salon),
        )
        .route("/api/salons/:id", get(salons::get_salon))
        .route("/api/salons/:id/services", post(salons::add_services))
        .route(
            "/api/bookings",
            get(bookings::list_bookings).post(bookings::create_booking),
        )
        .route("/api/bookings/events", get(bookings::events_stream))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Resolves the caller's session from `Authorization: Bearer <token>`.
pub fn require_session(headers: &HeaderMap, state: &AppState) -> Result<Session, AppError> {
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or(SessionError::Missing)?;

    Ok(state.sessions.verify(token)?)
}
