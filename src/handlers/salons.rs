use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Deserialize;

use super::require_session;
use crate::errors::AppError;
use crate::models::{NewSalon, NewService, Salon, Service};
use crate::state::AppState;

// GET /api/salons
#[derive(Deserialize)]
pub struct SalonQuery {
    pub q: Option<String>,
}

pub async fn list_salons(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SalonQuery>,
) -> Result<Json<Vec<Salon>>, AppError> {
    let salons = state.catalog.list_salons(query.q.as_deref()).await?;
    Ok(Json(salons))
}

// GET /api/salons/:id
pub async fn get_salon(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Salon>, AppError> {
    state
        .catalog
        .get_salon(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("salon not found: {id}")))
}

// POST /api/salons
pub async fn create_salon(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<NewSalon>,
) -> Result<(StatusCode, Json<Salon>), AppError> {
    let session = require_session(&headers, &state)?;
    body.validate()
        .map_err(|(field, message)| AppError::validation(field, message))?;

    let salon = state.catalog.create_salon(&session.user_id, body).await?;
    Ok((StatusCode::CREATED, Json(salon)))
}

// POST /api/salons/:id/services
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddServicesBody {
    pub services: Vec<NewService>,
}

pub async fn add_services(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<AddServicesBody>,
) -> Result<(StatusCode, Json<Vec<Service>>), AppError> {
    let session = require_session(&headers, &state)?;

    if body.services.is_empty() {
        return Err(AppError::validation("services", "at least one service is required"));
    }
    for service in &body.services {
        service
            .validate()
            .map_err(|(field, message)| AppError::validation(field, message))?;
    }

    let salon = state
        .catalog
        .get_salon(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("salon not found: {id}")))?;

    if salon.owner_id.as_deref() != Some(session.user_id.as_str()) {
        tracing::warn!(salon_id = %id, user_id = %session.user_id, "non-owner tried to add services");
        return Err(AppError::Forbidden("only the salon owner can add services".to_string()));
    }

    let services = state.catalog.create_services(&salon.id, body.services).await?;
    Ok((StatusCode::CREATED, Json(services)))
}
