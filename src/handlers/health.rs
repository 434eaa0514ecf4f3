use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use crate::db;
use crate::errors::AppError;
use crate::state::AppState;

pub async fn health(State(state): State<Arc<AppState>>) -> Result<Json<serde_json::Value>, AppError> {
    db::run(&state.db, state.config.collaborator_timeout(), |conn| {
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    })
    .await?;

    Ok(Json(serde_json::json!({"status": "ok"})))
}
