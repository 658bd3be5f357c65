use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;
use serde_json::json;
use tokio::task::spawn_blocking;
use tracing::{error, warn};

use crate::{
    contact::{ContactForm, submit},
    error::AppError,
    health::{Health, check_health},
    state::AppState,
};

#[derive(Serialize)]
pub struct MessageResponse {
    message: &'static str,
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
}

pub async fn contact_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ContactForm>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Json(form) = payload.map_err(|rejection| {
        warn!("Rejected contact payload: {rejection}");
        AppError::MalformedPayload
    })?;

    let outcome = spawn_blocking(move || submit(&state.store, state.notifier.as_ref(), form))
        .await
        .map_err(|e| {
            error!("Contact endpoint error: {e}");
            AppError::Internal
        })??;

    Ok(Json(MessageResponse {
        message: outcome.message(),
    }))
}

pub async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = spawn_blocking(move || check_health(&state.store))
        .await
        .unwrap_or_else(|e| {
            error!("Health check task failed: {e}");
            Health::Unhealthy
        });

    (
        health.status(),
        Json(HealthResponse {
            status: health.label(),
        }),
    )
}

pub async fn static_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "File not found" })),
    )
}
