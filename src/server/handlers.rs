use super::types::{ErrorResponse, HealthResponse, ListTasksQuery, ReloadResponse};
use crate::{ledger::TaskRecord, pipeline::PredictionService};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{error, info};

pub const TASK_ID_HEADER: &str = "x-task-id";

const DEFAULT_TASK_LIMIT: usize = 50;
const MAX_TASK_LIMIT: usize = 500;

type ApiError = (StatusCode, Json<ErrorResponse>);

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PredictionService>,
}

/// Model and data problems come back as a `NOK` status with HTTP 200.
pub async fn predict(
    State(state): State<AppState>,
    Json(request): Json<Map<String, Value>>,
) -> impl IntoResponse {
    info!("Received prediction request with {} fields", request.len());

    let outcome = state.service.predict_task(&request).await;
    (
        [(TASK_ID_HEADER, outcome.task_id)],
        Json(outcome.envelope),
    )
}

pub async fn get_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<TaskRecord>, ApiError> {
    match state.service.ledger().get(&task_id).await {
        Ok(Some(record)) => Ok(Json(record)),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Task not found: {task_id}"),
            }),
        )),
        Err(e) => {
            error!("Failed to read task {}: {}", task_id, e);
            Err(internal_error(e))
        }
    }
}

pub async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<ListTasksQuery>,
) -> Result<Json<Vec<TaskRecord>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_TASK_LIMIT).min(MAX_TASK_LIMIT);

    state
        .service
        .ledger()
        .list_recent(limit)
        .await
        .map(Json)
        .map_err(|e| {
            error!("Failed to list tasks: {}", e);
            internal_error(e)
        })
}

pub async fn reload_reference(
    State(state): State<AppState>,
) -> Result<Json<ReloadResponse>, ApiError> {
    let service = Arc::clone(&state.service);
    let reloaded = tokio::task::spawn_blocking(move || service.reload_reference())
        .await
        .map_err(|e| internal_error(format!("reload task failed: {e}")))?;

    match reloaded {
        Ok(columns) => Ok(Json(ReloadResponse { columns })),
        Err(e) => {
            error!("Failed to reload reference schema: {}", e);
            Err(internal_error(e))
        }
    }
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

fn internal_error(e: impl std::fmt::Display) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: format!("Processing error: {e}"),
        }),
    )
}
