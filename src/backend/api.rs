use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch},
};
use serde::Deserialize;
use tracing::{info, warn};

use super::store::BoardStore;
use crate::board::models::{
    CreateWorkflowStatus, MessageResponse, MoveCardRequest, ReorderCardsRequest,
    ReorderColumnsRequest, UpdateWorkflowStatus,
};
use crate::errors::BackendError;

// ── Shared application state ──────────────────────────────────────────

pub struct AppState {
    pub store: Mutex<BoardStore>,
}

impl AppState {
    pub fn new(store: BoardStore) -> Self {
        Self {
            store: Mutex::new(store),
        }
    }

    fn store(&self) -> Result<MutexGuard<'_, BoardStore>, ApiError> {
        self.store
            .lock()
            .map_err(|_| ApiError::Internal("Lock poisoned".into()))
    }
}

pub type SharedState = Arc<AppState>;

// ── Query parameters ──────────────────────────────────────────────────

/// Every board call carries the project it is scoped to. The development
/// backend keeps a single project, so the value is only logged.
#[derive(Debug, Deserialize)]
pub struct ProjectQuery {
    #[serde(rename = "projectId")]
    pub project_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct StatusListQuery {
    #[serde(rename = "workflowId")]
    pub workflow_id: i64,
}

// ── Error handling ────────────────────────────────────────────────────

pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    Internal(String),
}

impl From<BackendError> for ApiError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::NotFound(msg) => ApiError::NotFound(msg),
            BackendError::BadRequest(msg) => ApiError::BadRequest(msg),
            BackendError::Conflict(msg) => ApiError::Conflict(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        if status.is_server_error() {
            warn!(%status, %message, "request failed");
        }
        (status, Json(serde_json::json!({"message": message}))).into_response()
    }
}

// ── Router ────────────────────────────────────────────────────────────

pub fn api_router() -> Router<SharedState> {
    Router::new()
        .route("/api/boards/workflow/{workflow_id}", get(get_board))
        .route("/api/boards/{board_id}/columns/reorder", patch(reorder_columns))
        .route(
            "/api/boards/columns/{column_id}/cards/reorder",
            patch(reorder_cards),
        )
        .route("/api/boards/cards/{card_id}/move", patch(move_card))
        .route(
            "/api/workflow-statuses",
            get(list_statuses).post(create_status),
        )
        .route(
            "/api/workflow-statuses/{id}",
            get(get_status).patch(update_status).delete(delete_status),
        )
        .route("/health", get(health_check))
}

// ── Handlers ──────────────────────────────────────────────────────────

async fn health_check() -> &'static str {
    "ok"
}

async fn get_board(
    State(state): State<SharedState>,
    Path(workflow_id): Path<i64>,
    Query(query): Query<ProjectQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let board = state.store()?.board(workflow_id)?;
    info!(workflow_id, project_id = ?query.project_id, columns = board.ordered_column_ids.len(), "served board");
    Ok(Json(board))
}

async fn reorder_columns(
    State(state): State<SharedState>,
    Path(board_id): Path<i64>,
    Query(_query): Query<ProjectQuery>,
    Json(req): Json<ReorderColumnsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .store()?
        .reorder_columns(board_id, &req.ordered_column_ids)?;
    info!(board_id, order = ?req.ordered_column_ids, "reordered columns");
    Ok(Json(MessageResponse {
        message: "Columns reordered".into(),
    }))
}

async fn reorder_cards(
    State(state): State<SharedState>,
    Path(column_id): Path<i64>,
    Query(_query): Query<ProjectQuery>,
    Json(req): Json<ReorderCardsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .store()?
        .reorder_cards(column_id, &req.ordered_issue_ids)?;
    info!(column_id, order = ?req.ordered_issue_ids, "reordered cards");
    Ok(Json(MessageResponse {
        message: "Cards reordered".into(),
    }))
}

async fn move_card(
    State(state): State<SharedState>,
    Path(card_id): Path<i64>,
    Query(_query): Query<ProjectQuery>,
    Json(req): Json<MoveCardRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .store()?
        .move_card(card_id, req.target_status_id, req.target_index)?;
    info!(
        card_id,
        target_status_id = req.target_status_id,
        target_index = req.target_index,
        "moved card"
    );
    Ok(Json(MessageResponse {
        message: "Card moved".into(),
    }))
}

async fn list_statuses(
    State(state): State<SharedState>,
    Query(query): Query<StatusListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.store()?.list_statuses(query.workflow_id)))
}

async fn get_status(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.store()?.get_status(id)?))
}

async fn create_status(
    State(state): State<SharedState>,
    Json(req): Json<CreateWorkflowStatus>,
) -> Result<impl IntoResponse, ApiError> {
    let status = state.store()?.create_status(req)?;
    info!(id = status.id, name = %status.status_name, "created workflow status");
    Ok((StatusCode::CREATED, Json(status)))
}

async fn update_status(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateWorkflowStatus>,
) -> Result<impl IntoResponse, ApiError> {
    if req.is_empty() {
        return Err(ApiError::BadRequest("No fields to update".into()));
    }
    let status = state.store()?.update_status(id, req)?;
    info!(id, "updated workflow status");
    Ok(Json(status))
}

async fn delete_status(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.store()?.delete_status(id)?;
    info!(id, "deleted workflow status");
    Ok(Json(MessageResponse {
        message: format!("Workflow status {} deleted", id),
    }))
}
