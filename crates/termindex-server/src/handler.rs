//! HTTP request handlers.

use crate::server::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use termindex_core::{FlushSummary, RowFilter, TermIndexError, TermIndexRow};
use tracing::{debug, error};

/// Error body returned by every failing handler.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Handler error carrying an HTTP status.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<TermIndexError> for ApiError {
    fn from(err: TermIndexError) -> Self {
        Self {
            status: StatusCode::from_u16(err.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            message: err.to_string(),
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("Task failed: {}", err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("Request failed ({}): {}", self.status, self.message);
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

/// Health check endpoint.
pub async fn handle_health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

/// Flush pending content changes to the index.
pub async fn handle_home(State(state): State<Arc<AppState>>) -> Result<&'static str, ApiError> {
    let summary = flush(state).await?;
    debug!(
        "Flushed {} items from /home ({} rows inserted)",
        summary.items, summary.rows_inserted
    );
    Ok("ok")
}

async fn flush(state: Arc<AppState>) -> Result<FlushSummary, ApiError> {
    let summary = tokio::task::spawn_blocking(move || state.app.flush()).await??;
    Ok(summary)
}

#[derive(Debug, Deserialize)]
pub struct TermItemsQuery {
    /// Only published rows when true (default); every row when false.
    pub published: Option<bool>,
}

/// Rows of the term index that reference `term_id`.
pub async fn handle_term_items(
    State(state): State<Arc<AppState>>,
    Path(term_id): Path<String>,
    Query(query): Query<TermItemsQuery>,
) -> Result<Json<Vec<TermIndexRow>>, ApiError> {
    let filter = if query.published.unwrap_or(true) {
        RowFilter::published()
    } else {
        RowFilter::any()
    };

    let rows = tokio::task::spawn_blocking(move || state.app.items_for_term(&term_id, filter))
        .await??;
    Ok(Json(rows))
}
