//! Artifact download endpoint.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::error;

use pressroom_core::GateError;

use super::middleware::AuthUser;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ArtifactErrorResponse {
    pub error: String,
}

/// GET /api/v1/artifacts/{id}
///
/// Streams the PDF exactly once to its owner. The gate's check order maps
/// directly onto status codes: 404 unknown, 403 foreign, 410 spent.
pub async fn download_artifact(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
    AuthUser(user_id): AuthUser,
) -> Response {
    match state.gate().release(&job_id, &user_id).await {
        Ok(artifact) => {
            let disposition = format!("attachment; filename=\"{}\"", artifact.file_name);
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "application/pdf".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                artifact.bytes,
            )
                .into_response()
        }
        Err(e) => {
            let status = match &e {
                GateError::NotFound(_) => StatusCode::NOT_FOUND,
                GateError::Forbidden => StatusCode::FORBIDDEN,
                GateError::Gone => StatusCode::GONE,
                GateError::Storage(reason) => {
                    error!(job_id = %job_id, "Artifact release failed: {}", reason);
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
            (
                status,
                Json(ArtifactErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}
