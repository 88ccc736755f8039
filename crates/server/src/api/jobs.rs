//! Consumer status and dead-letter inspection endpoints.

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use pressroom_core::queue::DeadLetter;
use pressroom_core::ConsumerStatus;

use crate::state::AppState;

/// GET /api/v1/jobs/status
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<ConsumerStatus> {
    Json(state.consumer().status().await)
}

#[derive(Debug, Serialize)]
pub struct DeadLettersResponse {
    pub dead_letters: Vec<DeadLetter>,
}

/// GET /api/v1/dead-letters
pub async fn list_dead_letters(State(state): State<Arc<AppState>>) -> Json<DeadLettersResponse> {
    Json(DeadLettersResponse {
        dead_letters: state.queue().dead_letters().await,
    })
}
