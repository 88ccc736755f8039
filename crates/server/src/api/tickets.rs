//! Submission ticket endpoint.

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use tracing::error;

use pressroom_core::IssuedTicket;

use super::middleware::AuthUser;
use crate::state::AppState;

/// POST /api/v1/tickets
///
/// Issues a single-use render ticket bound to the caller's identity.
pub async fn create_ticket(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<IssuedTicket>, StatusCode> {
    match state.ticket_issuer().issue(&user_id) {
        Ok(issued) => Ok(Json(issued)),
        Err(e) => {
            error!("Failed to issue ticket: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
