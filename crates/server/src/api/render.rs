//! Render submission endpoint.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

use pressroom_core::template::TemplateError;
use pressroom_core::SubmitError;

use super::middleware::AuthUser;
use crate::state::AppState;

/// Header carrying the one-time submission ticket.
const TICKET_HEADER: &str = "x-pdf-ticket";

/// Body field carrying the ticket when the header is absent.
const TICKET_FIELD: &str = "ticket";

#[derive(Debug, Serialize)]
pub struct RenderAccepted {
    pub status: String,
    pub job_id: String,
    pub deduped: bool,
}

#[derive(Debug, Serialize)]
pub struct RenderErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<RenderErrorResponse>) {
    (
        status,
        Json(RenderErrorResponse {
            error: message.into(),
        }),
    )
}

/// POST /api/v1/render/{template}
///
/// Render parameters merge the query string and the JSON body; a body value
/// wins on conflict. The ticket travels in the `X-Pdf-Ticket` header or a
/// `ticket` body field and is burned whether or not submission succeeds.
pub async fn submit_render(
    State(state): State<Arc<AppState>>,
    Path(template): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    AuthUser(user_id): AuthUser,
    headers: HeaderMap,
    body: Option<Json<Value>>,
) -> Result<(StatusCode, Json<RenderAccepted>), (StatusCode, Json<RenderErrorResponse>)> {
    let body = body.map(|Json(v)| v).unwrap_or(Value::Null);

    let ticket = extract_ticket(&headers, &body).ok_or_else(|| {
        error_response(StatusCode::GONE, "Missing or unusable submission ticket")
    })?;

    if let Err(e) = state.ticket_validator().validate(&ticket, &user_id) {
        warn!(template = %template, "Rejected render submission: {}", e);
        return Err(error_response(StatusCode::GONE, e.to_string()));
    }

    let params = merge_params(query, &body);

    match state.submitter().submit(&template, &params, &user_id).await {
        Ok(outcome) => Ok((
            StatusCode::ACCEPTED,
            Json(RenderAccepted {
                status: "queued".to_string(),
                job_id: outcome.job_id,
                deduped: outcome.deduped,
            }),
        )),
        Err(SubmitError::Template(TemplateError::UnknownTemplate(name))) => Err(error_response(
            StatusCode::NOT_FOUND,
            format!("Unknown template: {}", name),
        )),
        Err(SubmitError::Template(e @ TemplateError::MissingParameters(_))) => {
            Err(error_response(StatusCode::BAD_REQUEST, e.to_string()))
        }
        Err(e) => {
            warn!(template = %template, "Render submission failed: {}", e);
            Err(error_response(StatusCode::BAD_GATEWAY, e.to_string()))
        }
    }
}

fn extract_ticket(headers: &HeaderMap, body: &Value) -> Option<String> {
    if let Some(value) = headers.get(TICKET_HEADER) {
        if let Ok(ticket) = value.to_str() {
            return Some(ticket.to_string());
        }
    }
    body.get(TICKET_FIELD)
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Merge query-string and JSON-body parameters into one string map.
///
/// Scalar body values are stringified; the ticket field and non-scalar
/// values are ignored.
fn merge_params(query: HashMap<String, String>, body: &Value) -> HashMap<String, String> {
    let mut params = query;
    if let Value::Object(map) = body {
        for (key, value) in map {
            if key == TICKET_FIELD {
                continue;
            }
            let rendered = match value {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(b) => Some(b.to_string()),
                _ => None,
            };
            if let Some(rendered) = rendered {
                params.insert(key.clone(), rendered);
            }
        }
    }
    params
}
