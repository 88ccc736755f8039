use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{artifacts, handlers, jobs, middleware as mw, render, tickets};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Tickets
        .route("/tickets", post(tickets::create_ticket))
        // Render submission
        .route("/render/{template}", post(render::submit_render))
        // Artifacts
        .route("/artifacts/{id}", get(artifacts::download_artifact))
        // Consumer / queue inspection
        .route("/jobs/status", get(jobs::get_status))
        .route("/dead-letters", get(jobs::list_dead_letters))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            mw::auth_middleware,
        ))
        .with_state(state.clone());

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics).with_state(state))
        .layer(middleware::from_fn(mw::metrics_middleware))
        .layer(TraceLayer::new_for_http())
}
