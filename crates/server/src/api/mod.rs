pub mod guides;
pub mod health;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use guides_editor::EditorServices;

use crate::auth::{SessionLayer, SessionManager};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Record store, object store and workflow limits.
    pub services: EditorServices,
    /// Session token validation.
    pub sessions: Arc<SessionManager>,
    /// Largest accepted request body, in bytes.
    pub max_body_bytes: usize,
}

/// Build the Axum router with all routes and middleware.
pub fn router(state: AppState) -> Router {
    let public = Router::new().route("/health", get(health::health));

    let protected = Router::new()
        .route(
            "/guides/{id}/edit",
            get(guides::edit_page).post(guides::update_guide),
        )
        .layer(DefaultBodyLimit::max(state.max_body_bytes))
        .layer(SessionLayer::new(Arc::clone(&state.sessions)));

    Router::new()
        .merge(public)
        .merge(protected)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
