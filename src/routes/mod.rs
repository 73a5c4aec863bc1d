use axum::{
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{make_span_with_request_id, request_id_middleware};

pub mod feeds;
pub mod lists;
pub mod modal;
pub mod movies;
pub mod notifications;
pub mod recommendations;
pub mod session;
pub mod state;

pub use state::{AppState, StateTimings};

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        // Outermost first: the request id must exist before the trace span is built
        .layer(
            ServiceBuilder::new()
                .layer(CorsLayer::permissive())
                .layer(axum::middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id)),
        )
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Session
        .route("/session", get(session::current))
        .route("/session/login", post(session::login))
        .route("/session/logout", post(session::logout))
        .route("/session/profile", put(session::update_profile))
        // Catalog
        .route("/genres", get(movies::genres))
        .route("/movies/popular", get(movies::popular))
        .route("/movies/now-playing", get(movies::now_playing))
        .route("/movies/upcoming", get(movies::upcoming))
        .route("/movies/trending", get(movies::trending))
        .route("/movies/discover", get(movies::discover))
        .route("/movies/search", get(movies::search))
        .route("/movies/suggestions", get(movies::suggestions))
        .route("/movies/:id", get(movies::detail))
        .route("/movies/:id/similar", get(movies::similar))
        .route("/people/:id", get(movies::person))
        // Feeds
        .route("/feeds/home", get(feeds::home))
        .route("/feeds/trending", get(feeds::trending))
        // Lists
        .route("/lists/liked", get(lists::liked))
        .route("/lists/liked/toggle", post(lists::toggle_like))
        .route("/lists/watchlist", get(lists::watchlist))
        .route("/lists/watchlist/toggle", post(lists::toggle_watchlist))
        .route("/lists/rated", get(lists::rated).put(lists::rate))
        .route("/lists/status/:movie_id", get(lists::status))
        // Notifications & modal
        .route(
            "/notifications",
            get(notifications::list).post(notifications::add),
        )
        .route("/modal", get(modal::snapshot))
        .route("/modal/open", post(modal::open))
        .route("/modal/close", post(modal::close))
        // AI
        .route("/recommendations", post(recommendations::recommend))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
