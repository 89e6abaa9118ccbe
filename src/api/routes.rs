use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{make_span_with_request_id, request_id_middleware};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id)),
        )
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        // Session
        .route("/session/start", post(handlers::start_session))
        // Recommendations
        .route("/recs/feed", get(handlers::get_feed))
        .route("/recs/interaction", post(handlers::record_interaction))
        .route("/onboarding/seed", post(handlers::seed_onboarding))
        .route("/watch/pulse", post(handlers::submit_watch_pulse))
        // Titles
        .route("/titles/search", get(handlers::search_titles))
        .route("/titles/:id", get(handlers::get_title))
        .route("/watchlist", get(handlers::get_watchlist))
        // Taste profile
        .route(
            "/profile/preferences",
            get(handlers::get_preferences).patch(handlers::patch_preferences),
        )
}
