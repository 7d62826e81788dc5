use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::middleware::{make_span_with_request_id, request_id_middleware};

pub mod movies;
pub mod recommendations;
pub mod state;
pub mod stream;

pub use state::AppState;

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes())
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state)
}

/// API routes under /api
fn api_routes() -> Router<AppState> {
    Router::new()
        // Catalog
        .route("/movies", get(movies::list_movies).post(movies::create_movie))
        .route("/movies/genres", get(movies::list_genres))
        .route(
            "/movies/:id",
            get(movies::get_movie)
                .put(movies::update_movie)
                .delete(movies::delete_movie),
        )
        .route("/movies/:id/reviews", post(movies::add_review))
        // Recommendations
        .route("/recommendations", get(recommendations::recommend))
        .route(
            "/ai/movies/:id/description",
            post(recommendations::generate_description),
        )
        // Streaming
        .route("/stream/:id", get(stream::stream_video))
        .route("/stream/:id/url", get(stream::video_url))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
