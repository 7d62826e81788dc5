use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    error::AppResult,
    middleware::{AdminUser, CurrentUser, RequestId},
    models::Movie,
    routes::AppState,
};

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub recommendations: Vec<Movie>,
}

/// Handler for personalized recommendations
///
/// Model failures are absorbed by the heuristic fallback; only catalog
/// errors turn into an error response.
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    user: CurrentUser,
) -> AppResult<Json<RecommendationResponse>> {
    tracing::info!(
        request_id = %request_id,
        user_id = %user.id,
        "Processing recommendation request"
    );

    let recommendations = state.recommendations.get_recommendations(user.id).await?;

    Ok(Json(RecommendationResponse { recommendations }))
}

/// Handler for model-written movie descriptions (admin only)
pub async fn generate_description(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(movie_id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    let description = state.recommendations.generate_description(movie_id).await?;
    Ok(Json(json!({ "description": description })))
}
