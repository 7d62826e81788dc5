use std::path::PathBuf;

use axum::{
    body::Body,
    extract::{Path, Request, State},
    response::Response,
    Json,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use tower_http::services::ServeFile;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    middleware::CurrentUser,
    models::Movie,
    routes::AppState,
};

/// Location of a movie's video: its stored path, else `<video_dir>/<id>.mp4`
pub fn video_path(movie: &Movie, video_dir: &std::path::Path) -> PathBuf {
    if movie.video_url.is_empty() {
        video_dir.join(format!("{}.mp4", movie.id))
    } else {
        PathBuf::from(&movie.video_url)
    }
}

/// Streams the video file, honouring `Range` requests for seeking
pub async fn stream_video(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(movie_id): Path<Uuid>,
    request: Request,
) -> AppResult<Response> {
    let movie = state.catalog.get_movie(movie_id).await?;
    let path = video_path(&movie, &state.video_dir);

    if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
        tracing::warn!(movie_id = %movie_id, path = %path.display(), "Video file missing");
        return Err(AppError::NotFound("Video file not found".to_string()));
    }

    let response = ServeFile::new(&path)
        .oneshot(request)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to serve video: {}", e)))?;

    Ok(response.map(Body::new))
}

pub async fn video_url(_user: CurrentUser, Path(movie_id): Path<Uuid>) -> Json<Value> {
    Json(json!({ "videoUrl": format!("/api/stream/{}", movie_id) }))
}
