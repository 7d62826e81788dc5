use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    error::AppResult,
    middleware::{AdminUser, CurrentUser},
    models::{CreateMovieRequest, CreateReviewRequest, Movie, Review, UpdateMovieRequest},
    routes::AppState,
    services::MovieQuery,
};

#[derive(Debug, Deserialize)]
pub struct ListMoviesQuery {
    page: Option<u32>,
    limit: Option<u32>,
    search: Option<String>,
    genre: Option<String>,
    year: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
}

#[derive(Debug, Serialize)]
pub struct MovieListResponse {
    pub movies: Vec<Movie>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub struct MovieDetailResponse {
    pub movie: Movie,
    pub reviews: Vec<Review>,
}

/// Handler for paginated catalog browsing
pub async fn list_movies(
    State(state): State<AppState>,
    Query(params): Query<ListMoviesQuery>,
) -> AppResult<Json<MovieListResponse>> {
    let (page, limit, filter) = MovieQuery {
        page: params.page,
        limit: params.limit,
        search: params.search,
        genre: params.genre,
        year: params.year,
    }
    .resolve();

    let result = state.catalog.list_movies(&filter).await?;

    Ok(Json(MovieListResponse {
        movies: result.movies,
        pagination: Pagination {
            page,
            limit,
            total: result.total,
        },
    }))
}

pub async fn list_genres(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let genres = state.catalog.list_genres().await?;
    Ok(Json(json!({ "genres": genres })))
}

pub async fn get_movie(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<MovieDetailResponse>> {
    let (movie, reviews) = state.catalog.get_movie_with_reviews(id).await?;
    Ok(Json(MovieDetailResponse { movie, reviews }))
}

pub async fn create_movie(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(request): Json<CreateMovieRequest>,
) -> AppResult<(StatusCode, Json<Movie>)> {
    let movie = state.catalog.create_movie(request, admin.id).await?;
    Ok((StatusCode::CREATED, Json(movie)))
}

pub async fn update_movie(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateMovieRequest>,
) -> AppResult<Json<Movie>> {
    let movie = state.catalog.update_movie(id, request).await?;
    Ok(Json(movie))
}

pub async fn delete_movie(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    state.catalog.delete_movie(id).await?;
    Ok(Json(json!({ "message": "Movie deleted successfully" })))
}

/// Handler for review submission; recomputes the movie's average rating
pub async fn add_review(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(movie_id): Path<Uuid>,
    Json(request): Json<CreateReviewRequest>,
) -> AppResult<(StatusCode, Json<Review>)> {
    let review = state.catalog.add_review(movie_id, user.id, request).await?;
    Ok((StatusCode::CREATED, Json(review)))
}
