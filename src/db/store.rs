use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Movie, MovieFilter, MoviePage, Review},
};

/// Storage abstraction for movies and reviews
///
/// Handlers and services receive the store as an injected `Arc<dyn CatalogStore>`
/// so tests can swap Postgres for the in-memory implementation. Individual
/// operations are atomic; nothing spans more than one call.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    /// Every movie in catalog order (oldest first)
    async fn find_all_movies(&self) -> AppResult<Vec<Movie>>;

    /// One page of movies matching the filter, newest first
    async fn list_movies(&self, filter: &MovieFilter) -> AppResult<MoviePage>;

    async fn find_movie(&self, id: Uuid) -> AppResult<Option<Movie>>;

    async fn insert_movie(&self, movie: &Movie) -> AppResult<()>;

    /// Persists the editable fields of `movie`, leaving the stored rating alone
    ///
    /// Returns the stored movie after the update, or `None` if it does not exist.
    async fn update_movie(&self, movie: &Movie) -> AppResult<Option<Movie>>;

    /// Returns whether a movie was removed
    async fn delete_movie(&self, id: Uuid) -> AppResult<bool>;

    /// Overwrites the stored average rating
    async fn set_movie_rating(&self, id: Uuid, rating: f64) -> AppResult<()>;

    /// Distinct genre tags across the catalog, sorted
    async fn list_genres(&self) -> AppResult<Vec<String>>;

    async fn insert_review(&self, review: &Review) -> AppResult<()>;

    async fn find_reviews_by_movie(&self, movie_id: Uuid) -> AppResult<Vec<Review>>;

    async fn find_reviews_by_user(&self, user_id: Uuid) -> AppResult<Vec<Review>>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}
