use std::sync::Arc;

use uuid::Uuid;

use crate::{
    cached,
    db::{Cache, CacheKey, CatalogStore},
    error::{AppError, AppResult},
    models::{
        average_rating, CreateMovieRequest, CreateReviewRequest, Movie, MovieFilter, MoviePage,
        Review, UpdateMovieRequest,
    },
};

const GENRES_CACHE_TTL: u64 = 300; // 5 minutes

pub const DEFAULT_PAGE_SIZE: u32 = 12;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Catalog listing parameters as received from the client
#[derive(Debug, Clone, Default)]
pub struct MovieQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub genre: Option<String>,
    pub year: Option<i32>,
}

impl MovieQuery {
    /// Resolves the 1-based page into an offset window; blank filters are dropped
    pub fn resolve(self) -> (u32, u32, MovieFilter) {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        let non_blank = |s: Option<String>| s.filter(|v| !v.trim().is_empty());

        let filter = MovieFilter {
            search: non_blank(self.search),
            genre: non_blank(self.genre),
            year: self.year,
            offset: (page - 1).saturating_mul(limit),
            limit,
        };
        (page, limit, filter)
    }
}

/// Movie administration, browsing and review submission
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
    cache: Option<Cache>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>, cache: Option<Cache>) -> Self {
        Self { store, cache }
    }

    pub async fn list_movies(&self, filter: &MovieFilter) -> AppResult<MoviePage> {
        self.store.list_movies(filter).await
    }

    pub async fn get_movie(&self, id: Uuid) -> AppResult<Movie> {
        self.store
            .find_movie(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Movie not found".to_string()))
    }

    /// A movie together with every review of it
    pub async fn get_movie_with_reviews(&self, id: Uuid) -> AppResult<(Movie, Vec<Review>)> {
        let movie = self.get_movie(id).await?;
        let reviews = self.store.find_reviews_by_movie(id).await?;
        Ok((movie, reviews))
    }

    pub async fn list_genres(&self) -> AppResult<Vec<String>> {
        let Some(cache) = &self.cache else {
            return self.store.list_genres().await;
        };

        let store = self.store.clone();
        cached!(cache, CacheKey::Genres, GENRES_CACHE_TTL, async move {
            store.list_genres().await
        })
    }

    pub async fn create_movie(
        &self,
        request: CreateMovieRequest,
        created_by: Uuid,
    ) -> AppResult<Movie> {
        request.validate().map_err(AppError::InvalidInput)?;

        let movie = Movie::new(request, created_by);
        self.store.insert_movie(&movie).await?;
        self.invalidate_genres();

        tracing::info!(movie_id = %movie.id, title = %movie.title, "Movie created");
        Ok(movie)
    }

    pub async fn update_movie(&self, id: Uuid, update: UpdateMovieRequest) -> AppResult<Movie> {
        let mut movie = self.get_movie(id).await?;
        movie.apply_update(update);

        let stored = self
            .store
            .update_movie(&movie)
            .await?
            .ok_or_else(|| AppError::NotFound("Movie not found".to_string()))?;
        self.invalidate_genres();

        tracing::info!(movie_id = %id, "Movie updated");
        Ok(stored)
    }

    pub async fn delete_movie(&self, id: Uuid) -> AppResult<()> {
        if !self.store.delete_movie(id).await? {
            return Err(AppError::NotFound("Movie not found".to_string()));
        }
        self.invalidate_genres();

        tracing::info!(movie_id = %id, "Movie deleted");
        Ok(())
    }

    /// Stores a review and recomputes the movie's average rating
    ///
    /// The recomputation reads every review of the movie and then writes the
    /// mean without a lock, so concurrent submissions race and the last write
    /// wins. The stored average always matches some complete snapshot of the
    /// review set.
    pub async fn add_review(
        &self,
        movie_id: Uuid,
        user_id: Uuid,
        request: CreateReviewRequest,
    ) -> AppResult<Review> {
        request.validate().map_err(AppError::InvalidInput)?;
        self.get_movie(movie_id).await?;

        let review = Review::new(movie_id, user_id, request.rating, request.comment);
        self.store.insert_review(&review).await?;

        let rating = self.recompute_rating(movie_id).await?;

        tracing::info!(
            movie_id = %movie_id,
            user_id = %user_id,
            rating = review.rating,
            average = rating,
            "Review added"
        );
        Ok(review)
    }

    async fn recompute_rating(&self, movie_id: Uuid) -> AppResult<f64> {
        let reviews = self.store.find_reviews_by_movie(movie_id).await?;
        let rating = average_rating(&reviews);
        self.store.set_movie_rating(movie_id, rating).await?;
        Ok(rating)
    }

    fn invalidate_genres(&self) {
        if let Some(cache) = &self.cache {
            cache.invalidate_in_background(&CacheKey::Genres);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryCatalogStore;

    fn create_request(title: &str, genre: &[&str]) -> CreateMovieRequest {
        CreateMovieRequest {
            title: title.to_string(),
            description: String::new(),
            genre: genre.iter().map(|g| g.to_string()).collect(),
            year: 1995,
            duration: 170,
            poster_url: String::new(),
            video_url: String::new(),
            director: String::new(),
            cast: vec![],
        }
    }

    fn review_request(rating: i32) -> CreateReviewRequest {
        CreateReviewRequest {
            rating,
            comment: String::new(),
        }
    }

    fn service() -> CatalogService {
        CatalogService::new(Arc::new(InMemoryCatalogStore::new()), None)
    }

    #[test]
    fn test_query_defaults() {
        let (page, limit, filter) = MovieQuery::default().resolve();
        assert_eq!((page, limit), (1, DEFAULT_PAGE_SIZE));
        assert_eq!(filter.offset, 0);
    }

    #[test]
    fn test_query_window_and_blank_filters() {
        let (page, limit, filter) = MovieQuery {
            page: Some(3),
            limit: Some(500),
            search: Some("  ".to_string()),
            genre: Some("Drama".to_string()),
            year: None,
        }
        .resolve();

        assert_eq!(page, 3);
        assert_eq!(limit, MAX_PAGE_SIZE);
        assert_eq!(filter.offset, 200);
        assert_eq!(filter.search, None);
        assert_eq!(filter.genre.as_deref(), Some("Drama"));
    }

    #[tokio::test]
    async fn test_create_movie_requires_title() {
        let err = service()
            .create_movie(create_request(" ", &[]), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_reviews_accumulate_into_average() {
        let service = service();
        let user = Uuid::new_v4();
        let movie = service
            .create_movie(create_request("Heat", &["Crime"]), Uuid::new_v4())
            .await
            .unwrap();

        tokio_test::assert_ok!(service.add_review(movie.id, user, review_request(5)).await);
        tokio_test::assert_ok!(service.add_review(movie.id, user, review_request(2)).await);

        let (stored, reviews) = service.get_movie_with_reviews(movie.id).await.unwrap();
        assert_eq!(reviews.len(), 2);
        assert_eq!(stored.rating, 3.5);
    }

    #[tokio::test]
    async fn test_review_rejects_out_of_range_rating() {
        let service = service();
        let movie = service
            .create_movie(create_request("Heat", &["Crime"]), Uuid::new_v4())
            .await
            .unwrap();

        let err = service
            .add_review(movie.id, Uuid::new_v4(), review_request(6))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_review_of_unknown_movie() {
        let err = service()
            .add_review(Uuid::new_v4(), Uuid::new_v4(), review_request(4))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_never_touches_rating() {
        let service = service();
        let movie = service
            .create_movie(create_request("Heat", &["Crime"]), Uuid::new_v4())
            .await
            .unwrap();
        service
            .add_review(movie.id, Uuid::new_v4(), review_request(4))
            .await
            .unwrap();

        let updated = service
            .update_movie(
                movie.id,
                UpdateMovieRequest {
                    title: Some("Heat (1995)".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "Heat (1995)");
        assert_eq!(updated.rating, 4.0);
        assert!(updated.updated_at >= movie.updated_at);
    }

    #[tokio::test]
    async fn test_concurrent_reviews_settle_on_a_consistent_snapshot() {
        let service = service();
        let movie = service
            .create_movie(create_request("Heat", &["Crime"]), Uuid::new_v4())
            .await
            .unwrap();
        service
            .add_review(movie.id, Uuid::new_v4(), review_request(2))
            .await
            .unwrap();

        let (first, second) = tokio::join!(
            service.add_review(movie.id, Uuid::new_v4(), review_request(5)),
            service.add_review(movie.id, Uuid::new_v4(), review_request(4)),
        );
        first.unwrap();
        second.unwrap();

        let rating = service.get_movie(movie.id).await.unwrap().rating;
        // Either insert's recomputation may land last; each saw a complete set
        let candidates = [(2.0 + 5.0) / 2.0, (2.0 + 4.0) / 2.0, (2.0 + 5.0 + 4.0) / 3.0];
        assert!(
            candidates.contains(&rating),
            "rating {} is not the mean of any snapshot",
            rating
        );
    }

    #[tokio::test]
    async fn test_genres_without_cache() {
        let service = service();
        service
            .create_movie(create_request("Heat", &["Crime", "Drama"]), Uuid::new_v4())
            .await
            .unwrap();

        assert_eq!(service.list_genres().await.unwrap(), vec!["Crime", "Drama"]);
    }

    #[tokio::test]
    async fn test_delete_unknown_movie() {
        let err = service().delete_movie(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
