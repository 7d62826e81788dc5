use std::{collections::BTreeSet, sync::Arc};

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    db::CatalogStore,
    error::AppResult,
    models::{Movie, MovieFilter, MoviePage, Review},
};

/// Catalog held in process memory
///
/// Used when no database is configured and as the fake store in tests.
#[derive(Clone, Default)]
pub struct InMemoryCatalogStore {
    inner: Arc<RwLock<CatalogInner>>,
}

#[derive(Default)]
struct CatalogInner {
    /// Insertion order doubles as catalog order
    movies: Vec<Movie>,
    reviews: Vec<Review>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with movies and reviews
    pub fn with_data(movies: Vec<Movie>, reviews: Vec<Review>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(CatalogInner { movies, reviews })),
        }
    }
}

#[async_trait::async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn find_all_movies(&self) -> AppResult<Vec<Movie>> {
        Ok(self.inner.read().await.movies.clone())
    }

    async fn list_movies(&self, filter: &MovieFilter) -> AppResult<MoviePage> {
        let inner = self.inner.read().await;

        let mut matching: Vec<&Movie> = inner.movies.iter().filter(|m| filter.matches(m)).collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as u64;
        let movies = matching
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .cloned()
            .collect();

        Ok(MoviePage { movies, total })
    }

    async fn find_movie(&self, id: Uuid) -> AppResult<Option<Movie>> {
        let inner = self.inner.read().await;
        Ok(inner.movies.iter().find(|m| m.id == id).cloned())
    }

    async fn insert_movie(&self, movie: &Movie) -> AppResult<()> {
        self.inner.write().await.movies.push(movie.clone());
        Ok(())
    }

    async fn update_movie(&self, movie: &Movie) -> AppResult<Option<Movie>> {
        let mut inner = self.inner.write().await;
        let Some(stored) = inner.movies.iter_mut().find(|m| m.id == movie.id) else {
            return Ok(None);
        };

        let rating = stored.rating;
        *stored = movie.clone();
        stored.rating = rating;

        Ok(Some(stored.clone()))
    }

    async fn delete_movie(&self, id: Uuid) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.movies.len();
        inner.movies.retain(|m| m.id != id);
        Ok(inner.movies.len() != before)
    }

    async fn set_movie_rating(&self, id: Uuid, rating: f64) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        if let Some(movie) = inner.movies.iter_mut().find(|m| m.id == id) {
            movie.rating = rating;
        }
        Ok(())
    }

    async fn list_genres(&self) -> AppResult<Vec<String>> {
        let inner = self.inner.read().await;
        let genres: BTreeSet<String> = inner
            .movies
            .iter()
            .flat_map(|m| m.genre.iter().cloned())
            .collect();
        Ok(genres.into_iter().collect())
    }

    async fn insert_review(&self, review: &Review) -> AppResult<()> {
        self.inner.write().await.reviews.push(review.clone());
        Ok(())
    }

    async fn find_reviews_by_movie(&self, movie_id: Uuid) -> AppResult<Vec<Review>> {
        let inner = self.inner.read().await;
        Ok(inner
            .reviews
            .iter()
            .filter(|r| r.movie_id == movie_id)
            .cloned()
            .collect())
    }

    async fn find_reviews_by_user(&self, user_id: Uuid) -> AppResult<Vec<Review>> {
        let inner = self.inner.read().await;
        Ok(inner
            .reviews
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CreateMovieRequest;
    use chrono::Duration;

    fn movie(title: &str, genre: &[&str], age_days: i64) -> Movie {
        let mut movie = Movie::new(
            CreateMovieRequest {
                title: title.to_string(),
                description: String::new(),
                genre: genre.iter().map(|g| g.to_string()).collect(),
                year: 2000,
                duration: 100,
                poster_url: String::new(),
                video_url: String::new(),
                director: String::new(),
                cast: vec![],
            },
            Uuid::new_v4(),
        );
        movie.created_at -= Duration::days(age_days);
        movie
    }

    #[tokio::test]
    async fn test_list_movies_newest_first_with_window() {
        let store = InMemoryCatalogStore::with_data(
            vec![
                movie("Old", &["Drama"], 30),
                movie("New", &["Drama"], 1),
                movie("Middle", &["Drama"], 10),
            ],
            vec![],
        );

        let page = store
            .list_movies(&MovieFilter {
                offset: 1,
                limit: 1,
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(page.total, 3);
        assert_eq!(page.movies.len(), 1);
        assert_eq!(page.movies[0].title, "Middle");
    }

    #[tokio::test]
    async fn test_update_movie_preserves_rating() {
        let original = movie("Heat", &["Crime"], 0);
        let store = InMemoryCatalogStore::with_data(vec![original.clone()], vec![]);
        store.set_movie_rating(original.id, 4.0).await.unwrap();

        let mut edited = original.clone();
        edited.title = "Heat (1995)".to_string();
        edited.rating = 1.0;

        let stored = store.update_movie(&edited).await.unwrap().unwrap();
        assert_eq!(stored.title, "Heat (1995)");
        assert_eq!(stored.rating, 4.0);
    }

    #[tokio::test]
    async fn test_list_genres_distinct_sorted() {
        let store = InMemoryCatalogStore::with_data(
            vec![
                movie("A", &["Drama", "Action"], 0),
                movie("B", &["Action", "Comedy"], 0),
            ],
            vec![],
        );

        let genres = store.list_genres().await.unwrap();
        assert_eq!(genres, vec!["Action", "Comedy", "Drama"]);
    }

    #[tokio::test]
    async fn test_delete_movie_reports_absence() {
        let existing = movie("A", &[], 0);
        let store = InMemoryCatalogStore::with_data(vec![existing.clone()], vec![]);

        assert!(store.delete_movie(existing.id).await.unwrap());
        assert!(!store.delete_movie(existing.id).await.unwrap());
    }
}
