use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::CatalogStore,
    error::{AppError, AppResult},
    models::Movie,
    services::{
        completion::CompletionClient, heuristic, model_recommender::ModelRecommender,
        preferences,
    },
};

/// Upper bound on the length of any recommendation list
pub const MAX_RECOMMENDATIONS: usize = 5;

/// Which path produced a recommendation list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecommendationSource {
    Model,
    Heuristic,
}

/// Generates personalized movie recommendations
///
/// Each call reads the user's full review history and a catalog snapshot,
/// asks the model first and substitutes the heuristic result if that fails.
/// Only store errors reach the caller.
#[derive(Clone)]
pub struct RecommendationService {
    store: Arc<dyn CatalogStore>,
    client: Arc<dyn CompletionClient>,
    model: ModelRecommender,
}

impl RecommendationService {
    pub fn new(store: Arc<dyn CatalogStore>, client: Arc<dyn CompletionClient>) -> Self {
        Self {
            store,
            model: ModelRecommender::new(client.clone()),
            client,
        }
    }

    pub async fn get_recommendations(&self, user_id: Uuid) -> AppResult<Vec<Movie>> {
        let (movies, _) = self.recommend_with_source(user_id).await?;
        Ok(movies)
    }

    /// Same as [`Self::get_recommendations`], also reporting which path answered
    pub async fn recommend_with_source(
        &self,
        user_id: Uuid,
    ) -> AppResult<(Vec<Movie>, RecommendationSource)> {
        let reviews = self.store.find_reviews_by_user(user_id).await?;
        let catalog = self.store.find_all_movies().await?;

        let profile = preferences::summarize(&reviews, &catalog);
        if !profile.has_history() {
            tracing::debug!(user_id = %user_id, "No viewing history, recommending from catalog only");
        }

        let result = match self.model.recommend(&profile.to_string(), &catalog).await {
            Ok(movies) => (movies, RecommendationSource::Model),
            Err(e) => {
                tracing::warn!(
                    user_id = %user_id,
                    error = %e,
                    "Model recommendation failed, falling back to genre heuristic"
                );
                (
                    heuristic::recommend(&reviews, &catalog),
                    RecommendationSource::Heuristic,
                )
            }
        };

        tracing::info!(
            user_id = %user_id,
            reviews = reviews.len(),
            catalog_size = catalog.len(),
            source = ?result.1,
            count = result.0.len(),
            "Recommendations generated"
        );

        Ok(result)
    }

    /// Asks the model for a short marketing blurb; there is no fallback
    pub async fn generate_description(&self, movie_id: Uuid) -> AppResult<String> {
        let movie = self
            .store
            .find_movie(movie_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Movie not found".to_string()))?;

        let description = self.client.complete(&description_prompt(&movie)).await?;

        tracing::info!(movie_id = %movie_id, provider = self.client.name(), "Description generated");

        Ok(description)
    }
}

fn description_prompt(movie: &Movie) -> String {
    format!(
        "Generate a compelling movie description for:\n\
         Title: {}\n\
         Year: {}\n\
         Genre: {}\n\
         Director: {}\n\
         Cast: {}\n\n\
         Write a 2-3 sentence description that would make someone want to watch this movie.",
        movie.title,
        movie.year,
        movie.genre.join(", "),
        movie.director,
        movie.cast.join(", "),
    )
}
