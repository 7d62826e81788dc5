//! Deterministic genre-affinity recommender used when the model is unavailable.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::{
    models::{Movie, Review},
    services::{preferences::top_genres, recommendations::MAX_RECOMMENDATIONS},
};

/// Reviews below this rating do not count as liking a movie
pub const MIN_LIKED_RATING: i32 = 4;

/// Recommends unreviewed movies sharing a genre with the user's favourites
///
/// ## Algorithm
/// 1. Every review rated at least [`MIN_LIKED_RATING`] adds its rating to each
///    genre of the reviewed movie
/// 2. The top set is every genre sharing the highest score
/// 3. Walk the catalog in order, keeping movies the user never reviewed that
///    carry a top genre, until [`MAX_RECOMMENDATIONS`] are found
pub fn recommend(reviews: &[Review], catalog: &[Movie]) -> Vec<Movie> {
    let by_id: HashMap<Uuid, &Movie> = catalog.iter().map(|m| (m.id, m)).collect();

    let mut genre_scores: HashMap<String, i64> = HashMap::new();
    for review in reviews.iter().filter(|r| r.rating >= MIN_LIKED_RATING) {
        if let Some(movie) = by_id.get(&review.movie_id) {
            for genre in &movie.genre {
                *genre_scores.entry(genre.clone()).or_default() += i64::from(review.rating);
            }
        }
    }

    let top = top_genres(&genre_scores);
    if top.is_empty() {
        return Vec::new();
    }

    let reviewed: HashSet<Uuid> = reviews.iter().map(|r| r.movie_id).collect();

    catalog
        .iter()
        .filter(|movie| !reviewed.contains(&movie.id))
        .filter(|movie| movie.genre.iter().any(|g| top.contains(g)))
        .take(MAX_RECOMMENDATIONS)
        .cloned()
        .collect()
}
