//! Condenses a user's rating history into the profile the recommenders read.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use uuid::Uuid;

use crate::models::{Movie, Review};

/// Rendered in place of a profile when the user has not rated anything
pub const NO_HISTORY: &str = "No viewing history available.";

/// A rated movie as it appears in the profile
#[derive(Debug, Clone, PartialEq)]
pub struct RatedTitle {
    pub title: String,
    pub rating: i32,
}

impl fmt::Display for RatedTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (rated {}/5)", self.title, self.rating)
    }
}

/// Summary of one user's rating behaviour, built fresh for each request
#[derive(Debug, Clone, PartialEq)]
pub struct PreferenceProfile {
    pub rated_count: usize,
    pub average_rating: f64,
    /// Every genre sharing the highest rating-weighted score
    pub top_genres: BTreeSet<String>,
    /// Rated movies still present in the catalog, in review order
    pub rated_titles: Vec<RatedTitle>,
}

impl PreferenceProfile {
    pub fn has_history(&self) -> bool {
        self.rated_count > 0
    }
}

impl fmt::Display for PreferenceProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.has_history() {
            return f.write_str(NO_HISTORY);
        }

        writeln!(
            f,
            "User has watched and rated {} movies with an average rating of {:.1}/5.",
            self.rated_count, self.average_rating
        )?;
        let genres: Vec<&str> = self.top_genres.iter().map(String::as_str).collect();
        writeln!(f, "Preferred genres: {}", genres.join(", "))?;
        f.write_str("Rated movies:")?;
        for rated in &self.rated_titles {
            write!(f, "\n- {}", rated)?;
        }
        Ok(())
    }
}

/// Genres whose score equals the maximum; empty when there are no scores
pub fn top_genres(scores: &HashMap<String, i64>) -> BTreeSet<String> {
    let Some(max) = scores.values().copied().max() else {
        return BTreeSet::new();
    };

    scores
        .iter()
        .filter(|(_, score)| **score == max)
        .map(|(genre, _)| genre.clone())
        .collect()
}

/// Builds a profile from the user's reviews and a catalog snapshot
///
/// Reviews of movies missing from the catalog still count towards the rated
/// count and the average, but contribute no genres or titles. The average is
/// the plain mean of every rating, not the sum of matched ratings over the
/// full review count.
pub fn summarize(reviews: &[Review], catalog: &[Movie]) -> PreferenceProfile {
    if reviews.is_empty() {
        return PreferenceProfile {
            rated_count: 0,
            average_rating: 0.0,
            top_genres: BTreeSet::new(),
            rated_titles: Vec::new(),
        };
    }

    let by_id: HashMap<Uuid, &Movie> = catalog.iter().map(|m| (m.id, m)).collect();

    let mut genre_scores: HashMap<String, i64> = HashMap::new();
    let mut rated_titles = Vec::new();
    let mut rating_sum = 0i64;

    for review in reviews {
        rating_sum += i64::from(review.rating);

        let Some(movie) = by_id.get(&review.movie_id) else {
            continue;
        };
        for genre in &movie.genre {
            *genre_scores.entry(genre.clone()).or_default() += i64::from(review.rating);
        }
        rated_titles.push(RatedTitle {
            title: movie.title.clone(),
            rating: review.rating,
        });
    }

    PreferenceProfile {
        rated_count: reviews.len(),
        average_rating: rating_sum as f64 / reviews.len() as f64,
        top_genres: top_genres(&genre_scores),
        rated_titles,
    }
}
