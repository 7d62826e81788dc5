use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

/// A user's rating of a movie
///
/// A user may review the same movie more than once; every review counts
/// towards the movie's average.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub movie_id: Uuid,
    pub user_id: Uuid,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Review {
    pub fn new(movie_id: Uuid, user_id: Uuid, rating: i32, comment: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            movie_id,
            user_id,
            rating,
            comment,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateReviewRequest {
    pub rating: i32,
    #[serde(default)]
    pub comment: String,
}

impl CreateReviewRequest {
    pub fn validate(&self) -> Result<(), String> {
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(format!(
                "rating must be between {} and {}",
                MIN_RATING, MAX_RATING
            ));
        }
        Ok(())
    }
}

/// Mean of the given ratings, or 0 when there are none
pub fn average_rating(reviews: &[Review]) -> f64 {
    if reviews.is_empty() {
        return 0.0;
    }
    let sum: i64 = reviews.iter().map(|r| i64::from(r.rating)).sum();
    sum as f64 / reviews.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        let ok = CreateReviewRequest {
            rating: 5,
            comment: String::new(),
        };
        let low = CreateReviewRequest {
            rating: 0,
            comment: String::new(),
        };
        let high = CreateReviewRequest {
            rating: 6,
            comment: String::new(),
        };

        assert!(ok.validate().is_ok());
        assert!(low.validate().is_err());
        assert!(high.validate().is_err());
    }

    #[test]
    fn test_average_rating() {
        let movie = Uuid::new_v4();
        let user = Uuid::new_v4();
        let reviews = vec![
            Review::new(movie, user, 5, String::new()),
            Review::new(movie, user, 2, String::new()),
        ];

        assert_eq!(average_rating(&reviews), 3.5);
        assert_eq!(average_rating(&[]), 0.0);
    }
}
