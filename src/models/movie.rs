use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A catalog entry
///
/// `rating` is the mean of all stored review ratings and is only ever
/// written by review submission, never by a movie edit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub genre: Vec<String>,
    pub year: i32,
    /// Runtime in minutes
    pub duration: i32,
    pub rating: f64,
    pub poster_url: String,
    /// Path to the video file on disk
    pub video_url: String,
    pub director: String,
    #[sqlx(rename = "cast_members")]
    pub cast: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Uuid,
}

impl Movie {
    /// Builds a new unrated movie from an admin request
    pub fn new(request: CreateMovieRequest, created_by: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: request.title,
            description: request.description,
            genre: request.genre,
            year: request.year,
            duration: request.duration,
            rating: 0.0,
            poster_url: request.poster_url,
            video_url: request.video_url,
            director: request.director,
            cast: request.cast,
            created_at: now,
            updated_at: now,
            created_by,
        }
    }

    /// Applies the supplied fields of a partial update
    ///
    /// Empty strings, zero numbers and missing lists leave the field untouched.
    pub fn apply_update(&mut self, update: UpdateMovieRequest) {
        fn set_text(field: &mut String, value: Option<String>) {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                *field = value;
            }
        }

        set_text(&mut self.title, update.title);
        set_text(&mut self.description, update.description);
        set_text(&mut self.poster_url, update.poster_url);
        set_text(&mut self.video_url, update.video_url);
        set_text(&mut self.director, update.director);

        if let Some(genre) = update.genre {
            self.genre = genre;
        }
        if let Some(cast) = update.cast {
            self.cast = cast;
        }
        if let Some(year) = update.year.filter(|y| *y != 0) {
            self.year = year;
        }
        if let Some(duration) = update.duration.filter(|d| *d != 0) {
            self.duration = duration;
        }

        self.updated_at = Utc::now();
    }

    pub fn has_genre(&self, genre: &str) -> bool {
        self.genre.iter().any(|g| g == genre)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMovieRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub genre: Vec<String>,
    pub year: i32,
    #[serde(default)]
    pub duration: i32,
    #[serde(default)]
    pub poster_url: String,
    #[serde(default)]
    pub video_url: String,
    #[serde(default)]
    pub director: String,
    #[serde(default)]
    pub cast: Vec<String>,
}

impl CreateMovieRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title is required".to_string());
        }
        if self.year == 0 {
            return Err("year is required".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMovieRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub genre: Option<Vec<String>>,
    pub year: Option<i32>,
    pub duration: Option<i32>,
    pub poster_url: Option<String>,
    pub video_url: Option<String>,
    pub director: Option<String>,
    pub cast: Option<Vec<String>>,
}

/// Catalog listing filter, already resolved into an offset window
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovieFilter {
    /// Case-insensitive substring matched against title or description
    pub search: Option<String>,
    pub genre: Option<String>,
    pub year: Option<i32>,
    pub offset: u32,
    pub limit: u32,
}

impl MovieFilter {
    /// Whether a movie passes the search/genre/year predicates
    pub fn matches(&self, movie: &Movie) -> bool {
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            if !movie.title.to_lowercase().contains(&needle)
                && !movie.description.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        if let Some(genre) = &self.genre {
            if !movie.has_genre(genre) {
                return false;
            }
        }
        if let Some(year) = self.year {
            if movie.year != year {
                return false;
            }
        }
        true
    }
}

/// One page of catalog results plus the total match count
#[derive(Debug, Clone, PartialEq)]
pub struct MoviePage {
    pub movies: Vec<Movie>,
    pub total: u64,
}
