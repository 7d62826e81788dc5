use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    db::CatalogStore,
    error::AppResult,
    models::{Movie, MovieFilter, MoviePage, Review},
};

const MOVIE_COLUMNS: &str = "id, title, description, genre, year, duration, rating, poster_url, \
     video_url, director, cast_members, created_at, updated_at, created_by";

const REVIEW_COLUMNS: &str = "id, movie_id, user_id, rating, comment, created_at, updated_at";

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Catalog backed by the `movies` and `reviews` tables
#[derive(Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects and applies pending migrations
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = create_pool(database_url).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
        Ok(Self::new(pool))
    }
}

/// Escapes LIKE wildcards so user search text matches literally
fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn push_filter_clauses(builder: &mut QueryBuilder<'_, Postgres>, filter: &MovieFilter) {
    builder.push(" WHERE TRUE");

    if let Some(search) = &filter.search {
        let pattern = like_pattern(search);
        builder
            .push(" AND (title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(genre) = &filter.genre {
        builder.push(" AND ").push_bind(genre.clone()).push(" = ANY(genre)");
    }
    if let Some(year) = filter.year {
        builder.push(" AND year = ").push_bind(year);
    }
}

#[async_trait::async_trait]
impl CatalogStore for PgCatalogStore {
    async fn find_all_movies(&self) -> AppResult<Vec<Movie>> {
        let sql = format!("SELECT {} FROM movies ORDER BY created_at, id", MOVIE_COLUMNS);
        let movies = sqlx::query_as::<_, Movie>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(movies)
    }

    async fn list_movies(&self, filter: &MovieFilter) -> AppResult<MoviePage> {
        let mut count_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM movies");
        push_filter_clauses(&mut count_query, filter);
        let total: i64 = count_query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut page_query =
            QueryBuilder::<Postgres>::new(format!("SELECT {} FROM movies", MOVIE_COLUMNS));
        push_filter_clauses(&mut page_query, filter);
        page_query
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(i64::from(filter.limit))
            .push(" OFFSET ")
            .push_bind(i64::from(filter.offset));

        let movies = page_query
            .build_query_as::<Movie>()
            .fetch_all(&self.pool)
            .await?;

        Ok(MoviePage {
            movies,
            total: total.max(0) as u64,
        })
    }

    async fn find_movie(&self, id: Uuid) -> AppResult<Option<Movie>> {
        let sql = format!("SELECT {} FROM movies WHERE id = $1", MOVIE_COLUMNS);
        let movie = sqlx::query_as::<_, Movie>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(movie)
    }

    async fn insert_movie(&self, movie: &Movie) -> AppResult<()> {
        let sql = format!(
            "INSERT INTO movies ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
            MOVIE_COLUMNS
        );
        sqlx::query(&sql)
            .bind(movie.id)
            .bind(&movie.title)
            .bind(&movie.description)
            .bind(&movie.genre)
            .bind(movie.year)
            .bind(movie.duration)
            .bind(movie.rating)
            .bind(&movie.poster_url)
            .bind(&movie.video_url)
            .bind(&movie.director)
            .bind(&movie.cast)
            .bind(movie.created_at)
            .bind(movie.updated_at)
            .bind(movie.created_by)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_movie(&self, movie: &Movie) -> AppResult<Option<Movie>> {
        let sql = format!(
            r#"
            UPDATE movies
            SET title = $2, description = $3, genre = $4, year = $5, duration = $6,
                poster_url = $7, video_url = $8, director = $9, cast_members = $10,
                updated_at = $11
            WHERE id = $1
            RETURNING {}
            "#,
            MOVIE_COLUMNS
        );
        let updated = sqlx::query_as::<_, Movie>(&sql)
            .bind(movie.id)
            .bind(&movie.title)
            .bind(&movie.description)
            .bind(&movie.genre)
            .bind(movie.year)
            .bind(movie.duration)
            .bind(&movie.poster_url)
            .bind(&movie.video_url)
            .bind(&movie.director)
            .bind(&movie.cast)
            .bind(movie.updated_at)
            .fetch_optional(&self.pool)
            .await?;
        Ok(updated)
    }

    async fn delete_movie(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM movies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_movie_rating(&self, id: Uuid, rating: f64) -> AppResult<()> {
        sqlx::query("UPDATE movies SET rating = $2 WHERE id = $1")
            .bind(id)
            .bind(rating)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_genres(&self) -> AppResult<Vec<String>> {
        let genres = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT g FROM movies, unnest(genre) AS g ORDER BY g",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(genres)
    }

    async fn insert_review(&self, review: &Review) -> AppResult<()> {
        let sql = format!(
            "INSERT INTO reviews ({}) VALUES ($1, $2, $3, $4, $5, $6, $7)",
            REVIEW_COLUMNS
        );
        sqlx::query(&sql)
            .bind(review.id)
            .bind(review.movie_id)
            .bind(review.user_id)
            .bind(review.rating)
            .bind(&review.comment)
            .bind(review.created_at)
            .bind(review.updated_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_reviews_by_movie(&self, movie_id: Uuid) -> AppResult<Vec<Review>> {
        let sql = format!(
            "SELECT {} FROM reviews WHERE movie_id = $1 ORDER BY created_at",
            REVIEW_COLUMNS
        );
        let reviews = sqlx::query_as::<_, Review>(&sql)
            .bind(movie_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(reviews)
    }

    async fn find_reviews_by_user(&self, user_id: Uuid) -> AppResult<Vec<Review>> {
        let sql = format!(
            "SELECT {} FROM reviews WHERE user_id = $1 ORDER BY created_at",
            REVIEW_COLUMNS
        );
        let reviews = sqlx::query_as::<_, Review>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(reviews)
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}
