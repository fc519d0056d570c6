//! PostgreSQL storage backend using sqlx.
//!
//! Provides `PostgresStore`, backed by a PostgreSQL database via `sqlx::PgPool`.
//!
//! # Feature flag
//!
//! This module is gated behind the `postgres` feature flag:
//! ```toml
//! [dependencies]
//! casting-api = { version = "0.1", features = ["postgres"] }
//! ```
//!
//! Every mutation is a single statement, so it commits or fails as a whole.
//! Association cascades come from `ON DELETE CASCADE` foreign keys.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::core::link::Association;
use crate::core::service::{AssociationService, DataService};
use crate::entities::actor::{Actor, NewActor};
use crate::entities::movie::{Movie, NewMovie};

type MovieRow = (i64, String, Option<NaiveDate>);
type ActorRow = (i64, String, i32, Option<String>);

fn movie_from_row((id, title, release_date): MovieRow) -> Movie {
    Movie {
        id,
        title,
        release_date,
    }
}

fn actor_from_row((id, name, age, gender): ActorRow) -> Actor {
    Actor {
        id,
        name,
        age,
        gender,
    }
}

/// Create the casting tables if they do not exist yet
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS movie (
            id BIGSERIAL PRIMARY KEY,
            title VARCHAR(80) NOT NULL,
            release_date DATE NULL
        )",
    )
    .execute(pool)
    .await
    .map_err(|e| anyhow!("Failed to create movie table: {}", e))?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS actor (
            id BIGSERIAL PRIMARY KEY,
            name VARCHAR(30) NOT NULL,
            age INTEGER NOT NULL,
            gender VARCHAR(10) NULL
        )",
    )
    .execute(pool)
    .await
    .map_err(|e| anyhow!("Failed to create actor table: {}", e))?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS association (
            movie_id BIGINT NOT NULL REFERENCES movie (id) ON DELETE CASCADE,
            actor_id BIGINT NOT NULL REFERENCES actor (id) ON DELETE CASCADE,
            PRIMARY KEY (movie_id, actor_id)
        )",
    )
    .execute(pool)
    .await
    .map_err(|e| anyhow!("Failed to create association table: {}", e))?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_association_actor ON association (actor_id)")
        .execute(pool)
        .await
        .map_err(|e| anyhow!("Failed to create association index: {}", e))?;

    Ok(())
}

/// Movie, actor and association storage backed by PostgreSQL.
///
/// # Example
///
/// ```rust,ignore
/// use casting::storage::PostgresStore;
///
/// let store = PostgresStore::connect("postgres://casting@localhost/casting").await?;
/// store.ensure_schema().await?;
/// ```
#[derive(Clone, Debug)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new `PostgresStore` with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect a pool to `database_url`
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| anyhow!("Failed to connect to PostgreSQL: {}", e))?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn ensure_schema(&self) -> Result<()> {
        ensure_schema(&self.pool).await
    }
}

fn split_pairs(pairs: &[Association]) -> (Vec<i64>, Vec<i64>) {
    pairs.iter().map(|p| (p.movie_id, p.actor_id)).unzip()
}

#[async_trait]
impl DataService<Movie> for PostgresStore {
    async fn create(&self, draft: NewMovie) -> Result<Movie> {
        let row = sqlx::query_as::<_, MovieRow>(
            "INSERT INTO movie (title, release_date) VALUES ($1, $2) \
             RETURNING id, title, release_date",
        )
        .bind(&draft.title)
        .bind(draft.release_date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| anyhow!("Failed to create movie: {}", e))?;

        Ok(movie_from_row(row))
    }

    async fn get(&self, id: i64) -> Result<Option<Movie>> {
        let row = sqlx::query_as::<_, MovieRow>(
            "SELECT id, title, release_date FROM movie WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| anyhow!("Failed to get movie: {}", e))?;

        Ok(row.map(movie_from_row))
    }

    async fn get_many(&self, ids: &[i64]) -> Result<Vec<Movie>> {
        let rows = sqlx::query_as::<_, MovieRow>(
            "SELECT id, title, release_date FROM movie WHERE id = ANY($1) ORDER BY id",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| anyhow!("Failed to get movies: {}", e))?;

        Ok(rows.into_iter().map(movie_from_row).collect())
    }

    async fn list(&self) -> Result<Vec<Movie>> {
        let rows = sqlx::query_as::<_, MovieRow>(
            "SELECT id, title, release_date FROM movie ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| anyhow!("Failed to list movies: {}", e))?;

        Ok(rows.into_iter().map(movie_from_row).collect())
    }

    async fn update(&self, movie: Movie) -> Result<Option<Movie>> {
        let row = sqlx::query_as::<_, MovieRow>(
            "UPDATE movie SET title = $2, release_date = $3 WHERE id = $1 \
             RETURNING id, title, release_date",
        )
        .bind(movie.id)
        .bind(&movie.title)
        .bind(movie.release_date)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| anyhow!("Failed to update movie: {}", e))?;

        Ok(row.map(movie_from_row))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM movie WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| anyhow!("Failed to delete movie: {}", e))?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl DataService<Actor> for PostgresStore {
    async fn create(&self, draft: NewActor) -> Result<Actor> {
        let row = sqlx::query_as::<_, ActorRow>(
            "INSERT INTO actor (name, age, gender) VALUES ($1, $2, $3) \
             RETURNING id, name, age, gender",
        )
        .bind(&draft.name)
        .bind(draft.age)
        .bind(&draft.gender)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| anyhow!("Failed to create actor: {}", e))?;

        Ok(actor_from_row(row))
    }

    async fn get(&self, id: i64) -> Result<Option<Actor>> {
        let row = sqlx::query_as::<_, ActorRow>(
            "SELECT id, name, age, gender FROM actor WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| anyhow!("Failed to get actor: {}", e))?;

        Ok(row.map(actor_from_row))
    }

    async fn get_many(&self, ids: &[i64]) -> Result<Vec<Actor>> {
        let rows = sqlx::query_as::<_, ActorRow>(
            "SELECT id, name, age, gender FROM actor WHERE id = ANY($1) ORDER BY id",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| anyhow!("Failed to get actors: {}", e))?;

        Ok(rows.into_iter().map(actor_from_row).collect())
    }

    async fn list(&self) -> Result<Vec<Actor>> {
        let rows = sqlx::query_as::<_, ActorRow>(
            "SELECT id, name, age, gender FROM actor ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| anyhow!("Failed to list actors: {}", e))?;

        Ok(rows.into_iter().map(actor_from_row).collect())
    }

    async fn update(&self, actor: Actor) -> Result<Option<Actor>> {
        let row = sqlx::query_as::<_, ActorRow>(
            "UPDATE actor SET name = $2, age = $3, gender = $4 WHERE id = $1 \
             RETURNING id, name, age, gender",
        )
        .bind(actor.id)
        .bind(&actor.name)
        .bind(actor.age)
        .bind(&actor.gender)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| anyhow!("Failed to update actor: {}", e))?;

        Ok(row.map(actor_from_row))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM actor WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| anyhow!("Failed to delete actor: {}", e))?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl AssociationService for PostgresStore {
    async fn find_by_movie(&self, movie_id: i64) -> Result<Vec<Association>> {
        let rows = sqlx::query_as::<_, (i64, i64)>(
            "SELECT movie_id, actor_id FROM association WHERE movie_id = $1 ORDER BY actor_id",
        )
        .bind(movie_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| anyhow!("Failed to find associations by movie: {}", e))?;

        Ok(rows.into_iter().map(|(m, a)| Association::new(m, a)).collect())
    }

    async fn find_by_actor(&self, actor_id: i64) -> Result<Vec<Association>> {
        let rows = sqlx::query_as::<_, (i64, i64)>(
            "SELECT movie_id, actor_id FROM association WHERE actor_id = $1 ORDER BY movie_id",
        )
        .bind(actor_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| anyhow!("Failed to find associations by actor: {}", e))?;

        Ok(rows.into_iter().map(|(m, a)| Association::new(m, a)).collect())
    }

    async fn link_all(&self, pairs: &[Association]) -> Result<usize> {
        if pairs.is_empty() {
            return Ok(0);
        }
        let (movie_ids, actor_ids) = split_pairs(pairs);

        let result = sqlx::query(
            "INSERT INTO association (movie_id, actor_id) \
             SELECT DISTINCT p.movie_id, p.actor_id \
             FROM UNNEST($1::BIGINT[], $2::BIGINT[]) AS p (movie_id, actor_id) \
             JOIN movie m ON m.id = p.movie_id \
             JOIN actor a ON a.id = p.actor_id \
             ON CONFLICT (movie_id, actor_id) DO NOTHING",
        )
        .bind(&movie_ids)
        .bind(&actor_ids)
        .execute(&self.pool)
        .await
        .map_err(|e| anyhow!("Failed to link associations: {}", e))?;

        Ok(result.rows_affected() as usize)
    }

    async fn unlink_all(&self, pairs: &[Association]) -> Result<usize> {
        if pairs.is_empty() {
            return Ok(0);
        }
        let (movie_ids, actor_ids) = split_pairs(pairs);

        let result = sqlx::query(
            "DELETE FROM association AS assoc \
             USING UNNEST($1::BIGINT[], $2::BIGINT[]) AS p (movie_id, actor_id) \
             WHERE assoc.movie_id = p.movie_id AND assoc.actor_id = p.actor_id",
        )
        .bind(&movie_ids)
        .bind(&actor_ids)
        .execute(&self.pool)
        .await
        .map_err(|e| anyhow!("Failed to unlink associations: {}", e))?;

        Ok(result.rows_affected() as usize)
    }
}
