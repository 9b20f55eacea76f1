//! PostgreSQL implementations of genre and language repositories.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Genre, Language};
use crate::domain::repositories::{GenreRepository, LanguageRepository};
use crate::error::AppError;
use crate::utils::db_error::is_unique_violation_on;
use serde_json::json;

fn map_duplicate(e: sqlx::Error, constraint: &str, message: &str, name: &str) -> AppError {
    if is_unique_violation_on(&e, constraint) {
        AppError::conflict(message, json!({ "name": name }))
    } else {
        AppError::from(e)
    }
}

#[derive(sqlx::FromRow)]
struct NamedRow {
    id: i64,
    name: String,
}

impl From<NamedRow> for Genre {
    fn from(r: NamedRow) -> Self {
        Genre {
            id: r.id,
            name: r.name,
        }
    }
}

impl From<NamedRow> for Language {
    fn from(r: NamedRow) -> Self {
        Language {
            id: r.id,
            name: r.name,
        }
    }
}

/// PostgreSQL repository for genres.
pub struct PgGenreRepository {
    pool: Arc<PgPool>,
}

impl PgGenreRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GenreRepository for PgGenreRepository {
    async fn create(&self, name: &str) -> Result<Genre, AppError> {
        let row = sqlx::query_as::<_, NamedRow>(
            "INSERT INTO genres (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(|e| map_duplicate(e, "genres_name_key", "Genre already exists", name))?;

        Ok(row.into())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Genre>, AppError> {
        let row = sqlx::query_as::<_, NamedRow>("SELECT id, name FROM genres WHERE name = $1")
            .bind(name)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Genre::from))
    }

    async fn list(&self) -> Result<Vec<Genre>, AppError> {
        let rows = sqlx::query_as::<_, NamedRow>("SELECT id, name FROM genres ORDER BY name")
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(Genre::from).collect())
    }

    async fn count(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM genres")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }
}

/// PostgreSQL repository for languages.
pub struct PgLanguageRepository {
    pool: Arc<PgPool>,
}

impl PgLanguageRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LanguageRepository for PgLanguageRepository {
    async fn create(&self, name: &str) -> Result<Language, AppError> {
        let row = sqlx::query_as::<_, NamedRow>(
            "INSERT INTO languages (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(|e| map_duplicate(e, "languages_name_key", "Language already exists", name))?;

        Ok(row.into())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Language>, AppError> {
        let row = sqlx::query_as::<_, NamedRow>("SELECT id, name FROM languages WHERE name = $1")
            .bind(name)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Language::from))
    }

    async fn list(&self) -> Result<Vec<Language>, AppError> {
        let rows = sqlx::query_as::<_, NamedRow>("SELECT id, name FROM languages ORDER BY name")
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(Language::from).collect())
    }
}
