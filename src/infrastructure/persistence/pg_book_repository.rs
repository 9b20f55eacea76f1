//! PostgreSQL implementation of book repository.

use async_trait::async_trait;
use serde_json::json;
use sqlx::{PgPool, Postgres, Transaction};
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::entities::{Book, BookInput, Genre};
use crate::domain::repositories::BookRepository;
use crate::error::AppError;

/// Column list shared by every book query; callers append `WHERE`/`ORDER BY`.
pub(crate) const BOOK_SELECT: &str = r#"
    SELECT
        b.id,
        b.title,
        b.author_id,
        a.last_name || ', ' || a.first_name AS author_name,
        b.summary,
        b.isbn,
        b.language_id,
        l.name AS language_name
    FROM books b
    LEFT JOIN authors a ON a.id = b.author_id
    LEFT JOIN languages l ON l.id = b.language_id
"#;

#[derive(sqlx::FromRow)]
pub(crate) struct BookRow {
    id: i64,
    title: String,
    author_id: Option<i64>,
    author_name: Option<String>,
    summary: String,
    isbn: String,
    language_id: Option<i64>,
    language_name: Option<String>,
}

#[derive(sqlx::FromRow)]
struct BookGenreRow {
    book_id: i64,
    id: i64,
    name: String,
}

/// Loads the genres of all given books in one query and builds the entities,
/// keeping the row order.
pub(crate) async fn attach_genres(
    pool: &PgPool,
    rows: Vec<BookRow>,
) -> Result<Vec<Book>, AppError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
    let genre_rows = sqlx::query_as::<_, BookGenreRow>(
        r#"
        SELECT bg.book_id, g.id, g.name
        FROM book_genres bg
        JOIN genres g ON g.id = bg.genre_id
        WHERE bg.book_id = ANY($1)
        ORDER BY g.name
        "#,
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let mut by_book: HashMap<i64, Vec<Genre>> = HashMap::new();
    for g in genre_rows {
        by_book.entry(g.book_id).or_default().push(Genre {
            id: g.id,
            name: g.name,
        });
    }

    Ok(rows
        .into_iter()
        .map(|r| Book {
            genres: by_book.remove(&r.id).unwrap_or_default(),
            id: r.id,
            title: r.title,
            author_id: r.author_id,
            author_name: r.author_name,
            summary: r.summary,
            isbn: r.isbn.trim_end().to_string(),
            language_id: r.language_id,
            language_name: r.language_name,
        })
        .collect())
}

async fn replace_genres(
    tx: &mut Transaction<'_, Postgres>,
    book_id: i64,
    genre_ids: &[i64],
) -> Result<(), AppError> {
    sqlx::query("DELETE FROM book_genres WHERE book_id = $1")
        .bind(book_id)
        .execute(&mut **tx)
        .await?;

    sqlx::query(
        r#"
        INSERT INTO book_genres (book_id, genre_id)
        SELECT $1, UNNEST($2::BIGINT[])
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(book_id)
    .bind(genre_ids)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// PostgreSQL repository for books.
///
/// Book rows and their genre links are written in a single transaction.
pub struct PgBookRepository {
    pool: Arc<PgPool>,
}

impl PgBookRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookRepository for PgBookRepository {
    async fn create(&self, input: BookInput) -> Result<Book, AppError> {
        let mut tx = self.pool.begin().await?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO books (title, author_id, summary, isbn, language_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&input.title)
        .bind(input.author_id)
        .bind(&input.summary)
        .bind(&input.isbn)
        .bind(input.language_id)
        .fetch_one(&mut *tx)
        .await?;

        replace_genres(&mut tx, id, &input.genre_ids).await?;
        tx.commit().await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::internal("Created book vanished", json!({ "id": id })))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Book>, AppError> {
        let sql = format!("{BOOK_SELECT} WHERE b.id = $1");
        let row: Option<BookRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        match row {
            Some(row) => Ok(attach_genres(self.pool.as_ref(), vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Book>, AppError> {
        let sql = format!("{BOOK_SELECT} ORDER BY b.title, b.id LIMIT $1 OFFSET $2");
        let rows: Vec<BookRow> = sqlx::query_as(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool.as_ref())
            .await?;

        attach_genres(self.pool.as_ref(), rows).await
    }

    async fn count(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }

    async fn update(&self, id: i64, input: BookInput) -> Result<Book, AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE books SET
                title       = $2,
                author_id   = $3,
                summary     = $4,
                isbn        = $5,
                language_id = $6
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&input.title)
        .bind(input.author_id)
        .bind(&input.summary)
        .bind(&input.isbn)
        .bind(input.language_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(AppError::not_found("Book not found", json!({ "id": id })));
        }

        replace_genres(&mut tx, id, &input.genre_ids).await?;
        tx.commit().await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Book not found", json!({ "id": id })))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
