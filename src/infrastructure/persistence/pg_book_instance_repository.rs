//! PostgreSQL implementation of book copy repository.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{BookInstance, LoanStatus, NewBookInstance};
use crate::domain::repositories::BookInstanceRepository;
use crate::error::AppError;

/// Joins a copy (`bi`) with its book title and borrower name.
const COPY_SELECT: &str = r#"
    SELECT
        bi.id,
        bi.book_id,
        b.title AS book_title,
        bi.imprint,
        bi.due_back,
        bi.status,
        bi.borrower_id,
        u.username AS borrower_username
    FROM book_instances bi
    JOIN books b ON b.id = bi.book_id
    LEFT JOIN users u ON u.id = bi.borrower_id
"#;

#[derive(sqlx::FromRow)]
struct BookInstanceRow {
    id: i64,
    book_id: i64,
    book_title: String,
    imprint: String,
    due_back: Option<NaiveDate>,
    status: String,
    borrower_id: Option<i64>,
    borrower_username: Option<String>,
}

impl TryFrom<BookInstanceRow> for BookInstance {
    type Error = AppError;

    fn try_from(r: BookInstanceRow) -> Result<Self, Self::Error> {
        let status = r.status.parse::<LoanStatus>().map_err(|reason| {
            AppError::internal("Corrupt copy status", json!({ "id": r.id, "reason": reason }))
        })?;

        Ok(BookInstance {
            id: r.id,
            book_id: r.book_id,
            book_title: r.book_title,
            imprint: r.imprint,
            due_back: r.due_back,
            status,
            borrower_id: r.borrower_id,
            borrower_username: r.borrower_username,
        })
    }
}

fn into_copies(rows: Vec<BookInstanceRow>) -> Result<Vec<BookInstance>, AppError> {
    rows.into_iter().map(BookInstance::try_from).collect()
}

/// PostgreSQL repository for book copies and loans.
pub struct PgBookInstanceRepository {
    pool: Arc<PgPool>,
}

impl PgBookInstanceRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    async fn fetch_one(&self, id: i64) -> Result<BookInstance, AppError> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Book copy not found", json!({ "id": id })))
    }
}

#[async_trait]
impl BookInstanceRepository for PgBookInstanceRepository {
    async fn create(&self, new_copy: NewBookInstance) -> Result<BookInstance, AppError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO book_instances (book_id, imprint, status, due_back)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(new_copy.book_id)
        .bind(&new_copy.imprint)
        .bind(new_copy.status.code())
        .bind(new_copy.due_back)
        .fetch_one(self.pool.as_ref())
        .await?;

        self.fetch_one(id).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<BookInstance>, AppError> {
        let sql = format!("{COPY_SELECT} WHERE bi.id = $1");
        let row: Option<BookInstanceRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.map(BookInstance::try_from).transpose()
    }

    async fn list_for_book(&self, book_id: i64) -> Result<Vec<BookInstance>, AppError> {
        let sql = format!("{COPY_SELECT} WHERE bi.book_id = $1 ORDER BY bi.id");
        let rows: Vec<BookInstanceRow> = sqlx::query_as(&sql)
            .bind(book_id)
            .fetch_all(self.pool.as_ref())
            .await?;

        into_copies(rows)
    }

    async fn count(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_instances")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }

    async fn count_by_status(&self, status: LoanStatus) -> Result<i64, AppError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM book_instances WHERE status = $1")
                .bind(status.code())
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(count)
    }

    async fn list_on_loan(
        &self,
        borrower_id: Option<i64>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<BookInstance>, AppError> {
        let sql = format!(
            r#"{COPY_SELECT}
            WHERE bi.status = 'o'
              AND ($1::BIGINT IS NULL OR bi.borrower_id = $1)
            ORDER BY bi.due_back, bi.id
            LIMIT $2 OFFSET $3"#
        );
        let rows: Vec<BookInstanceRow> = sqlx::query_as(&sql)
            .bind(borrower_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool.as_ref())
            .await?;

        into_copies(rows)
    }

    async fn count_on_loan(&self, borrower_id: Option<i64>) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM book_instances
            WHERE status = 'o'
              AND ($1::BIGINT IS NULL OR borrower_id = $1)
            "#,
        )
        .bind(borrower_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count)
    }

    async fn update_due_back(
        &self,
        id: i64,
        due_back: NaiveDate,
    ) -> Result<BookInstance, AppError> {
        let result = sqlx::query("UPDATE book_instances SET due_back = $2 WHERE id = $1")
            .bind(id)
            .bind(due_back)
            .execute(self.pool.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Book copy not found", json!({ "id": id })));
        }

        self.fetch_one(id).await
    }

    async fn lend(
        &self,
        id: i64,
        borrower_id: i64,
        due_back: NaiveDate,
    ) -> Result<BookInstance, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE book_instances
            SET status = 'o', borrower_id = $2, due_back = $3
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(borrower_id)
        .bind(due_back)
        .execute(self.pool.as_ref())
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Book copy not found", json!({ "id": id })));
        }

        self.fetch_one(id).await
    }

    async fn mark_returned(&self, id: i64) -> Result<BookInstance, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE book_instances
            SET status = 'a', borrower_id = NULL, due_back = NULL
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(self.pool.as_ref())
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Book copy not found", json!({ "id": id })));
        }

        self.fetch_one(id).await
    }
}
