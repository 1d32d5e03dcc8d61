//! Book copies repository for database operations

use chrono::{NaiveDate, Utc};
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::copy::{BookCopy, CopyDetails, CopyStatus, CreateCopy},
};

#[derive(Clone)]
pub struct CopiesRepository {
    pool: Pool<Postgres>,
}

impl CopiesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get copy by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<BookCopy> {
        sqlx::query_as::<_, BookCopy>("SELECT * FROM book_copies WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Copy with id {} not found", id)))
    }

    /// List copies of a book
    pub async fn list_for_book(&self, book_id: i32) -> AppResult<Vec<BookCopy>> {
        let copies = sqlx::query_as::<_, BookCopy>(
            "SELECT * FROM book_copies WHERE book_id = $1 ORDER BY imprint, id",
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(copies)
    }

    /// Create a copy for a book
    pub async fn create(&self, book_id: i32, copy: &CreateCopy) -> AppResult<BookCopy> {
        let status = copy.status.unwrap_or_default();

        let created = sqlx::query_as::<_, BookCopy>(
            r#"
            INSERT INTO book_copies (id, book_id, imprint, status, due_back, borrower_id)
            VALUES (gen_random_uuid(), $1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(book_id)
        .bind(&copy.imprint)
        .bind(status)
        .bind(copy.due_back)
        .bind(copy.borrower_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Delete a copy
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM book_copies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Copy with id {} not found", id)));
        }
        Ok(())
    }

    /// Update the due date of a copy. This is the single write performed by
    /// the renewal workflow; status and borrower are left untouched.
    pub async fn set_due_back(&self, id: Uuid, due_back: NaiveDate) -> AppResult<()> {
        let result = sqlx::query("UPDATE book_copies SET due_back = $2 WHERE id = $1")
            .bind(id)
            .bind(due_back)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Copy with id {} not found", id)));
        }
        Ok(())
    }

    /// Copies on loan to one user, ordered by due date
    pub async fn borrowed_by_user(
        &self,
        user_id: i32,
        page: i64,
        per_page: i64,
    ) -> AppResult<(Vec<CopyDetails>, i64)> {
        let rows = sqlx::query(
            r#"
            SELECT c.id, c.book_id, c.imprint, c.status, c.due_back, c.borrower_id,
                   b.title,
                   u.last_name || ', ' || u.first_name as borrower_name
            FROM book_copies c
            JOIN books b ON c.book_id = b.id
            LEFT JOIN users u ON c.borrower_id = u.id
            WHERE c.borrower_id = $1 AND c.status = 'o'
            ORDER BY c.due_back
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(per_page)
        .bind((page - 1) * per_page)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM book_copies WHERE borrower_id = $1 AND status = 'o'",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((Self::details_from_rows(rows)?, total))
    }

    /// All copies currently on loan, ordered by due date
    pub async fn all_borrowed(&self, page: i64, per_page: i64) -> AppResult<(Vec<CopyDetails>, i64)> {
        let rows = sqlx::query(
            r#"
            SELECT c.id, c.book_id, c.imprint, c.status, c.due_back, c.borrower_id,
                   b.title,
                   u.last_name || ', ' || u.first_name as borrower_name
            FROM book_copies c
            JOIN books b ON c.book_id = b.id
            LEFT JOIN users u ON c.borrower_id = u.id
            WHERE c.status = 'o'
            ORDER BY c.due_back
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(per_page)
        .bind((page - 1) * per_page)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM book_copies WHERE status = 'o'")
                .fetch_one(&self.pool)
                .await?;

        Ok((Self::details_from_rows(rows)?, total))
    }

    fn details_from_rows(rows: Vec<sqlx::postgres::PgRow>) -> AppResult<Vec<CopyDetails>> {
        let today = Utc::now().date_naive();

        let mut result = Vec::with_capacity(rows.len());
        for row in rows {
            let status: CopyStatus = row.try_get("status")?;
            let due_back: Option<NaiveDate> = row.try_get("due_back")?;

            result.push(CopyDetails {
                id: row.try_get("id")?,
                book_id: row.try_get("book_id")?,
                title: row.try_get("title")?,
                imprint: row.try_get("imprint")?,
                status,
                due_back,
                borrower_id: row.try_get("borrower_id")?,
                borrower_name: row.try_get("borrower_name")?,
                is_overdue: due_back.map(|d| d < today).unwrap_or(false),
            });
        }
        Ok(result)
    }

    /// Copy with book and borrower context
    pub async fn get_details(&self, id: Uuid) -> AppResult<CopyDetails> {
        let row = sqlx::query(
            r#"
            SELECT c.id, c.book_id, c.imprint, c.status, c.due_back, c.borrower_id,
                   b.title,
                   u.last_name || ', ' || u.first_name as borrower_name
            FROM book_copies c
            JOIN books b ON c.book_id = b.id
            LEFT JOIN users u ON c.borrower_id = u.id
            WHERE c.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Copy with id {} not found", id)))?;

        Self::details_from_rows(vec![row])?
            .pop()
            .ok_or_else(|| AppError::Internal("Copy row vanished during mapping".to_string()))
    }

    /// Count all copies
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_copies")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Count available copies
    pub async fn count_available(&self) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM book_copies WHERE status = 'a'")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}
