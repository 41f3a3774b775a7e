use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;

use super::BookStore;
use crate::modules::books::error::StoreError;
use crate::modules::books::models::{Book, BookPatch, BookStatus};

const COLUMNS: &str = "id, title, genre, author, year, rating, status, created_at, updated_at";

/// Row shape of the `books` table.
#[derive(Debug, sqlx::FromRow)]
struct BookRow {
    id: String,
    title: String,
    genre: String,
    author: Option<String>,
    year: Option<i32>,
    rating: Option<f64>,
    status: String,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl TryFrom<BookRow> for Book {
    type Error = StoreError;

    fn try_from(row: BookRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<BookStatus>()
            .map_err(|reason| StoreError::CorruptRow {
                id: row.id.clone(),
                reason,
            })?;

        Ok(Book {
            id: row.id,
            title: row.title,
            genre: row.genre,
            author: row.author,
            year: row.year,
            rating: row.rating,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_books(rows: Vec<BookRow>) -> Result<Vec<Book>, StoreError> {
    rows.into_iter().map(Book::try_from).collect()
}

/// `books` table access through a shared connection pool.
pub struct PgBookStore {
    pool: PgPool,
}

impl PgBookStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookStore for PgBookStore {
    async fn get(&self, id: &str) -> Result<Option<Book>, StoreError> {
        let row = sqlx::query_as::<_, BookRow>(&format!(
            "SELECT {COLUMNS} FROM books WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Book::try_from).transpose()
    }

    async fn list(&self) -> Result<Vec<Book>, StoreError> {
        let rows = sqlx::query_as::<_, BookRow>(&format!(
            "SELECT {COLUMNS} FROM books ORDER BY created_at DESC, seq DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        into_books(rows)
    }

    async fn insert(&self, book: Book) -> Result<Book, StoreError> {
        let row = sqlx::query_as::<_, BookRow>(&format!(
            r#"
            INSERT INTO books (id, title, genre, author, year, rating, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(&book.id)
        .bind(&book.title)
        .bind(&book.genre)
        .bind(&book.author)
        .bind(book.year)
        .bind(book.rating)
        .bind(book.status.as_str())
        .bind(book.created_at)
        .bind(book.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                StoreError::DuplicateId(book.id.clone())
            }
            other => StoreError::Database(other),
        })?;

        Book::try_from(row)
    }

    async fn update(&self, id: &str, patch: BookPatch) -> Result<Option<Book>, StoreError> {
        let row = sqlx::query_as::<_, BookRow>(&format!(
            r#"
            UPDATE books
               SET status = COALESCE($1, status),
                   rating = COALESCE($2, rating),
                   updated_at = $3
             WHERE id = $4
            RETURNING {COLUMNS}
            "#
        ))
        .bind(patch.status.map(|s| s.as_str()))
        .bind(patch.rating)
        .bind(patch.updated_at)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Book::try_from).transpose()
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<Book>, StoreError> {
        let row = sqlx::query_as::<_, BookRow>(&format!(
            r#"
            SELECT {COLUMNS} FROM books
             WHERE lower(title) = lower($1)
             ORDER BY created_at DESC, seq DESC
             LIMIT 1
            "#
        ))
        .bind(title)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Book::try_from).transpose()
    }

    async fn list_by_genre(&self, genre: &str) -> Result<Vec<Book>, StoreError> {
        let rows = sqlx::query_as::<_, BookRow>(&format!(
            "SELECT {COLUMNS} FROM books WHERE genre = $1 ORDER BY created_at DESC, seq DESC"
        ))
        .bind(genre)
        .fetch_all(&self.pool)
        .await?;

        into_books(rows)
    }
}
