//! Catalog rules on top of a [`BookStore`]: recommendations, status changes,
//! banned-book replacement and rating updates.

use std::cmp::Ordering;
use std::sync::Arc;

use time::OffsetDateTime;
use uuid::Uuid;

use super::error::{CatalogError, CatalogResult};
use super::models::{
    BannedSummary, Book, BookPatch, BookStatus, CreateBook, Recommendation, ReplaceBook,
    Replacement,
};
use super::store::BookStore;
use crate::utils::non_blank;

/// Maximum number of titles returned by a recommendation.
pub const MAX_RECOMMENDATIONS: usize = 10;

/// Placeholder returned instead of an empty recommendation list.
pub const NO_SIMILAR_BOOKS: &str = "No similar books found";

const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1000..=9999;
const RATING_RANGE: std::ops::RangeInclusive<f64> = 0.0..=5.0;

pub struct CatalogService {
    store: Arc<dyn BookStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }

    pub async fn count(&self) -> CatalogResult<usize> {
        Ok(self.store.count().await?)
    }

    /// Every book, newest first.
    pub async fn get_all(&self) -> CatalogResult<Vec<Book>> {
        Ok(self.store.list().await?)
    }

    /// Up to ten same-genre titles for the book called `title`, best rated
    /// first (unrated last), then newest first.
    pub async fn recommend_by_title(&self, title: &str) -> CatalogResult<Recommendation> {
        let wanted = title.trim();
        if wanted.is_empty() {
            return Err(CatalogError::validation(
                "title",
                "Missing required query parameter: title",
            ));
        }

        let source = self
            .store
            .find_by_title(wanted)
            .await?
            .ok_or_else(|| CatalogError::not_found(format!("Book \"{}\" not found", wanted)))?;

        let mut peers: Vec<Book> = self
            .store
            .list_by_genre(&source.genre)
            .await?
            .into_iter()
            .filter(|book| book.id != source.id)
            .collect();
        peers.sort_by(rank);

        let mut recommendations: Vec<String> = peers
            .into_iter()
            .take(MAX_RECOMMENDATIONS)
            .map(|book| book.title)
            .collect();
        if recommendations.is_empty() {
            recommendations.push(NO_SIMILAR_BOOKS.to_string());
        }

        tracing::debug!(
            source = %source.id,
            genre = %source.genre,
            count = recommendations.len(),
            "recommendations computed"
        );

        Ok(Recommendation {
            message: format!("Since you liked \"{}\", you might also enjoy:", source.title),
            recommendations,
        })
    }

    pub async fn create(&self, input: CreateBook) -> CatalogResult<Book> {
        let title = require_text("title", "book title", input.title.as_deref())?;
        let genre = require_text("genre", "genre", input.genre.as_deref())?;
        let author = optional_author(input.author.as_deref())?;
        let year = check_year(input.year)?;
        let rating = input.rating.map(check_rating).transpose()?;

        let book = self
            .store
            .insert(new_book(title, genre, author, year, rating))
            .await?;

        tracing::info!(book_id = %book.id, genre = %book.genre, "book created");
        Ok(book)
    }

    pub async fn set_status(&self, id: &str, status: &str) -> CatalogResult<Book> {
        let status: BookStatus = status.parse().map_err(|_| {
            CatalogError::validation("status", "status must be either active or banned")
        })?;

        let book = self
            .store
            .update(id, BookPatch::status(status))
            .await?
            .ok_or_else(|| CatalogError::not_found("Book not found"))?;

        tracing::info!(book_id = %book.id, status = %book.status, "book status changed");
        Ok(book)
    }

    /// Add a new active book in the banned book's genre. The banned book is
    /// left as it is.
    pub async fn replace_banned(
        &self,
        banned_id: &str,
        input: ReplaceBook,
    ) -> CatalogResult<Replacement> {
        let banned = self
            .store
            .get(banned_id)
            .await?
            .ok_or_else(|| CatalogError::not_found("Banned book not found"))?;

        if !banned.is_banned() {
            return Err(CatalogError::InvalidState(
                "Target book must be 'banned' before adding a replacement".to_string(),
            ));
        }

        let genre = match non_blank(input.genre.as_deref()) {
            Some(genre) if genre != banned.genre => {
                return Err(CatalogError::validation(
                    "genre",
                    "Replacement must be in the same genre as the banned book",
                ));
            }
            _ => banned.genre.clone(),
        };

        let title = require_text("title", "book title", input.title.as_deref())?;
        let author = optional_author(input.author.as_deref())?;
        let year = check_year(input.year)?;
        let rating = input.rating.map(check_rating).transpose()?;

        let replacement = self
            .store
            .insert(new_book(title, genre, author, year, rating))
            .await?;

        tracing::info!(
            banned_id = %banned.id,
            replacement_id = %replacement.id,
            genre = %replacement.genre,
            "replacement added for banned book"
        );

        Ok(Replacement {
            message: "Replacement book added (banned book remains).".to_string(),
            banned: BannedSummary::from(&banned),
            replacement,
        })
    }

    pub async fn update_rating(&self, id: &str, rating: f64) -> CatalogResult<Book> {
        let rating = check_rating(rating)?;

        let book = self
            .store
            .update(id, BookPatch::rating(rating))
            .await?
            .ok_or_else(|| CatalogError::not_found("Book not found"))?;

        tracing::info!(book_id = %book.id, rating, "book rating updated");
        Ok(book)
    }
}

/// Rating descending with unrated books last, then newest first.
fn rank(a: &Book, b: &Book) -> Ordering {
    let by_rating = match (a.rating, b.rating) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_rating.then_with(|| b.created_at.cmp(&a.created_at))
}

fn new_book(
    title: String,
    genre: String,
    author: Option<String>,
    year: Option<i32>,
    rating: Option<f64>,
) -> Book {
    let now = OffsetDateTime::now_utc();
    Book {
        id: Uuid::now_v7().to_string(),
        title,
        genre,
        author,
        year,
        rating,
        status: BookStatus::Active,
        created_at: now,
        updated_at: now,
    }
}

fn require_text(field: &'static str, label: &str, value: Option<&str>) -> CatalogResult<String> {
    match value {
        None => Err(CatalogError::validation(field, format!("need a {}", label))),
        Some(raw) => non_blank(Some(raw))
            .ok_or_else(|| CatalogError::validation(field, format!("{} cannot be empty", label))),
    }
}

fn optional_author(value: Option<&str>) -> CatalogResult<Option<String>> {
    match value {
        None => Ok(None),
        Some(_) => require_text("author", "author", value).map(Some),
    }
}

fn check_year(year: Option<i32>) -> CatalogResult<Option<i32>> {
    match year {
        Some(y) if !YEAR_RANGE.contains(&y) => Err(CatalogError::validation(
            "year",
            "year must be a 4-digit number",
        )),
        other => Ok(other),
    }
}

fn check_rating(rating: f64) -> CatalogResult<f64> {
    if RATING_RANGE.contains(&rating) {
        Ok(rating)
    } else {
        Err(CatalogError::validation(
            "rating",
            "rating must be between 0 and 5",
        ))
    }
}
