use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Opaque identifier, fixed for the lifetime of the book
    pub id: String,
    pub title: String,
    pub genre: String,
    #[serde(default)]
    pub author: Option<String>,
    /// Four-digit publication year
    #[serde(default)]
    pub year: Option<i32>,
    /// Reader rating in `[0, 5]`
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub status: BookStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Book {
    pub fn is_banned(&self) -> bool {
        self.status == BookStatus::Banned
    }

    /// Apply a partial update in place.
    pub fn apply(&mut self, patch: &BookPatch) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(rating) = patch.rating {
            self.rating = Some(rating);
        }
        self.updated_at = patch.updated_at;
    }
}

/// Visibility of a book. `available` is accepted as an alias of `active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookStatus {
    #[default]
    #[serde(alias = "available")]
    Active,
    Banned,
}

impl BookStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Active => "active",
            BookStatus::Banned => "banned",
        }
    }
}

impl std::fmt::Display for BookStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BookStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" | "available" => Ok(BookStatus::Active),
            "banned" => Ok(BookStatus::Banned),
            other => Err(format!("unknown status '{}'", other)),
        }
    }
}

/// Fields a store update may change. `updated_at` is always written.
#[derive(Debug, Clone, PartialEq)]
pub struct BookPatch {
    pub status: Option<BookStatus>,
    pub rating: Option<f64>,
    pub updated_at: OffsetDateTime,
}

impl BookPatch {
    pub fn status(status: BookStatus) -> Self {
        Self {
            status: Some(status),
            rating: None,
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    pub fn rating(rating: f64) -> Self {
        Self {
            status: None,
            rating: Some(rating),
            updated_at: OffsetDateTime::now_utc(),
        }
    }
}

/// Request model for creating a new book.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateBook {
    pub title: Option<String>,
    pub genre: Option<String>,
    pub author: Option<String>,
    pub year: Option<i32>,
    pub rating: Option<f64>,
}

/// Request model for adding a replacement for a banned book.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReplaceBook {
    pub title: Option<String>,
    pub author: Option<String>,
    pub year: Option<i32>,
    pub rating: Option<f64>,
    /// Must match the banned book's genre when given
    pub genre: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdate {
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RatingUpdate {
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendQuery {
    pub title: Option<String>,
}

/// Same-genre suggestions for a matched title.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub message: String,
    /// Ranked titles, or a single placeholder when no peers exist
    pub recommendations: Vec<String>,
}

/// The part of a banned book echoed back after a replacement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BannedSummary {
    pub id: String,
    pub title: String,
    pub genre: String,
    pub status: BookStatus,
}

impl From<&Book> for BannedSummary {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id.clone(),
            title: book.title.clone(),
            genre: book.genre.clone(),
            status: book.status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Replacement {
    pub message: String,
    pub banned: BannedSummary,
    pub replacement: Book,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    pub ok: bool,
    pub books_loaded: usize,
    pub pid: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_accepts_available_alias() {
        let status: BookStatus = serde_json::from_str("\"available\"").unwrap();
        assert_eq!(status, BookStatus::Active);
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"active\"");
        assert_eq!("available".parse::<BookStatus>(), Ok(BookStatus::Active));
        assert!("withdrawn".parse::<BookStatus>().is_err());
    }

    #[test]
    fn status_parse_is_exact_like_serde() {
        for spelling in ["Available", "BANNED", "  banned  ", "Active"] {
            assert!(spelling.parse::<BookStatus>().is_err(), "accepted {spelling:?}");
            let quoted = format!("\"{spelling}\"");
            assert!(serde_json::from_str::<BookStatus>(&quoted).is_err());
        }
    }

    #[test]
    fn book_serializes_camel_case() {
        let now = OffsetDateTime::UNIX_EPOCH;
        let book = Book {
            id: "b1".to_string(),
            title: "Dune".to_string(),
            genre: "SciFi".to_string(),
            author: None,
            year: Some(1965),
            rating: None,
            status: BookStatus::Active,
            created_at: now,
            updated_at: now,
        };

        let value = serde_json::to_value(&book).unwrap();
        assert_eq!(value["createdAt"], "1970-01-01T00:00:00Z");
        assert_eq!(value["status"], "active");
        assert!(value["author"].is_null());
    }

    #[test]
    fn patch_touches_only_named_fields() {
        let now = OffsetDateTime::UNIX_EPOCH;
        let mut book = Book {
            id: "b1".to_string(),
            title: "Dune".to_string(),
            genre: "SciFi".to_string(),
            author: Some("Frank Herbert".to_string()),
            year: None,
            rating: Some(2.0),
            status: BookStatus::Active,
            created_at: now,
            updated_at: now,
        };

        let patch = BookPatch::status(BookStatus::Banned);
        book.apply(&patch);

        assert!(book.is_banned());
        assert_eq!(book.rating, Some(2.0));
        assert_eq!(book.updated_at, patch.updated_at);
        assert_eq!(book.created_at, now);
    }
}
