use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use tokio::sync::RwLock;

use super::BookStore;
use crate::modules::books::error::StoreError;
use crate::modules::books::models::{Book, BookPatch};

/// Books kept in memory in insertion order and, when a path is set,
/// mirrored to a JSON file that is rewritten in full on every mutation.
pub struct FileBookStore {
    books: RwLock<Vec<Book>>,
    path: Option<PathBuf>,
}

impl FileBookStore {
    /// Store with no backing file; contents are lost on drop.
    pub fn in_memory() -> Self {
        Self {
            books: RwLock::new(Vec::new()),
            path: None,
        }
    }

    /// Load `path` if it exists, otherwise start empty and create it on first write.
    pub async fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref().to_path_buf();

        let books = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Vec::new(),
            Ok(bytes) => serde_json::from_slice::<Vec<Book>>(&bytes)
                .with_context(|| format!("failed to parse {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "book file missing; starting empty");
                Vec::new()
            }
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", path.display()));
            }
        };

        Ok(Self {
            books: RwLock::new(books),
            path: Some(path),
        })
    }

    pub async fn len(&self) -> usize {
        self.books.read().await.len()
    }

    async fn persist(&self, books: &[Book]) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_vec_pretty(books)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, path).await?;

        tracing::debug!(path = %path.display(), books = books.len(), "book file written");
        Ok(())
    }
}

#[async_trait]
impl BookStore for FileBookStore {
    async fn get(&self, id: &str) -> Result<Option<Book>, StoreError> {
        let books = self.books.read().await;
        Ok(books.iter().find(|book| book.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<Book>, StoreError> {
        let books = self.books.read().await;
        let mut listed: Vec<Book> = books.iter().rev().cloned().collect();
        // Stable sort keeps later insertions ahead on equal timestamps.
        listed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(listed)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.len().await)
    }

    async fn insert(&self, book: Book) -> Result<Book, StoreError> {
        let mut books = self.books.write().await;
        if books.iter().any(|existing| existing.id == book.id) {
            return Err(StoreError::DuplicateId(book.id));
        }
        books.push(book.clone());

        if let Err(e) = self.persist(&books).await {
            books.pop();
            return Err(e);
        }
        Ok(book)
    }

    async fn update(&self, id: &str, patch: BookPatch) -> Result<Option<Book>, StoreError> {
        let mut books = self.books.write().await;
        let Some(index) = books.iter().position(|book| book.id == id) else {
            return Ok(None);
        };

        let previous = books[index].clone();
        books[index].apply(&patch);

        if let Err(e) = self.persist(&books).await {
            books[index] = previous;
            return Err(e);
        }
        Ok(Some(books[index].clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::books::models::BookStatus;
    use time::{Duration, OffsetDateTime};

    fn book(id: &str, title: &str, genre: &str, created_at: OffsetDateTime) -> Book {
        Book {
            id: id.to_string(),
            title: title.to_string(),
            genre: genre.to_string(),
            author: None,
            year: None,
            rating: None,
            status: BookStatus::Active,
            created_at,
            updated_at: created_at,
        }
    }

    #[tokio::test]
    async fn list_orders_newest_first_with_insertion_tiebreak() {
        let store = FileBookStore::in_memory();
        let t0 = OffsetDateTime::UNIX_EPOCH;

        store.insert(book("old", "Old", "g", t0)).await.unwrap();
        store.insert(book("tie-a", "A", "g", t0 + Duration::hours(1))).await.unwrap();
        store.insert(book("tie-b", "B", "g", t0 + Duration::hours(1))).await.unwrap();

        let ids: Vec<String> = store.list().await.unwrap().into_iter().map(|b| b.id).collect();
        assert_eq!(ids, vec!["tie-b", "tie-a", "old"]);
        assert_eq!(store.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn update_unknown_id_returns_none() {
        let store = FileBookStore::in_memory();
        let updated = store
            .update("missing", BookPatch::rating(3.0))
            .await
            .unwrap();
        assert!(updated.is_none());
    }

    #[tokio::test]
    async fn find_by_title_ignores_case() {
        let store = FileBookStore::in_memory();
        store
            .insert(book("d", "Dune", "SciFi", OffsetDateTime::UNIX_EPOCH))
            .await
            .unwrap();

        let found = store.find_by_title("dUNE").await.unwrap().unwrap();
        assert_eq!(found.id, "d");
        assert!(store.find_by_title("Dun").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn mutations_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("books.json");

        let store = FileBookStore::open(&path).await.unwrap();
        store
            .insert(book("d", "Dune", "SciFi", OffsetDateTime::UNIX_EPOCH))
            .await
            .unwrap();
        store
            .update("d", BookPatch::status(BookStatus::Banned))
            .await
            .unwrap();
        drop(store);

        let reopened = FileBookStore::open(&path).await.unwrap();
        let dune = reopened.get("d").await.unwrap().unwrap();
        assert!(dune.is_banned());
        assert_eq!(reopened.len().await, 1);
    }

    #[tokio::test]
    async fn reads_legacy_available_status() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("books.json");
        tokio::fs::write(
            &path,
            r#"[{"id":"x","title":"Emma","genre":"Classic","status":"available",
                 "createdAt":"2024-01-01T00:00:00Z","updatedAt":"2024-01-01T00:00:00Z"}]"#,
        )
        .await
        .unwrap();

        let store = FileBookStore::open(&path).await.unwrap();
        let emma = store.get("x").await.unwrap().unwrap();
        assert_eq!(emma.status, BookStatus::Active);
        assert_eq!(emma.rating, None);
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_id() {
        let store = FileBookStore::in_memory();
        let t0 = OffsetDateTime::UNIX_EPOCH;
        store.insert(book("d", "Dune", "SciFi", t0)).await.unwrap();

        let err = store
            .insert(book("d", "Dune Messiah", "SciFi", t0))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateId(ref id) if id == "d"));
        assert_eq!(store.count().await.unwrap(), 1);
        assert_eq!(store.get("d").await.unwrap().unwrap().title, "Dune");
    }

    #[tokio::test]
    async fn failed_write_rolls_back_memory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("books.json");
        let store = FileBookStore::open(&path).await.unwrap();
        store
            .insert(book("d", "Dune", "SciFi", OffsetDateTime::UNIX_EPOCH))
            .await
            .unwrap();

        // A directory where the temp file goes makes every later write fail.
        tokio::fs::create_dir(path.with_extension("json.tmp")).await.unwrap();

        let err = store
            .insert(book("e", "Emma", "Classic", OffsetDateTime::UNIX_EPOCH))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
        assert_eq!(store.count().await.unwrap(), 1);
        assert!(store.get("e").await.unwrap().is_none());

        let err = store
            .update("d", BookPatch::status(BookStatus::Banned))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
        assert!(!store.get("d").await.unwrap().unwrap().is_banned());

        drop(store);
        let reopened = FileBookStore::open(&path).await.unwrap();
        assert_eq!(reopened.len().await, 1);
    }

    #[tokio::test]
    async fn corrupt_file_fails_to_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("books.json");
        tokio::fs::write(&path, "not json").await.unwrap();

        assert!(FileBookStore::open(&path).await.is_err());
    }
}
