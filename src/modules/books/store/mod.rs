//! Book persistence behind a single contract, with file and Postgres backends.

mod file;
mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use bookrec_kernel::settings::{Settings, StorageBackend};

pub use file::FileBookStore;
pub use postgres::PgBookStore;

use super::error::StoreError;
use super::models::{Book, BookPatch};

/// Storage contract the catalog runs against.
///
/// `list` is ordered by `created_at` descending; equal timestamps put the
/// most recently inserted book first. Writes are durable before returning.
#[async_trait]
pub trait BookStore: Send + Sync {
    async fn get(&self, id: &str) -> Result<Option<Book>, StoreError>;

    async fn list(&self) -> Result<Vec<Book>, StoreError>;

    async fn insert(&self, book: Book) -> Result<Book, StoreError>;

    /// `None` when no book has this id.
    async fn update(&self, id: &str, patch: BookPatch) -> Result<Option<Book>, StoreError>;

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.list().await?.len())
    }

    /// Case-insensitive exact title match; the newest book wins on duplicates.
    async fn find_by_title(&self, title: &str) -> Result<Option<Book>, StoreError> {
        let wanted = title.to_lowercase();
        Ok(self
            .list()
            .await?
            .into_iter()
            .find(|book| book.title.to_lowercase() == wanted))
    }

    /// Books whose genre equals `genre` exactly, in `list` order.
    async fn list_by_genre(&self, genre: &str) -> Result<Vec<Book>, StoreError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|book| book.genre == genre)
            .collect())
    }
}

/// Open the backend selected by `storage.backend`.
///
/// The Postgres backend only connects; its schema comes from the registry's
/// migrations, applied before the module is initialized.
pub async fn open(settings: &Settings) -> anyhow::Result<Arc<dyn BookStore>> {
    match settings.storage.backend {
        StorageBackend::Memory => {
            tracing::info!(backend = "memory", "book store ready");
            Ok(Arc::new(FileBookStore::in_memory()))
        }
        StorageBackend::File => {
            let store = FileBookStore::open(&settings.storage.file_path).await?;
            tracing::info!(
                backend = "file",
                path = %settings.storage.file_path.display(),
                books = store.len().await,
                "book store ready"
            );
            Ok(Arc::new(store))
        }
        StorageBackend::Postgres => {
            let pool = bookrec_db::connect(&settings.database).await?;
            tracing::info!(backend = "postgres", "book store ready");
            Ok(Arc::new(PgBookStore::new(pool)))
        }
    }
}
