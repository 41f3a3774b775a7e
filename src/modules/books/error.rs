use bookrec_http::AppError;
use thiserror::Error;

/// Failure of the backing medium. Opaque to the catalog rules.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("book file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("book file is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("a book with id '{0}' already exists")]
    DuplicateId(String),

    #[error("corrupt row for book '{id}': {reason}")]
    CorruptRow { id: String, reason: String },
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidState(String),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl CatalogError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Validation { field, message } => AppError::invalid_field(field, message),
            CatalogError::NotFound(message) => AppError::not_found(message),
            CatalogError::InvalidState(message) => AppError::invalid_state(message),
            CatalogError::Storage(e) => AppError::Internal(anyhow::Error::new(e)),
        }
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;
