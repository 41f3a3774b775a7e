pub mod error;
pub mod models;
mod openapi;
pub mod routes;
pub mod service;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookrec_kernel::{InitCtx, Migration, Module};

use service::CatalogService;

pub const MODULE_NAME: &str = "books";

/// Postgres schema for the relational Book Store.
pub const MIGRATIONS: &[Migration] = &[Migration {
    id: "001_create_books",
    up: r#"
        CREATE TABLE IF NOT EXISTS books (
            seq        BIGSERIAL,
            id         TEXT PRIMARY KEY,
            title      TEXT NOT NULL CHECK (title <> ''),
            genre      TEXT NOT NULL CHECK (genre <> ''),
            author     TEXT,
            year       INT CHECK (year BETWEEN 1000 AND 9999),
            rating     DOUBLE PRECISION CHECK (rating >= 0 AND rating <= 5),
            status     TEXT NOT NULL DEFAULT 'active' CHECK (status IN ('active', 'banned')),
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        );
        CREATE INDEX IF NOT EXISTS idx_books_title ON books (title);
        CREATE INDEX IF NOT EXISTS idx_books_title_lower ON books (lower(title));
        CREATE INDEX IF NOT EXISTS idx_books_genre ON books (genre);
        "#,
}];

/// The books catalog: store-backed service plus its HTTP surface
pub struct BooksModule {
    service: Arc<CatalogService>,
}

impl BooksModule {
    pub fn new(service: Arc<CatalogService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        MODULE_NAME
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let books = self.service.count().await?;
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            backend = ?ctx.settings.storage.backend,
            books,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.service.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi::fragment())
    }

    fn migrations(&self) -> &'static [Migration] {
        MIGRATIONS
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

pub fn create_module(service: Arc<CatalogService>) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(service))
}
