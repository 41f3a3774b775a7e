//! bookrec application library
//!
//! The books catalog module plus the bootstrap that wires settings,
//! storage, modules and the HTTP server together.

pub mod modules;
pub mod utils;

use anyhow::Context;
use bookrec_kernel::{
    settings::{Settings, StorageBackend},
    InitCtx, ModuleRegistry,
};

pub use modules::books;

/// Build a registry with every project module registered on top of the
/// configured storage backend.
pub async fn build_registry(settings: &Settings) -> anyhow::Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, settings)
        .await
        .context("failed to register modules")?;
    Ok(registry)
}

/// Run the service until shutdown.
pub async fn serve(settings: Settings) -> anyhow::Result<()> {
    tracing::info!(
        env = ?settings.environment,
        backend = ?settings.storage.backend,
        "bookrec bootstrap starting"
    );

    let registry = build_registry(&settings).await?;
    if settings.storage.backend == StorageBackend::Postgres {
        let applied = apply_migrations(&registry, &settings).await?;
        tracing::info!(applied, "migrations applied");
    }

    let ctx = InitCtx {
        settings: &settings,
    };

    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;
    tracing::info!(modules = registry.module_count(), "bookrec bootstrap complete");

    let served = bookrec_http::start_server(&registry, &settings).await;
    let stopped = registry.stop_modules().await;

    served?;
    stopped
}

/// Apply the registered modules' pending migrations to `database.url` and
/// return how many ran.
pub async fn apply_migrations(registry: &ModuleRegistry, settings: &Settings) -> anyhow::Result<usize> {
    let migrations = registry.collect_migrations();
    let pool = bookrec_db::connect(&settings.database).await?;
    let applied = bookrec_db::run_migrations(&pool, &migrations).await;
    pool.close().await;
    applied
}

/// Entry point of `bookrec-cli migrate`.
pub async fn migrate(settings: &Settings) -> anyhow::Result<usize> {
    let registry = build_registry(settings).await?;
    apply_migrations(&registry, settings).await
}
