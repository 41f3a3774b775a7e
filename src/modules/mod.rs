pub mod books;

use std::sync::Arc;

use bookrec_kernel::{settings::Settings, ModuleRegistry};

/// Open storage and register all project-specific modules with the registry
pub async fn register_all(registry: &mut ModuleRegistry, settings: &Settings) -> anyhow::Result<()> {
    let store = books::store::open(settings).await?;
    let service = Arc::new(books::service::CatalogService::new(store));
    registry.register(books::create_module(service));
    Ok(())
}
