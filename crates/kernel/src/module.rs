use async_trait::async_trait;
use axum::Router;

use crate::settings::Settings;

/// What a module sees while the application boots
pub struct InitCtx<'a> {
    pub settings: &'a Settings,
}

/// Postgres schema step owned by a module.
///
/// Recorded as `"<module>/<id>"` once applied, so an id must never be reused
/// with different SQL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    pub id: &'static str,
    pub up: &'static str,
}

/// A self-contained slice of the service: storage-backed state, HTTP routes,
/// API docs and schema.
#[async_trait]
pub trait Module: Sync + Send {
    fn name(&self) -> &'static str;

    /// Runs after the registry has applied migrations (Postgres backend only)
    /// and before any route is served.
    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Mounted under `server.base_path`
    fn routes(&self) -> Router {
        Router::new()
    }

    /// `paths` and `components.schemas` merged into `/docs/openapi.json`
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    /// Schema this module needs; applied in ascending `id` order
    fn migrations(&self) -> &'static [Migration] {
        &[]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called after the server stops accepting connections
    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
