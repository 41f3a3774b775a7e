//! Postgres connection factory and migration runner.

use std::collections::HashSet;

use anyhow::Context;
use bookrec_kernel::{settings::DatabaseSettings, Migration};
use sqlx::postgres::{PgPool, PgPoolOptions};

const MIGRATIONS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS _migrations (
        id SERIAL PRIMARY KEY,
        filename TEXT UNIQUE NOT NULL,
        applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
"#;

/// Open a connection pool against the configured database.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<PgPool> {
    tracing::info!(
        target: "bookrec-db",
        max_connections = settings.max_connections,
        "connecting to postgres"
    );

    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(&settings.url)
        .await
        .context("failed to connect to postgres")?;

    tracing::info!(target: "bookrec-db", "postgres pool ready");
    Ok(pool)
}

/// Key under which a module migration is recorded in `_migrations`.
pub fn migration_key(module: &str, migration: &Migration) -> String {
    format!("{}/{}", module, migration.id)
}

/// Migrations not yet recorded as applied, in the order given.
pub fn pending<'a>(
    migrations: &'a [(String, Migration)],
    applied: &HashSet<String>,
) -> Vec<&'a (String, Migration)> {
    migrations
        .iter()
        .filter(|(module, migration)| !applied.contains(&migration_key(module, migration)))
        .collect()
}

/// Apply every pending migration, each inside its own transaction.
///
/// Returns the number of migrations applied.
pub async fn run_migrations(
    pool: &PgPool,
    migrations: &[(String, Migration)],
) -> anyhow::Result<usize> {
    sqlx::query(MIGRATIONS_TABLE)
        .execute(pool)
        .await
        .context("failed to create migrations table")?;

    let applied: HashSet<String> = sqlx::query_scalar::<_, String>("SELECT filename FROM _migrations")
        .fetch_all(pool)
        .await
        .context("failed to read applied migrations")?
        .into_iter()
        .collect();

    let todo = pending(migrations, &applied);
    if todo.is_empty() {
        tracing::info!(target: "bookrec-db", "migrations up to date");
        return Ok(0);
    }

    for (module, migration) in &todo {
        let key = migration_key(module, migration);
        tracing::info!(target: "bookrec-db", migration = %key, "applying migration");

        let mut tx = pool.begin().await.context("failed to open transaction")?;
        sqlx::raw_sql(migration.up)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("migration '{}' failed", key))?;
        sqlx::query("INSERT INTO _migrations (filename) VALUES ($1)")
            .bind(&key)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("failed to record migration '{}'", key))?;
        tx.commit()
            .await
            .with_context(|| format!("failed to commit migration '{}'", key))?;
    }

    Ok(todo.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn migration(id: &'static str) -> Migration {
        Migration { id, up: "SELECT 1;" }
    }

    #[test]
    fn pending_skips_applied_keys() {
        let migrations = vec![
            ("books".to_string(), migration("001_create_books")),
            ("books".to_string(), migration("002_title_index")),
        ];
        let applied: HashSet<String> = ["books/001_create_books".to_string()].into();

        let todo = pending(&migrations, &applied);
        assert_eq!(todo.len(), 1);
        assert_eq!(todo[0].1.id, "002_title_index");
    }

    #[test]
    fn migration_key_is_module_scoped() {
        assert_eq!(
            migration_key("books", &migration("001_create_books")),
            "books/001_create_books"
        );
    }
}
