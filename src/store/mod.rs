use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::AppConfig;
use crate::resource::catalog;

pub mod content;
pub mod users;

pub use content::{ContentRecord, ContentStore, ListQuery};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Open the process-wide pool. Called once at startup; the pool is shared by
/// reference through AppState and torn down at process exit.
pub async fn connect(config: &AppConfig) -> Result<PgPool, StoreError> {
    let url = std::env::var("DATABASE_URL")
        .map_err(|_| StoreError::Connection("DATABASE_URL is not set".to_string()))?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(config.database.connection_timeout_secs))
        .connect(&url)
        .await?;

    info!("database pool established");
    Ok(pool)
}

/// Idempotent DDL for every catalog resource plus the users table.
pub async fn migrate(pool: &PgPool) -> Result<(), StoreError> {
    for resource in catalog::RESOURCES {
        let table_ddl = format!(
            r#"CREATE TABLE IF NOT EXISTS "{table}" (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                doc JSONB NOT NULL DEFAULT '{{}}'::jsonb,
                is_active BOOLEAN NOT NULL DEFAULT TRUE,
                position INTEGER NOT NULL DEFAULT 0,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )"#,
            table = resource.table
        );
        sqlx::query(&table_ddl).execute(pool).await?;

        let index_ddl = format!(
            r#"CREATE INDEX IF NOT EXISTS "{table}_active_position_idx"
               ON "{table}" (is_active, position, created_at DESC)"#,
            table = resource.table
        );
        sqlx::query(&index_ddl).execute(pool).await?;
    }

    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS "users" (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'admin',
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )"#,
    )
    .execute(pool)
    .await?;

    info!("schema migration complete");
    Ok(())
}

/// Pings the pool; used by the liveness endpoint.
pub async fn health_check(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
