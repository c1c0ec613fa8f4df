use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use super::StoreError;
use crate::auth;
use crate::config::SecurityConfig;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, StoreError> {
    let user = sqlx::query_as::<_, User>(r#"SELECT * FROM "users" WHERE email = $1"#)
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, StoreError> {
    let user = sqlx::query_as::<_, User>(r#"SELECT * FROM "users" WHERE id = $1"#)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

/// Seed the admin principal from environment-supplied credentials: insert if
/// absent, or overwrite the password when the force-update flag is set.
pub async fn seed_admin(pool: &PgPool, security: &SecurityConfig) -> Result<(), StoreError> {
    let (email, password) = match (&security.admin_email, &security.admin_password) {
        (Some(email), Some(password)) => (email, password),
        _ => return Ok(()),
    };

    let password_hash = auth::hash_password(password)
        .map_err(StoreError::Internal)?;

    let rows = if security.admin_force_update {
        sqlx::query(
            r#"INSERT INTO "users" (email, password_hash, role)
               VALUES ($1, $2, 'admin')
               ON CONFLICT (email)
               DO UPDATE SET password_hash = EXCLUDED.password_hash, updated_at = now()"#,
        )
        .bind(email)
        .bind(&password_hash)
        .execute(pool)
        .await?
        .rows_affected()
    } else {
        sqlx::query(
            r#"INSERT INTO "users" (email, password_hash, role)
               VALUES ($1, $2, 'admin')
               ON CONFLICT (email) DO NOTHING"#,
        )
        .bind(email)
        .bind(&password_hash)
        .execute(pool)
        .await?
        .rows_affected()
    };

    if rows > 0 {
        info!("admin principal seeded: {}", email);
    }
    Ok(())
}
