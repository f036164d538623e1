//! Cache entries kept in Postgres, shared by every process using the database.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgPool;
use sqlx::types::Json;
use time::OffsetDateTime;

use crate::cache::{KvStore, StoreError};

use super::map_store_error;

#[derive(Clone)]
pub struct PostgresKvStore {
    pool: Arc<PgPool>,
}

impl PostgresKvStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Expiry of a live entry.
    pub async fn expires_at(&self, key: &str) -> Result<Option<OffsetDateTime>, StoreError> {
        sqlx::query_scalar::<_, OffsetDateTime>(
            "SELECT expires_at FROM cache_entries WHERE key = $1 AND expires_at > now()",
        )
        .bind(key)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(map_store_error)
    }

    /// Delete expired rows, returning how many were removed.
    pub async fn purge_expired(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM cache_entries WHERE expires_at <= now()")
            .execute(self.pool.as_ref())
            .await
            .map_err(map_store_error)?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl KvStore for PostgresKvStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let value = sqlx::query_scalar::<_, Json<Value>>(
            "SELECT value FROM cache_entries WHERE key = $1 AND expires_at > now()",
        )
        .bind(key)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(map_store_error)?;
        Ok(value.map(|json| json.0))
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO cache_entries (key, value, expires_at)
            VALUES ($1, $2, now() + make_interval(secs => $3))
            ON CONFLICT (key) DO UPDATE
                SET value = EXCLUDED.value,
                    expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(key)
        .bind(Json(value))
        .bind(ttl.as_secs_f64())
        .execute(self.pool.as_ref())
        .await
        .map_err(map_store_error)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM cache_entries WHERE key = $1")
            .bind(key)
            .execute(self.pool.as_ref())
            .await
            .map_err(map_store_error)?;
        Ok(())
    }
}
