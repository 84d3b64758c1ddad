//! Database Module
//!
//! Embedded SurrealDB storage. Repositories own all query text; handlers
//! never build queries themselves. Timestamps are `i64` Unix millis
//! throughout this layer.

pub mod models;
pub mod repository;

use std::sync::atomic::{AtomicI64, Ordering};

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, RocksDb};

use crate::utils::AppError;

/// Database service - owns the embedded connection
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the embedded database and define the schema
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        let db = Surreal::new::<RocksDb>(db_path)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {}", e)))?;

        db.use_ns("civic")
            .use_db("grid")
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {}", e)))?;

        define_schema(&db).await?;

        tracing::info!("Database ready at {}", db_path);
        Ok(Self { db })
    }
}

/// Table and index definitions, idempotent on restart
async fn define_schema(db: &Surreal<Db>) -> Result<(), AppError> {
    db.query(
        r#"
        DEFINE TABLE IF NOT EXISTS user SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS user_email ON user FIELDS email UNIQUE;
        DEFINE INDEX IF NOT EXISTS user_numeric ON user FIELDS user_id UNIQUE;

        DEFINE TABLE IF NOT EXISTS ticket SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS ticket_tid ON ticket FIELDS ticket_id UNIQUE;

        DEFINE TABLE IF NOT EXISTS sub_ticket SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS sub_sid ON sub_ticket FIELDS sub_id UNIQUE;
        DEFINE INDEX IF NOT EXISTS sub_parent ON sub_ticket FIELDS ticket_id;

        DEFINE TABLE IF NOT EXISTS media SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS media_mid ON media FIELDS media_id UNIQUE;
        DEFINE INDEX IF NOT EXISTS media_sub ON media FIELDS sub_id;

        DEFINE TABLE IF NOT EXISTS watermark SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS watermark_admin ON watermark FIELDS admin_id UNIQUE;
        "#,
    )
    .await
    .map_err(|e| AppError::database(format!("Failed to define schema: {}", e)))?;
    Ok(())
}

// Monotonic numeric id: millisecond timestamp shifted left 12 bits plus a
// wrapping in-process counter. Time-based, so ids stay increasing across
// restarts, which the dashboard notification watermarks rely on.
static ID_COUNTER: AtomicI64 = AtomicI64::new(0);

/// Next globally-increasing numeric id
pub fn next_numeric_id() -> i64 {
    let millis = chrono::Utc::now().timestamp_millis();
    let seq = ID_COUNTER.fetch_add(1, Ordering::Relaxed) & 0xFFF;
    (millis << 12) | seq
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_ids_increase() {
        let a = next_numeric_id();
        let b = next_numeric_id();
        assert!(b > a);
    }
}
