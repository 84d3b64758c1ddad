//! Watermark Repository
//!
//! Typed accessor over the per-admin notification markers. Reads return a
//! zeroed record for admins who have never stored one.

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::WatermarkRecord;

#[derive(Clone)]
pub struct WatermarkRepository {
    base: BaseRepository,
}

impl WatermarkRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn get(&self, admin_id: i64) -> RepoResult<WatermarkRecord> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM watermark WHERE admin_id = $admin_id LIMIT 1")
            .bind(("admin_id", admin_id))
            .await?;
        let marks: Vec<WatermarkRecord> = result.take(0)?;
        Ok(marks
            .into_iter()
            .next()
            .unwrap_or_else(|| WatermarkRecord::empty(admin_id)))
    }

    pub async fn put(&self, record: WatermarkRecord) -> RepoResult<WatermarkRecord> {
        let mut result = self
            .base
            .db()
            .query(
                r#"DELETE FROM watermark WHERE admin_id = $admin_id;
                CREATE watermark CONTENT $data RETURN AFTER"#,
            )
            .bind(("admin_id", record.admin_id))
            .bind(("data", record))
            .await?;

        let saved: Option<WatermarkRecord> = result.take(1)?;
        saved.ok_or_else(|| RepoError::Database("Failed to store watermark".to_string()))
    }
}
