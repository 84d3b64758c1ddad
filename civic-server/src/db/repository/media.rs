//! Media Repository

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{MediaCreate, MediaRecord};
use crate::db::next_numeric_id;
use crate::utils::time::now_millis;

#[derive(Clone)]
pub struct MediaRepository {
    base: BaseRepository,
}

impl MediaRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_id(&self, media_id: i64) -> RepoResult<Option<MediaRecord>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM media WHERE media_id = $media_id LIMIT 1")
            .bind(("media_id", media_id))
            .await?;
        let media: Vec<MediaRecord> = result.take(0)?;
        Ok(media.into_iter().next())
    }

    /// Citizen evidence for one sub-ticket, upload order
    pub async fn find_by_sub(&self, sub_id: &str) -> RepoResult<Vec<MediaRecord>> {
        let mut result = self
            .base
            .db()
            .query(
                r#"SELECT * FROM media
                    WHERE sub_id = $sub_id
                    AND is_proof = false
                ORDER BY created_at"#,
            )
            .bind(("sub_id", sub_id.to_string()))
            .await?;
        let media: Vec<MediaRecord> = result.take(0)?;
        Ok(media)
    }

    /// Dedup candidates: hashed evidence belonging to sub-tickets of one
    /// issue type. The issue-type restriction keeps the candidate set small
    /// and matches the rule "different issue at the same spot is allowed".
    pub async fn find_dedup_candidates(&self, issue_type: &str) -> RepoResult<Vec<MediaRecord>> {
        let mut result = self
            .base
            .db()
            .query(
                r#"LET $subs = (SELECT VALUE sub_id FROM sub_ticket WHERE issue_type = $issue_type);
                SELECT * FROM media
                    WHERE sub_id IN $subs
                    AND image_hash != NONE
                    AND is_proof = false"#,
            )
            .bind(("issue_type", issue_type.to_string()))
            .await?;
        let media: Vec<MediaRecord> = result.take(1)?;
        Ok(media)
    }

    pub async fn create(&self, data: MediaCreate) -> RepoResult<MediaRecord> {
        let record = MediaRecord {
            media_id: next_numeric_id(),
            sub_id: data.sub_id,
            file_name: data.file_name,
            content_type: data.content_type,
            media_type: data.media_type,
            image_hash: data.image_hash,
            latitude: data.latitude,
            longitude: data.longitude,
            confidence: data.confidence,
            gps_extracted: data.gps_extracted,
            is_proof: data.is_proof,
            created_at: now_millis(),
        };

        let mut result = self
            .base
            .db()
            .query("CREATE media CONTENT $data RETURN AFTER")
            .bind(("data", record))
            .await?;

        let created: Option<MediaRecord> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create media record".to_string()))
    }

    /// Remove all media rows under a ticket's sub-tickets; returns the file
    /// names so the caller can clean the media directory.
    pub async fn delete_by_ticket(&self, ticket_id: &str) -> RepoResult<Vec<String>> {
        let mut result = self
            .base
            .db()
            .query(
                r#"LET $subs = (SELECT VALUE sub_id FROM sub_ticket WHERE ticket_id = $ticket_id);
                SELECT VALUE file_name FROM media WHERE sub_id IN $subs;
                DELETE FROM media WHERE sub_id IN $subs;"#,
            )
            .bind(("ticket_id", ticket_id.to_string()))
            .await?;
        let files: Vec<String> = result.take(1)?;
        Ok(files)
    }
}
