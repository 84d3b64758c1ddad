//! Complaint ingest workflow
//!
//! The upload path: detect issues in the media, refuse duplicates, then
//! create `Ticket → SubTicket → Media` rows and announce the detection on
//! the live bus. One fresh ticket per accepted file; sub-tickets are created
//! per detected issue and assigned round-robin within the owning department.
//!
//! Business rejections (nothing detected, duplicate evidence) are data, not
//! errors: a batch always succeeds as a whole and reports per-item outcomes.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use shared::types::MediaType;

use super::dedup::{self, DedupConfig};
use super::detection_bus::{DetectionBus, DetectionEvent};
use super::detector::{Detector, best_per_issue};
use super::geocode::GeocodeService;
use crate::db::models::{MediaCreate, SubTicketCreate, TicketCreate, TicketRecord};
use crate::db::repository::{MediaRepository, SubTicketRepository, TicketRepository, UserRepository};
use crate::triage::department_for;
use crate::utils::{AppError, AppResult};

/// One issue accepted from an uploaded file
#[derive(Debug, Clone, Serialize)]
pub struct AcceptedIssue {
    pub sub_id: String,
    pub issue_type: String,
    pub confidence: f64,
    pub images: Vec<i64>,
}

/// Outcome for one uploaded file
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum IngestOutcome {
    Accepted {
        ticket_id: String,
        area: Option<String>,
        district: Option<String>,
        sub_tickets: Vec<AcceptedIssue>,
    },
    Rejected(RejectedItem),
}

/// A refused upload item with its citizen-facing reason
#[derive(Debug, Clone, Serialize)]
pub struct RejectedItem {
    pub file_name: String,
    pub reason: String,
}

#[derive(Clone)]
pub struct IngestService {
    db: Surreal<Db>,
    geocode: GeocodeService,
    detector: Arc<dyn Detector>,
    bus: DetectionBus,
    media_dir: PathBuf,
    dedup: DedupConfig,
}

impl IngestService {
    pub fn new(
        db: Surreal<Db>,
        geocode: GeocodeService,
        detector: Arc<dyn Detector>,
        bus: DetectionBus,
        media_dir: PathBuf,
        dedup: DedupConfig,
    ) -> Self {
        Self {
            db,
            geocode,
            detector,
            bus,
            media_dir,
            dedup,
        }
    }

    /// Process one uploaded file end to end.
    pub async fn process_file(
        &self,
        bytes: &[u8],
        content_type: &str,
        file_name: &str,
        latitude: Option<f64>,
        longitude: Option<f64>,
        user: Option<(i64, String)>,
    ) -> AppResult<IngestOutcome> {
        let media_type = MediaType::from_content_type(content_type);

        // 1. External detection. An unreachable detector rejects the item
        // rather than failing the whole batch.
        let detections = match self.detector.detect(bytes, content_type).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(file = %file_name, error = %e, "Detection failed");
                Vec::new()
            }
        };
        let issues = best_per_issue(&detections);
        if issues.is_empty() {
            return Ok(IngestOutcome::Rejected(RejectedItem {
                file_name: file_name.to_string(),
                reason: "No recognizable civic issue detected".to_string(),
            }));
        }

        // 2. Duplicate check (images only; every detected issue must be new)
        let media_repo = MediaRepository::new(self.db.clone());
        let hash = (media_type == MediaType::Image).then(|| dedup::image_hash(bytes));
        if let Some(hash) = &hash {
            for (issue_type, _) in &issues {
                let candidates = media_repo
                    .find_dedup_candidates(issue_type)
                    .await
                    .map_err(AppError::from)?;
                if let Some((reason, _existing)) =
                    dedup::check_duplicate(hash, latitude, longitude, &candidates, &self.dedup)
                {
                    return Ok(IngestOutcome::Rejected(RejectedItem {
                        file_name: file_name.to_string(),
                        reason: reason.message().to_string(),
                    }));
                }
            }
        }

        // 3. Fresh ticket for this submission, geocoded when located
        let geo = match (latitude, longitude) {
            (Some(lat), Some(lon)) => Some(self.geocode.reverse(lat, lon).await),
            _ => None,
        };
        let (user_id, user_name) = match user {
            Some((id, name)) => (Some(id), name),
            None => (None, "Anonymous".to_string()),
        };

        let ticket_repo = TicketRepository::new(self.db.clone());
        let ticket = ticket_repo
            .create(TicketCreate {
                user_id,
                user_name,
                latitude,
                longitude,
                address: geo.as_ref().map(|g| g.address.clone()),
                area: geo.as_ref().map(|g| g.area.clone()),
                district: geo.as_ref().map(|g| g.district.clone()),
            })
            .await
            .map_err(AppError::from)?;

        // 4. Sub-ticket + media row per detected issue
        let stored_name = store_file_name(file_name);
        tokio::fs::write(self.media_dir.join(&stored_name), bytes)
            .await
            .map_err(|e| AppError::internal(format!("Failed to store media: {}", e)))?;

        let mut accepted = Vec::new();
        for (issue_type, confidence) in &issues {
            let sub = self
                .create_or_reuse_sub_ticket(&ticket, issue_type)
                .await?;

            let media = media_repo
                .create(MediaCreate {
                    sub_id: sub.sub_id.clone(),
                    file_name: stored_name.clone(),
                    content_type: content_type.to_string(),
                    media_type,
                    image_hash: hash.clone(),
                    latitude,
                    longitude,
                    confidence: Some(*confidence),
                    gps_extracted: latitude.is_some() && longitude.is_some(),
                    is_proof: false,
                })
                .await
                .map_err(AppError::from)?;

            self.bus.publish(DetectionEvent::detection(
                format!("{} detected ({:.0}%)", issue_type, confidence * 100.0),
                Some(stored_name.clone()),
            ));

            accepted.push(AcceptedIssue {
                sub_id: sub.sub_id,
                issue_type: issue_type.clone(),
                confidence: *confidence,
                images: vec![media.media_id],
            });
        }

        tracing::info!(
            ticket_id = %ticket.ticket_id,
            issues = accepted.len(),
            "Complaint registered"
        );

        Ok(IngestOutcome::Accepted {
            ticket_id: ticket.ticket_id,
            area: ticket.area,
            district: ticket.district,
            sub_tickets: accepted,
        })
    }

    /// Reuse a same-issue sub-ticket on this ticket, or create one with a
    /// round-robin inspector assignment.
    async fn create_or_reuse_sub_ticket(
        &self,
        ticket: &TicketRecord,
        issue_type: &str,
    ) -> AppResult<crate::db::models::SubTicketRecord> {
        let sub_repo = SubTicketRepository::new(self.db.clone());

        if let Some(existing) = sub_repo
            .find_by_ticket_and_type(&ticket.ticket_id, issue_type)
            .await
            .map_err(AppError::from)?
        {
            return Ok(existing);
        }

        let department = department_for(issue_type);
        let assigned_to = self
            .pick_inspector(&ticket.ticket_id, department.as_str())
            .await?;

        sub_repo
            .create(SubTicketCreate {
                ticket_id: ticket.ticket_id.clone(),
                issue_type: issue_type.to_string(),
                authority: department.as_str().to_string(),
                assigned_to,
            })
            .await
            .map_err(AppError::from)
    }

    /// Round-robin assignment within a department. An existing assignment on
    /// the same ticket is reused so one submission stays with one inspector.
    async fn pick_inspector(&self, ticket_id: &str, authority: &str) -> AppResult<Option<i64>> {
        let department = match authority.parse::<shared::types::Department>() {
            Ok(dept) if shared::types::Department::assignable().contains(&dept) => dept,
            _ => return Ok(None),
        };

        let sub_repo = SubTicketRepository::new(self.db.clone());
        if let Some(existing) = sub_repo
            .find_assignment_for_department(ticket_id, authority)
            .await
            .map_err(AppError::from)?
        {
            return Ok(Some(existing));
        }

        let user_repo = UserRepository::new(self.db.clone());
        let inspectors = user_repo
            .find_inspectors(department)
            .await
            .map_err(AppError::from)?;
        if inspectors.is_empty() {
            return Ok(None);
        }

        let last = sub_repo
            .last_assigned_inspector(authority)
            .await
            .map_err(AppError::from)?;

        let next = match last.and_then(|id| inspectors.iter().position(|i| i.user_id == id)) {
            Some(index) => inspectors[(index + 1) % inspectors.len()].user_id,
            None => inspectors[0].user_id,
        };
        Ok(Some(next))
    }

    /// Store a resolution-proof upload against a sub-ticket.
    pub async fn store_proof(
        &self,
        sub_id: &str,
        bytes: &[u8],
        content_type: &str,
        file_name: &str,
    ) -> AppResult<i64> {
        let stored_name = store_file_name(file_name);
        tokio::fs::write(self.media_dir.join(&stored_name), bytes)
            .await
            .map_err(|e| AppError::internal(format!("Failed to store proof: {}", e)))?;

        let media = MediaRepository::new(self.db.clone())
            .create(MediaCreate {
                sub_id: sub_id.to_string(),
                file_name: stored_name,
                content_type: content_type.to_string(),
                media_type: MediaType::from_content_type(content_type),
                image_hash: None,
                latitude: None,
                longitude: None,
                confidence: None,
                gps_extracted: false,
                is_proof: true,
            })
            .await
            .map_err(AppError::from)?;
        Ok(media.media_id)
    }

    pub fn media_dir(&self) -> &PathBuf {
        &self.media_dir
    }
}

/// Collision-free on-disk name, keeping the original extension
fn store_file_name(original: &str) -> String {
    let ext = std::path::Path::new(original)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("bin");
    format!("{}.{}", uuid::Uuid::new_v4().simple(), ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_file_name_keeps_extension() {
        let name = store_file_name("road photo.JPG");
        assert!(name.ends_with(".JPG"));
        assert_ne!(store_file_name("a.jpg"), store_file_name("a.jpg"));
    }

    #[test]
    fn test_store_file_name_without_extension() {
        assert!(store_file_name("upload").ends_with(".bin"));
    }
}
