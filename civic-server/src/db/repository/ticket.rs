//! Ticket Repository

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{TicketCreate, TicketRecord};
use crate::utils::time::now_millis;
use shared::types::IssueStatus;

#[derive(Clone)]
pub struct TicketRepository {
    base: BaseRepository,
}

impl TicketRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All tickets, optionally restricted by status and/or submitting user
    pub async fn find_all(
        &self,
        status: Option<IssueStatus>,
        user_id: Option<i64>,
    ) -> RepoResult<Vec<TicketRecord>> {
        let mut result = self
            .base
            .db()
            .query(
                r#"SELECT * FROM ticket
                    WHERE ($has_status = false OR status = $status)
                    AND ($has_user = false OR user_id = $user_id)
                ORDER BY created_at DESC"#,
            )
            .bind(("has_status", status.is_some()))
            .bind(("status", status))
            .bind(("has_user", user_id.is_some()))
            .bind(("user_id", user_id))
            .await?;
        let tickets: Vec<TicketRecord> = result.take(0)?;
        Ok(tickets)
    }

    pub async fn find_by_ticket_id(&self, ticket_id: &str) -> RepoResult<Option<TicketRecord>> {
        let tid = ticket_id.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM ticket WHERE ticket_id = $ticket_id LIMIT 1")
            .bind(("ticket_id", tid))
            .await?;
        let tickets: Vec<TicketRecord> = result.take(0)?;
        Ok(tickets.into_iter().next())
    }

    /// Create a fresh ticket (one per submission, ids never reused)
    pub async fn create(&self, data: TicketCreate) -> RepoResult<TicketRecord> {
        let record = TicketRecord {
            ticket_id: TicketCreate::new_ticket_id(),
            user_id: data.user_id,
            user_name: data.user_name,
            latitude: data.latitude,
            longitude: data.longitude,
            address: data.address,
            area: data.area,
            district: data.district,
            status: IssueStatus::Open,
            created_at: now_millis(),
            updated_at: None,
            resolved_at: None,
        };

        let mut result = self
            .base
            .db()
            .query("CREATE ticket CONTENT $data RETURN AFTER")
            .bind(("data", record))
            .await?;

        let created: Option<TicketRecord> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create ticket".to_string()))
    }

    /// Update coordinates and re-geocoded area/district
    pub async fn update_location(
        &self,
        ticket_id: &str,
        latitude: f64,
        longitude: f64,
        area: Option<String>,
        district: Option<String>,
        address: Option<String>,
    ) -> RepoResult<TicketRecord> {
        let tid = ticket_id.to_string();
        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE ticket SET
                    latitude = $latitude,
                    longitude = $longitude,
                    area = $area,
                    district = $district,
                    address = $address,
                    updated_at = $updated_at
                WHERE ticket_id = $ticket_id
                RETURN AFTER"#,
            )
            .bind(("ticket_id", tid.clone()))
            .bind(("latitude", latitude))
            .bind(("longitude", longitude))
            .bind(("area", area))
            .bind(("district", district))
            .bind(("address", address))
            .bind(("updated_at", now_millis()))
            .await?;

        result
            .take::<Vec<TicketRecord>>(0)?
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Ticket {} not found", tid)))
    }

    /// Update the parent ticket's status; stamps `resolved_at` when the new
    /// status is settled and clears it otherwise.
    pub async fn update_status(
        &self,
        ticket_id: &str,
        status: IssueStatus,
    ) -> RepoResult<TicketRecord> {
        let tid = ticket_id.to_string();
        let resolved_at = status.is_settled().then(now_millis);
        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE ticket SET
                    status = $status,
                    resolved_at = $resolved_at,
                    updated_at = $updated_at
                WHERE ticket_id = $ticket_id
                RETURN AFTER"#,
            )
            .bind(("ticket_id", tid.clone()))
            .bind(("status", status))
            .bind(("resolved_at", resolved_at))
            .bind(("updated_at", now_millis()))
            .await?;

        result
            .take::<Vec<TicketRecord>>(0)?
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Ticket {} not found", tid)))
    }

    /// Delete a ticket; sub-tickets and media rows are removed by the caller
    /// via their repositories so file cleanup stays in one place.
    pub async fn delete(&self, ticket_id: &str) -> RepoResult<bool> {
        let existing = self
            .find_by_ticket_id(ticket_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Ticket {} not found", ticket_id)))?;

        self.base
            .db()
            .query("DELETE FROM ticket WHERE ticket_id = $ticket_id")
            .bind(("ticket_id", existing.ticket_id))
            .await?;
        Ok(true)
    }
}
