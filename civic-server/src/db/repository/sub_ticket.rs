//! SubTicket Repository

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{SubTicketCreate, SubTicketRecord};
use crate::db::next_numeric_id;
use crate::utils::time::now_millis;
use shared::types::IssueStatus;

#[derive(Clone)]
pub struct SubTicketRepository {
    base: BaseRepository,
}

impl SubTicketRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_sub_id(&self, sub_id: &str) -> RepoResult<Option<SubTicketRecord>> {
        let sid = sub_id.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM sub_ticket WHERE sub_id = $sub_id LIMIT 1")
            .bind(("sub_id", sid))
            .await?;
        let subs: Vec<SubTicketRecord> = result.take(0)?;
        Ok(subs.into_iter().next())
    }

    /// Children of one ticket, oldest first
    pub async fn find_by_ticket(&self, ticket_id: &str) -> RepoResult<Vec<SubTicketRecord>> {
        let tid = ticket_id.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM sub_ticket WHERE ticket_id = $ticket_id ORDER BY created_at")
            .bind(("ticket_id", tid))
            .await?;
        let subs: Vec<SubTicketRecord> = result.take(0)?;
        Ok(subs)
    }

    /// Reuse lookup: same ticket, same issue type
    pub async fn find_by_ticket_and_type(
        &self,
        ticket_id: &str,
        issue_type: &str,
    ) -> RepoResult<Option<SubTicketRecord>> {
        let mut result = self
            .base
            .db()
            .query(
                r#"SELECT * FROM sub_ticket
                    WHERE ticket_id = $ticket_id
                    AND issue_type = $issue_type
                LIMIT 1"#,
            )
            .bind(("ticket_id", ticket_id.to_string()))
            .bind(("issue_type", issue_type.to_string()))
            .await?;
        let subs: Vec<SubTicketRecord> = result.take(0)?;
        Ok(subs.into_iter().next())
    }

    /// An existing assignment on this ticket within the same department,
    /// reused so one submission does not fan out across inspectors.
    pub async fn find_assignment_for_department(
        &self,
        ticket_id: &str,
        authority: &str,
    ) -> RepoResult<Option<i64>> {
        let mut result = self
            .base
            .db()
            .query(
                r#"SELECT * FROM sub_ticket
                    WHERE ticket_id = $ticket_id
                    AND authority = $authority
                    AND assigned_to != NONE
                LIMIT 1"#,
            )
            .bind(("ticket_id", ticket_id.to_string()))
            .bind(("authority", authority.to_string()))
            .await?;
        let subs: Vec<SubTicketRecord> = result.take(0)?;
        Ok(subs.into_iter().next().and_then(|s| s.assigned_to))
    }

    /// Most recently assigned inspector within a department, for the
    /// round-robin rotation.
    pub async fn last_assigned_inspector(&self, authority: &str) -> RepoResult<Option<i64>> {
        let mut result = self
            .base
            .db()
            .query(
                r#"SELECT * FROM sub_ticket
                    WHERE authority = $authority
                    AND assigned_to != NONE
                ORDER BY seq DESC
                LIMIT 1"#,
            )
            .bind(("authority", authority.to_string()))
            .await?;
        let subs: Vec<SubTicketRecord> = result.take(0)?;
        Ok(subs.into_iter().next().and_then(|s| s.assigned_to))
    }

    /// Sub-tickets assigned to one inspector, newest first
    pub async fn find_assigned(
        &self,
        inspector_id: i64,
        status: Option<IssueStatus>,
    ) -> RepoResult<Vec<SubTicketRecord>> {
        let mut result = self
            .base
            .db()
            .query(
                r#"SELECT * FROM sub_ticket
                    WHERE assigned_to = $inspector_id
                    AND ($has_status = false OR status = $status)
                ORDER BY created_at DESC"#,
            )
            .bind(("inspector_id", inspector_id))
            .bind(("has_status", status.is_some()))
            .bind(("status", status))
            .await?;
        let subs: Vec<SubTicketRecord> = result.take(0)?;
        Ok(subs)
    }

    /// Settled sub-tickets with a recorded resolver, newest resolution first
    /// (the admin activity log)
    pub async fn find_resolved_actions(&self) -> RepoResult<Vec<SubTicketRecord>> {
        let mut result = self
            .base
            .db()
            .query(
                r#"SELECT * FROM sub_ticket
                    WHERE status IN [$resolved, $closed]
                    AND resolved_by != NONE
                ORDER BY resolved_at DESC"#,
            )
            .bind(("resolved", IssueStatus::Resolved))
            .bind(("closed", IssueStatus::Closed))
            .await?;
        let subs: Vec<SubTicketRecord> = result.take(0)?;
        Ok(subs)
    }

    /// Create a new sub-ticket
    pub async fn create(&self, data: SubTicketCreate) -> RepoResult<SubTicketRecord> {
        let record = SubTicketRecord {
            sub_id: SubTicketCreate::new_sub_id(),
            seq: next_numeric_id(),
            ticket_id: data.ticket_id,
            issue_type: data.issue_type,
            authority: data.authority,
            status: IssueStatus::Open,
            assigned_to: data.assigned_to,
            created_at: now_millis(),
            updated_at: None,
            resolved_at: None,
            resolution_comment: None,
            resolved_by: None,
        };

        let mut result = self
            .base
            .db()
            .query("CREATE sub_ticket CONTENT $data RETURN AFTER")
            .bind(("data", record))
            .await?;

        let created: Option<SubTicketRecord> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create sub-ticket".to_string()))
    }

    /// Apply a validated status change; stamps or clears `resolved_at` and
    /// records resolver metadata when provided.
    pub async fn update_status(
        &self,
        sub_id: &str,
        status: IssueStatus,
        comment: Option<String>,
        resolved_by: Option<String>,
    ) -> RepoResult<SubTicketRecord> {
        let sid = sub_id.to_string();
        let resolved_at = status.is_settled().then(now_millis);
        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE sub_ticket SET
                    status = $status,
                    resolved_at = $resolved_at,
                    resolution_comment = $comment OR resolution_comment,
                    resolved_by = $resolved_by OR resolved_by,
                    updated_at = $updated_at
                WHERE sub_id = $sub_id
                RETURN AFTER"#,
            )
            .bind(("sub_id", sid.clone()))
            .bind(("status", status))
            .bind(("resolved_at", resolved_at))
            .bind(("comment", comment))
            .bind(("resolved_by", resolved_by))
            .bind(("updated_at", now_millis()))
            .await?;

        result
            .take::<Vec<SubTicketRecord>>(0)?
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Sub-ticket {} not found", sid)))
    }

    /// Remove every sub-ticket under a ticket (cascade from ticket delete)
    pub async fn delete_by_ticket(&self, ticket_id: &str) -> RepoResult<()> {
        self.base
            .db()
            .query("DELETE FROM sub_ticket WHERE ticket_id = $ticket_id")
            .bind(("ticket_id", ticket_id.to_string()))
            .await?;
        Ok(())
    }
}
