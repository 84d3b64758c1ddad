//! Ticket flattening
//!
//! Dashboards work row-wise: one row per sub-ticket, enriched with the
//! fields of its parent ticket plus the derived canonical type, department
//! and SLA state. Rows are ephemeral — rebuilt from the nested tickets on
//! every pass, never persisted.

use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::models::TicketView;
use shared::types::{Department, IssueStatus, MediaType};

use super::department::department_for;
use super::sla::{SlaEvaluation, SlaTable};
use super::taxonomy::normalize;
use crate::utils::time::parse_datetime;

/// Visibility applied while flattening
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Every sub-ticket (admin and citizen dashboards; citizen listings are
    /// already restricted to the citizen's own tickets at query time)
    All,
    /// Only sub-tickets assigned to the given inspector
    AssignedTo(i64),
}

/// One display row: a sub-ticket merged with its parent's fields
#[derive(Debug, Clone, Serialize)]
pub struct FlattenedRow {
    pub id: i64,
    pub sub_id: String,
    pub ticket_id: String,
    /// Raw issue type as stored
    pub issue_type: String,
    /// Canonical tag from the taxonomy
    pub category: String,
    pub department: Department,
    pub status: IssueStatus,
    pub confidence: Option<f64>,
    pub image_id: Option<i64>,
    pub media_type: Option<MediaType>,
    pub image_count: usize,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub area: Option<String>,
    pub district: Option<String>,
    pub user_name: String,
    pub assigned_to: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub sla: SlaEvaluation,
}

/// Expand nested tickets into enriched display rows.
///
/// A ticket with no sub-tickets yields no rows. Sub-ticket coordinates and
/// creation date fall back to the parent's when missing. No ordering is
/// applied here — sorting is the pipeline's job.
pub fn flatten(
    tickets: &[TicketView],
    scope: Scope,
    sla: &SlaTable,
    now: DateTime<Utc>,
) -> Vec<FlattenedRow> {
    let mut rows = Vec::new();

    for ticket in tickets {
        for sub in &ticket.sub_tickets {
            if let Scope::AssignedTo(inspector_id) = scope
                && sub.assigned_to != Some(inspector_id)
            {
                continue;
            }

            let created_at = sub
                .created_at
                .as_deref()
                .or(ticket.created_at.as_deref())
                .and_then(parse_datetime);
            let resolved_at = sub.resolved_at.as_deref().and_then(parse_datetime);

            let evaluation = sla.evaluate(
                &sub.issue_type,
                sub.status,
                created_at,
                resolved_at,
                now,
            );

            rows.push(FlattenedRow {
                id: sub.id,
                sub_id: sub.sub_id.clone(),
                ticket_id: ticket.ticket_id.clone(),
                issue_type: sub.issue_type.clone(),
                category: normalize(&sub.issue_type),
                department: department_for(&sub.issue_type),
                status: sub.status,
                confidence: sub.confidence,
                image_id: sub.image_id,
                media_type: sub.media_type,
                image_count: sub.image_count,
                latitude: sub.latitude.or(ticket.latitude),
                longitude: sub.longitude.or(ticket.longitude),
                area: ticket.area.clone(),
                district: ticket.district.clone(),
                user_name: ticket.user_name.clone(),
                assigned_to: sub.assigned_to,
                created_at,
                resolved_at,
                sla: evaluation,
            });
        }
    }

    rows
}
