//! Inspector API Handlers
//!
//! The inspector dashboard works on assigned sub-tickets only.

use axum::{
    Extension, Json,
    extract::{Multipart, Path, Query, State},
};
use serde::{Deserialize, Serialize};

use shared::response::MessageResponse;
use shared::types::IssueStatus;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{MediaRepository, SubTicketRepository, TicketRepository};
use crate::triage::{SlaTable, department_for, normalize};
use crate::utils::time::millis_to_rfc3339;
use crate::utils::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct AssignedQuery {
    #[serde(default)]
    pub status: Option<String>,
}

/// One assigned complaint row for the inspector dashboard
#[derive(Debug, Serialize)]
pub struct AssignedTicket {
    pub sub_id: String,
    pub ticket_id: String,
    pub issue_type: String,
    pub category: String,
    pub authority: String,
    pub status: IssueStatus,
    pub sla_hours: f64,
    pub created_at: String,
    pub resolved_at: Option<String>,
    pub area: Option<String>,
    pub district: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub image_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct AssignedResponse {
    pub status: String,
    pub count: usize,
    pub tickets: Vec<AssignedTicket>,
}

/// GET /api/inspector/tickets - sub-tickets assigned to the caller
pub async fn list_assigned(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<AssignedQuery>,
) -> AppResult<Json<AssignedResponse>> {
    user.require_inspector()?;

    let status = match query.status.as_deref() {
        None | Some("") | Some("all") => None,
        Some(raw) => Some(raw.parse::<IssueStatus>().map_err(AppError::validation)?),
    };

    let sub_repo = SubTicketRepository::new(state.db.clone());
    let ticket_repo = TicketRepository::new(state.db.clone());
    let media_repo = MediaRepository::new(state.db.clone());
    let sla = SlaTable::default();

    let subs = sub_repo
        .find_assigned(user.id, status)
        .await
        .map_err(AppError::from)?;

    let mut tickets = Vec::new();
    for sub in subs {
        let parent = ticket_repo
            .find_by_ticket_id(&sub.ticket_id)
            .await
            .map_err(AppError::from)?;
        let first_image = media_repo
            .find_by_sub(&sub.sub_id)
            .await
            .map_err(AppError::from)?
            .into_iter()
            .next();

        tickets.push(AssignedTicket {
            sub_id: sub.sub_id,
            ticket_id: sub.ticket_id,
            category: normalize(&sub.issue_type),
            sla_hours: sla.hours_for(&sub.issue_type),
            issue_type: sub.issue_type,
            authority: sub.authority,
            status: sub.status,
            created_at: millis_to_rfc3339(sub.created_at),
            resolved_at: sub.resolved_at.map(millis_to_rfc3339),
            area: parent.as_ref().and_then(|t| t.area.clone()),
            district: parent.as_ref().and_then(|t| t.district.clone()),
            latitude: parent.as_ref().and_then(|t| t.latitude),
            longitude: parent.as_ref().and_then(|t| t.longitude),
            image_id: first_image.map(|m| m.media_id),
        });
    }

    Ok(Json(AssignedResponse {
        status: "success".to_string(),
        count: tickets.len(),
        tickets,
    }))
}

/// POST /api/inspector/sub-tickets/{sub_id}/resolve
///
/// Multipart form: `status` (required), optional `comment`, `resolved_by`
/// and a proof `file`. Settling stamps `resolved_at`; anything else clears
/// it. Transitions are validated against the lifecycle state machine.
pub async fn resolve(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(sub_id): Path<String>,
    mut multipart: Multipart,
) -> AppResult<Json<MessageResponse>> {
    user.require_inspector()?;

    let mut status: Option<IssueStatus> = None;
    let mut comment: Option<String> = None;
    let mut resolved_by: Option<String> = None;
    let mut proof: Option<(String, String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await? {
        match field.name().unwrap_or_default() {
            "status" => {
                let raw = field.text().await?;
                status = Some(raw.trim().parse::<IssueStatus>().map_err(AppError::validation)?);
            }
            "comment" => comment = Some(field.text().await?),
            "resolved_by" => resolved_by = Some(field.text().await?),
            "file" => {
                let file_name = field.file_name().unwrap_or("proof.jpg").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                proof = Some((file_name, content_type, field.bytes().await?.to_vec()));
            }
            _ => {}
        }
    }

    let status = status
        .ok_or_else(|| AppError::validation("Field 'status' is required".to_string()))?;

    let sub_repo = SubTicketRepository::new(state.db.clone());
    let existing = sub_repo
        .find_by_sub_id(&sub_id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found(format!("Sub-ticket {} not found", sub_id)))?;

    // Inspectors act on their own assignments; admins on anything
    if !user.is_admin() && existing.assigned_to != Some(user.id) {
        return Err(AppError::forbidden(
            "Sub-ticket is not assigned to you".to_string(),
        ));
    }

    if !existing.status.can_transition_to(status) {
        return Err(AppError::business_rule(format!(
            "Cannot move sub-ticket from {} to {}",
            existing.status, status
        )));
    }

    let resolver = resolved_by.filter(|s| !s.is_empty()).unwrap_or_else(|| user.name.clone());
    sub_repo
        .update_status(
            &sub_id,
            status,
            comment.filter(|s| !s.is_empty()),
            Some(resolver),
        )
        .await
        .map_err(AppError::from)?;

    if let Some((file_name, content_type, bytes)) = proof {
        state
            .ingest
            .store_proof(&sub_id, &bytes, &content_type, &file_name)
            .await?;
    }

    tracing::info!(
        sub_id = %sub_id,
        status = %status,
        inspector = user.id,
        department = %department_for(&existing.issue_type),
        "Sub-ticket status updated"
    );

    Ok(Json(MessageResponse::success(format!(
        "Sub-ticket marked as {}",
        status
    ))))
}
