//! Complaints API Handlers

use axum::{
    Extension, Form, Json,
    body::Body,
    extract::{Multipart, Path, Query, State},
    response::Response,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use shared::models::{MediaInfo, SubTicketView, TicketView};
use shared::response::{MessageResponse, TicketsResponse};
use shared::types::IssueStatus;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::TicketRecord;
use crate::db::repository::{MediaRepository, SubTicketRepository, TicketRepository};
use crate::services::{IngestOutcome, RejectedItem};
use crate::triage::{
    self, DateRange, PageView, RowFilter, Scope, SlaTable, StatusFilter, TicketStats,
};
use crate::utils::time::{millis_to_rfc3339, parse_date};
use crate::utils::{AppError, AppResult};

// ============================================================================
// Query Parameters
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct TicketsQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub issue_type: Option<String>,
    #[serde(default)]
    pub user_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    /// all | 7days | 30days | custom
    #[serde(default)]
    pub date_range: Option<String>,
    /// Specific date (YYYY-MM-DD); implies a custom date range
    #[serde(default)]
    pub date: Option<String>,
    /// all | new | pending | resolved | open | assigned | in_progress | closed
    #[serde(default)]
    pub status: Option<String>,
    /// Canonical issue type or "all"
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default = "default_page")]
    pub page: usize,
}

fn default_page() -> usize {
    1
}

#[derive(Debug, Deserialize)]
pub struct GeocodeQuery {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Deserialize)]
pub struct LocationForm {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: IssueStatus,
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct GeocodeResponse {
    pub status: String,
    pub area: String,
    pub district: String,
    pub address: String,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub message: String,
    pub tickets_created: Vec<IngestOutcome>,
    pub rejected_items: Vec<RejectedItem>,
}

// ============================================================================
// Ticket assembly
// ============================================================================

/// Role-based visibility for flattened listings
fn scope_for(user: &CurrentUser) -> Scope {
    match user.role {
        shared::types::Role::Inspector => Scope::AssignedTo(user.id),
        _ => Scope::All,
    }
}

/// Citizens only ever see their own tickets
fn effective_user_filter(user: &CurrentUser, requested: Option<i64>) -> Option<i64> {
    match user.role {
        shared::types::Role::User => Some(user.id),
        _ => requested,
    }
}

/// Build the nested view of one ticket: sub-tickets plus media summaries
async fn assemble_ticket_view(
    state: &ServerState,
    ticket: TicketRecord,
    issue_type: Option<&str>,
) -> AppResult<Option<TicketView>> {
    let sub_repo = SubTicketRepository::new(state.db.clone());
    let media_repo = MediaRepository::new(state.db.clone());

    let subs = sub_repo
        .find_by_ticket(&ticket.ticket_id)
        .await
        .map_err(AppError::from)?;

    let mut sub_views = Vec::new();
    for sub in subs {
        if let Some(wanted) = issue_type
            && triage::normalize(&sub.issue_type) != triage::normalize(wanted)
        {
            continue;
        }

        let images = media_repo
            .find_by_sub(&sub.sub_id)
            .await
            .map_err(AppError::from)?;
        let first_media = images.first();
        let gps_image = images
            .iter()
            .find(|m| m.latitude.is_some() && m.longitude.is_some());

        sub_views.push(SubTicketView {
            id: sub.seq,
            sub_id: sub.sub_id.clone(),
            issue_type: sub.issue_type.clone(),
            authority: sub.authority.clone(),
            status: sub.status,
            assigned_to: sub.assigned_to,
            latitude: gps_image.and_then(|m| m.latitude),
            longitude: gps_image.and_then(|m| m.longitude),
            confidence: first_media.and_then(|m| m.confidence),
            image_id: first_media.map(|m| m.media_id),
            media_type: first_media.map(|m| m.media_type),
            image_count: images.len(),
            images: images
                .iter()
                .map(|m| MediaInfo {
                    id: m.media_id,
                    file_name: Some(m.file_name.clone()),
                    media_type: m.media_type,
                    confidence: m.confidence,
                })
                .collect(),
            created_at: Some(millis_to_rfc3339(sub.created_at)),
            resolved_at: sub.resolved_at.map(millis_to_rfc3339),
            resolved_by: sub.resolved_by.clone(),
            resolution_comment: sub.resolution_comment.clone(),
        });
    }

    // A ticket is only visible through the sub-tickets it still has
    if sub_views.is_empty() {
        return Ok(None);
    }

    Ok(Some(TicketView {
        ticket_id: ticket.ticket_id,
        user_id: ticket.user_id,
        user_name: ticket.user_name,
        latitude: ticket.latitude,
        longitude: ticket.longitude,
        area: ticket.area,
        district: ticket.district,
        address: ticket.address,
        status: ticket.status,
        created_at: Some(millis_to_rfc3339(ticket.created_at)),
        updated_at: ticket.updated_at.map(millis_to_rfc3339),
        resolved_at: ticket.resolved_at.map(millis_to_rfc3339),
        sub_tickets: sub_views,
    }))
}

/// Fetch and assemble every ticket visible to the caller
async fn load_ticket_views(
    state: &ServerState,
    user: &CurrentUser,
    status: Option<IssueStatus>,
    issue_type: Option<&str>,
    user_id: Option<i64>,
) -> AppResult<Vec<TicketView>> {
    let ticket_repo = TicketRepository::new(state.db.clone());
    let tickets = ticket_repo
        .find_all(status, effective_user_filter(user, user_id))
        .await
        .map_err(AppError::from)?;

    let mut views = Vec::new();
    for ticket in tickets {
        if let Some(view) = assemble_ticket_view(state, ticket, issue_type).await? {
            views.push(view);
        }
    }
    Ok(views)
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/complaints/tickets - nested ticket listing
pub async fn list_tickets(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<TicketsQuery>,
) -> AppResult<Json<TicketsResponse>> {
    let status = parse_status_param(query.status.as_deref())?;
    let tickets = load_ticket_views(
        &state,
        &user,
        status,
        query.issue_type.as_deref(),
        query.user_id,
    )
    .await?;

    Ok(Json(TicketsResponse {
        status: "success".to_string(),
        count: tickets.len(),
        tickets,
    }))
}

/// GET /api/complaints/tickets/{ticket_id}
pub async fn get_ticket(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(ticket_id): Path<String>,
) -> AppResult<Json<TicketView>> {
    let ticket_repo = TicketRepository::new(state.db.clone());
    let ticket = ticket_repo
        .find_by_ticket_id(&ticket_id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found(format!("Ticket {} not found", ticket_id)))?;

    if user.role == shared::types::Role::User && ticket.user_id != Some(user.id) {
        return Err(AppError::forbidden(
            "Tickets of other citizens are not visible".to_string(),
        ));
    }

    assemble_ticket_view(&state, ticket, None)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("Ticket {} has no sub-tickets", ticket_id)))
}

/// GET /api/complaints/feed - flattened, enriched, filtered, paginated rows
pub async fn feed(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<FeedQuery>,
) -> AppResult<Json<PageView>> {
    let now = Utc::now();
    let tickets = load_ticket_views(&state, &user, None, None, None).await?;

    let rows = triage::flatten(&tickets, scope_for(&user), &SlaTable::default(), now);
    let filter = row_filter_from(&query)?;
    let filtered = triage::apply_filter(rows, &filter, now);

    Ok(Json(triage::paginate(filtered, query.page)))
}

/// GET /api/complaints/stats - dashboard aggregate for the caller's scope
pub async fn stats(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<TicketStats>> {
    let now = Utc::now();
    let tickets = load_ticket_views(&state, &user, None, None, None).await?;
    let rows = triage::flatten(&tickets, scope_for(&user), &SlaTable::default(), now);

    Ok(Json(triage::aggregate(&rows, now.date_naive())))
}

/// GET /api/complaints/geocode - reverse geocode coordinates
pub async fn geocode(
    State(state): State<ServerState>,
    Query(query): Query<GeocodeQuery>,
) -> AppResult<Json<GeocodeResponse>> {
    let area = state.geocode.reverse(query.lat, query.lon).await;
    Ok(Json(GeocodeResponse {
        status: "success".to_string(),
        area: area.area,
        district: area.district,
        address: area.address,
    }))
}

/// POST /api/complaints/batch - multipart upload of evidence files
pub async fn batch_upload(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    mut multipart: Multipart,
) -> AppResult<Json<BatchResponse>> {
    let mut files: Vec<(String, String, Vec<u8>)> = Vec::new();
    let mut latitude: Option<f64> = None;
    let mut longitude: Option<f64> = None;

    while let Some(field) = multipart.next_field().await? {
        match field.name().unwrap_or_default() {
            "files" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await?;
                if bytes.len() > state.config.max_upload_bytes {
                    return Err(AppError::validation(format!(
                        "File {} exceeds the upload limit",
                        file_name
                    )));
                }
                files.push((file_name, content_type, bytes.to_vec()));
            }
            "latitude" => latitude = field.text().await?.trim().parse().ok(),
            "longitude" => longitude = field.text().await?.trim().parse().ok(),
            _ => {}
        }
    }

    if files.is_empty() {
        return Err(AppError::validation("No files uploaded".to_string()));
    }

    let mut tickets_created = Vec::new();
    let mut rejected_items = Vec::new();

    for (file_name, content_type, bytes) in files {
        let outcome = state
            .ingest
            .process_file(
                &bytes,
                &content_type,
                &file_name,
                latitude,
                longitude,
                Some((user.id, user.name.clone())),
            )
            .await?;

        match outcome {
            IngestOutcome::Rejected(rejected) => rejected_items.push(rejected),
            accepted => tickets_created.push(accepted),
        }
    }

    let message = format!(
        "{} complaint(s) registered, {} item(s) rejected",
        tickets_created.len(),
        rejected_items.len()
    );

    Ok(Json(BatchResponse {
        message,
        tickets_created,
        rejected_items,
    }))
}

/// GET /api/complaints/images/{id} - stored media bytes
pub async fn get_image(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    let media_repo = MediaRepository::new(state.db.clone());
    let media = media_repo
        .find_by_id(id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found(format!("Media {} not found", id)))?;

    let path = state.ingest.media_dir().join(&media.file_name);
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| AppError::internal(format!("Failed to read media file: {}", e)))?;

    Response::builder()
        .header(http::header::CONTENT_TYPE, media.content_type)
        .body(Body::from(bytes))
        .map_err(|e| AppError::internal(format!("Failed to build response: {}", e)))
}

/// PATCH /api/complaints/tickets/{ticket_id}/location
pub async fn update_location(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(ticket_id): Path<String>,
    Form(form): Form<LocationForm>,
) -> AppResult<Json<TicketView>> {
    if !(-90.0..=90.0).contains(&form.latitude) || !(-180.0..=180.0).contains(&form.longitude) {
        return Err(AppError::validation("Coordinates out of range".to_string()));
    }

    let ticket_repo = TicketRepository::new(state.db.clone());
    let existing = ticket_repo
        .find_by_ticket_id(&ticket_id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found(format!("Ticket {} not found", ticket_id)))?;

    if user.role == shared::types::Role::User && existing.user_id != Some(user.id) {
        return Err(AppError::forbidden(
            "Only the reporting citizen can relocate this ticket".to_string(),
        ));
    }

    let geo = state.geocode.reverse(form.latitude, form.longitude).await;
    let ticket = ticket_repo
        .update_location(
            &ticket_id,
            form.latitude,
            form.longitude,
            Some(geo.area),
            Some(geo.district),
            Some(geo.address),
        )
        .await
        .map_err(AppError::from)?;

    assemble_ticket_view(&state, ticket, None)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("Ticket {} has no sub-tickets", ticket_id)))
}

/// PATCH /api/complaints/tickets/{ticket_id}/status - transition-validated
pub async fn update_status(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(ticket_id): Path<String>,
    Json(update): Json<StatusUpdate>,
) -> AppResult<Json<MessageResponse>> {
    user.require_inspector()?;

    let ticket_repo = TicketRepository::new(state.db.clone());
    let existing = ticket_repo
        .find_by_ticket_id(&ticket_id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found(format!("Ticket {} not found", ticket_id)))?;

    if !existing.status.can_transition_to(update.status) {
        return Err(AppError::business_rule(format!(
            "Cannot move ticket from {} to {}",
            existing.status, update.status
        )));
    }

    ticket_repo
        .update_status(&ticket_id, update.status)
        .await
        .map_err(AppError::from)?;

    tracing::info!(ticket_id = %ticket_id, status = %update.status, by = user.id, "Ticket status updated");
    Ok(Json(MessageResponse::success(format!(
        "Ticket marked as {}",
        update.status
    ))))
}

/// DELETE /api/complaints/tickets/{ticket_id} - cascades sub-tickets and media
pub async fn delete_ticket(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(ticket_id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let ticket_repo = TicketRepository::new(state.db.clone());
    let existing = ticket_repo
        .find_by_ticket_id(&ticket_id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found(format!("Ticket {} not found", ticket_id)))?;

    // Citizens may delete their own submissions; admins anything
    if user.role == shared::types::Role::User && existing.user_id != Some(user.id) {
        return Err(AppError::forbidden(
            "Only the reporting citizen can delete this ticket".to_string(),
        ));
    }

    let media_repo = MediaRepository::new(state.db.clone());
    let files = media_repo
        .delete_by_ticket(&ticket_id)
        .await
        .map_err(AppError::from)?;
    for file_name in files {
        let path = state.ingest.media_dir().join(&file_name);
        if let Err(e) = tokio::fs::remove_file(&path).await {
            tracing::warn!(file = %file_name, error = %e, "Failed to remove media file");
        }
    }

    SubTicketRepository::new(state.db.clone())
        .delete_by_ticket(&ticket_id)
        .await
        .map_err(AppError::from)?;
    ticket_repo.delete(&ticket_id).await.map_err(AppError::from)?;

    tracing::info!(ticket_id = %ticket_id, by = user.id, "Ticket deleted");
    Ok(Json(MessageResponse::success("Ticket deleted")))
}

// ============================================================================
// Parameter mapping
// ============================================================================

fn parse_status_param(value: Option<&str>) -> AppResult<Option<IssueStatus>> {
    match value {
        None | Some("") | Some("all") => Ok(None),
        Some(raw) => raw
            .parse::<IssueStatus>()
            .map(Some)
            .map_err(AppError::validation),
    }
}

fn row_filter_from(query: &FeedQuery) -> AppResult<RowFilter> {
    let date_range = match (query.date.as_deref(), query.date_range.as_deref()) {
        (Some(date), _) if !date.is_empty() => DateRange::On(parse_date(date)?),
        (_, Some("7days")) => DateRange::Last7Days,
        (_, Some("30days")) => DateRange::Last30Days,
        _ => DateRange::All,
    };

    let status = match query.status.as_deref() {
        None | Some("") | Some("all") => StatusFilter::All,
        Some("new") => StatusFilter::New,
        Some("pending") => StatusFilter::Pending,
        Some("resolved") => StatusFilter::Resolved,
        Some(raw) => StatusFilter::Exact(
            raw.parse::<IssueStatus>().map_err(AppError::validation)?,
        ),
    };

    let category = match query.category.as_deref() {
        None | Some("") | Some("all") => None,
        Some(value) => Some(value.to_string()),
    };

    Ok(RowFilter {
        date_range,
        status,
        category,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_query(
        date_range: Option<&str>,
        date: Option<&str>,
        status: Option<&str>,
        category: Option<&str>,
    ) -> FeedQuery {
        FeedQuery {
            date_range: date_range.map(str::to_string),
            date: date.map(str::to_string),
            status: status.map(str::to_string),
            category: category.map(str::to_string),
            page: 1,
        }
    }

    #[test]
    fn test_row_filter_mapping() {
        let filter =
            row_filter_from(&feed_query(Some("7days"), None, Some("resolved"), Some("all")))
                .unwrap();
        assert_eq!(filter.date_range, DateRange::Last7Days);
        assert_eq!(filter.status, StatusFilter::Resolved);
        assert!(filter.category.is_none());
    }

    #[test]
    fn test_specific_date_wins_over_range() {
        let filter =
            row_filter_from(&feed_query(Some("30days"), Some("2024-01-02"), None, None)).unwrap();
        assert!(matches!(filter.date_range, DateRange::On(_)));
    }

    #[test]
    fn test_exact_status_mapping() {
        let filter = row_filter_from(&feed_query(None, None, Some("in_progress"), None)).unwrap();
        assert_eq!(
            filter.status,
            StatusFilter::Exact(IssueStatus::InProgress)
        );
        assert!(row_filter_from(&feed_query(None, None, Some("bogus"), None)).is_err());
    }

    #[test]
    fn test_status_param_parsing() {
        assert_eq!(parse_status_param(Some("all")).unwrap(), None);
        assert_eq!(
            parse_status_param(Some("resolved")).unwrap(),
            Some(IssueStatus::Resolved)
        );
        assert!(parse_status_param(Some("nonsense")).is_err());
    }
}
