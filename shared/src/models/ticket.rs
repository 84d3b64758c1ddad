//! Ticket view models
//!
//! `TicketView` is the nested shape returned by `GET /api/complaints/tickets`:
//! one ticket per submission, grouping the sub-tickets (one per detected
//! issue). Timestamps are RFC 3339 strings on the wire; missing dates are
//! `null`, and consumers treat unparsable dates as "unknown" rather than
//! erroring.

use serde::{Deserialize, Serialize};

use crate::types::{IssueStatus, MediaType};

/// Media attachment summary carried inside a sub-ticket view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaInfo {
    pub id: i64,
    pub file_name: Option<String>,
    pub media_type: MediaType,
    pub confidence: Option<f64>,
}

/// One detected issue within a ticket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubTicketView {
    /// Numeric row id (used for notification watermarks)
    pub id: i64,
    pub sub_id: String,
    /// Raw issue type as stored (casing/spacing may be inconsistent)
    pub issue_type: String,
    /// Department stamped at ingest
    pub authority: String,
    #[serde(default)]
    pub status: IssueStatus,
    #[serde(default)]
    pub assigned_to: Option<i64>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub confidence: Option<f64>,
    /// Primary media for preview
    #[serde(default)]
    pub image_id: Option<i64>,
    #[serde(default)]
    pub media_type: Option<MediaType>,
    #[serde(default)]
    pub image_count: usize,
    #[serde(default)]
    pub images: Vec<MediaInfo>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub resolved_at: Option<String>,
    #[serde(default)]
    pub resolved_by: Option<String>,
    #[serde(default)]
    pub resolution_comment: Option<String>,
}

/// One citizen submission, grouping its sub-tickets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketView {
    pub ticket_id: String,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub status: IssueStatus,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub resolved_at: Option<String>,
    #[serde(default)]
    pub sub_tickets: Vec<SubTicketView>,
}
