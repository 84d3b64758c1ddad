//! SubTicket Model

use serde::{Deserialize, Serialize};
use shared::types::IssueStatus;

/// Sub-ticket record: one detected issue within a ticket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubTicketRecord {
    pub sub_id: String,
    /// Monotonic numeric id, exposed to dashboards for watermarking
    pub seq: i64,
    pub ticket_id: String,
    /// Raw issue type as produced by the detector
    pub issue_type: String,
    /// Owning department, stamped at ingest
    pub authority: String,
    #[serde(default)]
    pub status: IssueStatus,
    #[serde(default)]
    pub assigned_to: Option<i64>,
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: Option<i64>,
    #[serde(default)]
    pub resolved_at: Option<i64>,
    #[serde(default)]
    pub resolution_comment: Option<String>,
    /// Inspector display name recorded at resolution
    #[serde(default)]
    pub resolved_by: Option<String>,
}

/// Create sub-ticket payload
#[derive(Debug, Clone, Serialize)]
pub struct SubTicketCreate {
    pub ticket_id: String,
    pub issue_type: String,
    pub authority: String,
    pub assigned_to: Option<i64>,
}

impl SubTicketCreate {
    pub fn new_sub_id() -> String {
        let suffix = uuid::Uuid::new_v4().simple().to_string()[..10].to_uppercase();
        format!("SUB-{}", suffix)
    }
}
