//! Ticket Model

use serde::{Deserialize, Serialize};
use shared::types::IssueStatus;

/// Ticket record: one citizen submission, located and geocoded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketRecord {
    pub ticket_id: String,
    pub user_id: Option<i64>,
    /// Denormalized at creation so listings never join the user table
    pub user_name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub area: Option<String>,
    pub district: Option<String>,
    #[serde(default)]
    pub status: IssueStatus,
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: Option<i64>,
    #[serde(default)]
    pub resolved_at: Option<i64>,
}

/// Create ticket payload
#[derive(Debug, Clone, Serialize)]
pub struct TicketCreate {
    pub user_id: Option<i64>,
    pub user_name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub area: Option<String>,
    pub district: Option<String>,
}

impl TicketCreate {
    /// Fresh ticket id: one per submission, never reused
    pub fn new_ticket_id() -> String {
        let suffix = uuid::Uuid::new_v4().simple().to_string()[..8].to_uppercase();
        format!("MDMS-{}", suffix)
    }
}
