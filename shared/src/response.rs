//! Response envelopes

use serde::{Deserialize, Serialize};

use crate::models::{TicketView, UserPublic};

/// Simple status + message acknowledgement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub status: String,
    pub message: String,
}

impl MessageResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
        }
    }
}

/// Login result: token plus the account the dashboards key their role
/// switching off
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserPublic,
}

/// Nested ticket listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketsResponse {
    pub status: String,
    pub count: usize,
    pub tickets: Vec<TicketView>,
}

/// Account listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsersResponse {
    pub users: Vec<UserPublic>,
}

/// One entry in the admin's inspector activity log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectorActionView {
    pub id: i64,
    pub sub_id: String,
    #[serde(rename = "ticketId")]
    pub ticket_id: String,
    #[serde(rename = "inspectorName")]
    pub inspector_name: String,
    /// e.g. "Marked as resolved"
    pub action: String,
    pub time: Option<String>,
    pub issue_type: String,
    pub department: String,
}

/// Inspector activity log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectorActionsResponse {
    pub status: String,
    pub actions: Vec<InspectorActionView>,
}
