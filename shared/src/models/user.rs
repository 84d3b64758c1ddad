//! User view model

use serde::{Deserialize, Serialize};

use crate::types::{Department, Role};

/// Public account view (never carries the password hash)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPublic {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub department: Option<Department>,
    pub is_approved: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}
