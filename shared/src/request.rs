//! Request payloads
//!
//! Field-level validation lives here so every entry point (HTTP handler,
//! admin tooling) enforces the same rules.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Login payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Citizen/inspector signup payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
    /// Defaults to USER when omitted
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
}

/// Admin-created inspector account
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateInspectorRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
    /// Must be an assignable department (Roads or Garbage)
    #[validate(length(min = 1))]
    pub department: String,
}

/// Per-admin notification watermarks (max seen id per dashboard section)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LastSeenUpdate {
    #[serde(default)]
    pub inspectors: Option<i64>,
    #[serde(default)]
    pub complaints: Option<i64>,
    #[serde(default)]
    pub actions: Option<i64>,
    #[serde(default)]
    pub accounts: Option<i64>,
}
