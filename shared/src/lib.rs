//! Shared types for the Civic Grid platform
//!
//! Domain enums, request payloads and response DTOs used by the complaint
//! server and its clients (dashboards, mobile uploaders).

pub mod models;
pub mod request;
pub mod response;
pub mod types;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use models::{SubTicketView, TicketView};
pub use types::{Department, IssueStatus, MediaType, Role, Timestamp};
