//! Core domain enums
//!
//! Wire representations match what the dashboards already consume:
//! roles are UPPERCASE, statuses are lowercase snake_case, departments are
//! capitalized words.

use serde::{Deserialize, Serialize};

/// Timestamp type (Unix milliseconds)
pub type Timestamp = i64;

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Inspector,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Inspector => "INSPECTOR",
            Role::Admin => "ADMIN",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "USER" => Ok(Role::User),
            "INSPECTOR" => Ok(Role::Inspector),
            "ADMIN" => Ok(Role::Admin),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

/// Municipal department owning an issue type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Department {
    Roads,
    Garbage,
    Unassigned,
}

impl Department {
    pub fn as_str(&self) -> &'static str {
        match self {
            Department::Roads => "Roads",
            Department::Garbage => "Garbage",
            Department::Unassigned => "Unassigned",
        }
    }

    /// Departments an inspector account can belong to
    pub fn assignable() -> [Department; 2] {
        [Department::Roads, Department::Garbage]
    }
}

impl std::fmt::Display for Department {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Department {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "roads" => Ok(Department::Roads),
            "garbage" => Ok(Department::Garbage),
            "unassigned" => Ok(Department::Unassigned),
            other => Err(format!("Unknown department: {}", other)),
        }
    }
}

/// Sub-ticket lifecycle status
///
/// Transitions are validated server-side so a mutation either lands in a
/// legal state or is rejected whole; there is no partially-applied update to
/// roll back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    #[default]
    Open,
    Assigned,
    InProgress,
    Resolved,
    Closed,
}

impl IssueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueStatus::Open => "open",
            IssueStatus::Assigned => "assigned",
            IssueStatus::InProgress => "in_progress",
            IssueStatus::Resolved => "resolved",
            IssueStatus::Closed => "closed",
        }
    }

    /// Terminal-side statuses: the complaint is considered dealt with
    pub fn is_settled(&self) -> bool {
        matches!(self, IssueStatus::Resolved | IssueStatus::Closed)
    }

    /// Whether moving to `next` is a legal lifecycle step.
    ///
    /// Reopening from resolved/closed is allowed (field verification can
    /// fail); skipping forward is allowed (an inspector may resolve an open
    /// issue directly).
    pub fn can_transition_to(&self, next: IssueStatus) -> bool {
        if *self == next {
            return false;
        }
        match self {
            IssueStatus::Open | IssueStatus::Assigned => true,
            IssueStatus::InProgress => matches!(
                next,
                IssueStatus::Open | IssueStatus::Resolved | IssueStatus::Closed
            ),
            IssueStatus::Resolved => matches!(next, IssueStatus::Open | IssueStatus::Closed),
            IssueStatus::Closed => matches!(next, IssueStatus::Open),
        }
    }
}

impl std::fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for IssueStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "open" | "new" => Ok(IssueStatus::Open),
            "assigned" => Ok(IssueStatus::Assigned),
            "in_progress" => Ok(IssueStatus::InProgress),
            "resolved" => Ok(IssueStatus::Resolved),
            "closed" => Ok(IssueStatus::Closed),
            other => Err(format!("Unknown status: {}", other)),
        }
    }
}

/// Stored media kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[default]
    Image,
    Video,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
        }
    }

    /// Classify from a MIME content type, defaulting to image
    pub fn from_content_type(content_type: &str) -> Self {
        if content_type.starts_with("video/") {
            MediaType::Video
        } else {
            MediaType::Image
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        let json = serde_json::to_string(&Role::Inspector).unwrap();
        assert_eq!(json, "\"INSPECTOR\"");
        let back: Role = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Role::Inspector);
    }

    #[test]
    fn test_status_serde_is_snake_case() {
        assert_eq!(
            serde_json::to_string(&IssueStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
    }

    #[test]
    fn test_status_default_is_open() {
        assert_eq!(IssueStatus::default(), IssueStatus::Open);
    }

    #[test]
    fn test_settled_statuses() {
        assert!(IssueStatus::Resolved.is_settled());
        assert!(IssueStatus::Closed.is_settled());
        assert!(!IssueStatus::Open.is_settled());
        assert!(!IssueStatus::InProgress.is_settled());
    }

    #[test]
    fn test_legal_transitions() {
        assert!(IssueStatus::Open.can_transition_to(IssueStatus::Resolved));
        assert!(IssueStatus::Assigned.can_transition_to(IssueStatus::InProgress));
        assert!(IssueStatus::InProgress.can_transition_to(IssueStatus::Resolved));
        assert!(IssueStatus::Resolved.can_transition_to(IssueStatus::Open));
        assert!(IssueStatus::Closed.can_transition_to(IssueStatus::Open));
    }

    #[test]
    fn test_illegal_transitions() {
        assert!(!IssueStatus::Open.can_transition_to(IssueStatus::Open));
        assert!(!IssueStatus::Resolved.can_transition_to(IssueStatus::Assigned));
        assert!(!IssueStatus::Closed.can_transition_to(IssueStatus::InProgress));
    }

    #[test]
    fn test_new_parses_as_open() {
        assert_eq!("new".parse::<IssueStatus>().unwrap(), IssueStatus::Open);
    }

    #[test]
    fn test_media_type_from_content_type() {
        assert_eq!(
            MediaType::from_content_type("video/mp4"),
            MediaType::Video
        );
        assert_eq!(
            MediaType::from_content_type("image/jpeg"),
            MediaType::Image
        );
    }
}
