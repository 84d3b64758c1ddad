//! Admin API Handlers

use axum::{
    Extension, Json,
    extract::{Query, State},
};
use serde::Deserialize;
use validator::Validate;

use shared::models::UserPublic;
use shared::request::{CreateInspectorRequest, LastSeenUpdate};
use shared::response::{InspectorActionView, InspectorActionsResponse, UsersResponse};
use shared::types::{Department, Role};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{UserCreate, WatermarkRecord};
use crate::db::repository::{SubTicketRepository, UserRepository, WatermarkRepository};
use crate::utils::time::millis_to_rfc3339;
use crate::utils::{AppError, AppResult};

/// Create an inspector account (auto-approved since an admin vouched for it)
pub async fn create_inspector(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CreateInspectorRequest>,
) -> AppResult<Json<UserPublic>> {
    user.require_admin()?;
    req.validate()?;

    let department = req
        .department
        .parse::<Department>()
        .map_err(|_| AppError::validation(format!("Unknown department: {}", req.department)))?;
    if !Department::assignable().contains(&department) {
        return Err(AppError::validation(
            "Inspectors must belong to Roads or Garbage".to_string(),
        ));
    }

    let repo = UserRepository::new(state.db.clone());
    let inspector = repo
        .create(UserCreate {
            name: req.name,
            email: req.email,
            password: req.password,
            role: Role::Inspector,
            department: Some(department),
        })
        .await
        .map_err(AppError::from)?;

    tracing::info!(
        inspector_id = inspector.user_id,
        department = %department,
        by = user.id,
        "Inspector account created"
    );
    Ok(Json(inspector.to_public()))
}

/// Resolution activity log: settled sub-tickets with their resolver
pub async fn inspector_actions(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<InspectorActionsResponse>> {
    user.require_admin()?;

    let repo = SubTicketRepository::new(state.db.clone());
    let actions = repo
        .find_resolved_actions()
        .await
        .map_err(AppError::from)?
        .into_iter()
        .map(|sub| InspectorActionView {
            id: sub.seq,
            sub_id: sub.sub_id,
            ticket_id: sub.ticket_id,
            inspector_name: sub.resolved_by.unwrap_or_default(),
            action: format!("Marked as {}", sub.status),
            time: sub.resolved_at.map(millis_to_rfc3339),
            issue_type: sub.issue_type,
            department: sub.authority,
        })
        .collect();

    Ok(Json(InspectorActionsResponse {
        status: "success".to_string(),
        actions,
    }))
}

#[derive(Debug, Deserialize)]
pub struct AccountsQuery {
    /// Free-text search over name and email
    #[serde(default)]
    pub q: Option<String>,
    /// Department filter: a department name, or "none" for accounts without
    #[serde(default)]
    pub department: Option<String>,
    /// Account kind filter: "user" | "inspector" | "admin"
    #[serde(default)]
    pub kind: Option<String>,
}

/// Filtered account listing for the admin accounts view
pub async fn list_accounts(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<AccountsQuery>,
) -> AppResult<Json<UsersResponse>> {
    user.require_admin()?;

    let repo = UserRepository::new(state.db.clone());
    let all = repo.find_all().await.map_err(AppError::from)?;

    let users = all
        .iter()
        .map(|u| u.to_public())
        .filter(|account| matches_query(account, &query))
        .collect();
    Ok(Json(UsersResponse { users }))
}

fn matches_query(account: &UserPublic, query: &AccountsQuery) -> bool {
    if let Some(q) = &query.q
        && !q.is_empty()
    {
        let needle = q.to_lowercase();
        if !account.name.to_lowercase().contains(&needle)
            && !account.email.to_lowercase().contains(&needle)
        {
            return false;
        }
    }

    if let Some(department) = &query.department
        && department != "all"
    {
        let matches = if department == "none" {
            account.department.is_none()
        } else {
            account.department.map(|d| d.as_str().eq_ignore_ascii_case(department)) == Some(true)
        };
        if !matches {
            return false;
        }
    }

    if let Some(kind) = &query.kind
        && kind != "all"
    {
        let wanted = match kind.to_lowercase().as_str() {
            "user" => Role::User,
            "inspector" => Role::Inspector,
            "admin" => Role::Admin,
            _ => return false,
        };
        if account.role != wanted {
            return false;
        }
    }

    true
}

/// Read this admin's notification watermarks
pub async fn get_last_seen(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<WatermarkRecord>> {
    user.require_admin()?;

    let repo = WatermarkRepository::new(state.db.clone());
    let marks = repo.get(user.id).await.map_err(AppError::from)?;
    Ok(Json(marks))
}

/// Advance this admin's notification watermarks (they never move backward)
pub async fn put_last_seen(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(update): Json<LastSeenUpdate>,
) -> AppResult<Json<WatermarkRecord>> {
    user.require_admin()?;

    let repo = WatermarkRepository::new(state.db.clone());
    let mut marks = repo.get(user.id).await.map_err(AppError::from)?;
    marks.advance(&update);
    let saved = repo.put(marks).await.map_err(AppError::from)?;
    Ok(Json(saved))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(name: &str, email: &str, role: Role, department: Option<Department>) -> UserPublic {
        UserPublic {
            id: 1,
            name: name.to_string(),
            email: email.to_string(),
            role,
            department,
            is_approved: true,
            created_at: None,
        }
    }

    #[test]
    fn test_search_matches_name_or_email() {
        let acc = account("Asha Rao", "asha@city.gov", Role::User, None);
        let q = |text: &str| AccountsQuery {
            q: Some(text.to_string()),
            department: None,
            kind: None,
        };
        assert!(matches_query(&acc, &q("asha")));
        assert!(matches_query(&acc, &q("city.gov")));
        assert!(!matches_query(&acc, &q("ravi")));
    }

    #[test]
    fn test_department_filter_supports_none() {
        let with_dept = account("I", "i@x", Role::Inspector, Some(Department::Roads));
        let without = account("U", "u@x", Role::User, None);
        let query = AccountsQuery {
            q: None,
            department: Some("none".to_string()),
            kind: None,
        };
        assert!(!matches_query(&with_dept, &query));
        assert!(matches_query(&without, &query));
    }

    #[test]
    fn test_kind_filter() {
        let inspector = account("I", "i@x", Role::Inspector, Some(Department::Garbage));
        let query = AccountsQuery {
            q: None,
            department: None,
            kind: Some("inspector".to_string()),
        };
        assert!(matches_query(&inspector, &query));
        let query = AccountsQuery {
            kind: Some("user".to_string()),
            q: None,
            department: None,
        };
        assert!(!matches_query(&inspector, &query));
    }
}
