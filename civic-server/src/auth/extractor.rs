//! Authenticated user context
//!
//! Injected by the auth middleware as a request extension; handlers take it
//! via `Extension<CurrentUser>`. This is the typed replacement for the old
//! parse-the-session-blob-on-every-read pattern.

use shared::types::{Department, Role};

use super::jwt::Claims;
use crate::utils::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub department: Option<Department>,
}

impl CurrentUser {
    pub fn from_claims(claims: &Claims) -> AppResult<Self> {
        let id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| AppError::InvalidToken)?;
        let role = claims
            .role
            .parse::<Role>()
            .map_err(|_| AppError::InvalidToken)?;
        let department = match &claims.department {
            Some(dept) => Some(
                dept.parse::<Department>()
                    .map_err(|_| AppError::InvalidToken)?,
            ),
            None => None,
        };

        Ok(Self {
            id,
            name: claims.name.clone(),
            email: claims.email.clone(),
            role,
            department,
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Admin gate for management endpoints
    pub fn require_admin(&self) -> AppResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::forbidden("Admin access required".to_string()))
        }
    }

    /// Inspector gate; admins pass too (they act on any sub-ticket)
    pub fn require_inspector(&self) -> AppResult<()> {
        match self.role {
            Role::Inspector | Role::Admin => Ok(()),
            Role::User => Err(AppError::forbidden(
                "Inspector access required".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: &str, department: Option<&str>) -> Claims {
        Claims {
            sub: "7".to_string(),
            name: "Test".to_string(),
            email: "t@example.com".to_string(),
            role: role.to_string(),
            department: department.map(str::to_string),
            exp: 0,
            iat: 0,
            iss: String::new(),
            aud: String::new(),
        }
    }

    #[test]
    fn test_from_claims() {
        let user = CurrentUser::from_claims(&claims("INSPECTOR", Some("Garbage"))).unwrap();
        assert_eq!(user.id, 7);
        assert_eq!(user.role, Role::Inspector);
        assert_eq!(user.department, Some(Department::Garbage));
    }

    #[test]
    fn test_bad_role_is_invalid_token() {
        assert!(CurrentUser::from_claims(&claims("SUPERUSER", None)).is_err());
    }

    #[test]
    fn test_role_gates() {
        let admin = CurrentUser::from_claims(&claims("ADMIN", None)).unwrap();
        let citizen = CurrentUser::from_claims(&claims("USER", None)).unwrap();

        assert!(admin.require_admin().is_ok());
        assert!(admin.require_inspector().is_ok());
        assert!(citizen.require_admin().is_err());
        assert!(citizen.require_inspector().is_err());
    }
}
