//! User Model

use serde::{Deserialize, Serialize};
use shared::models::UserPublic;
use shared::types::{Department, Role};

use crate::utils::time::millis_to_rfc3339;

/// Account record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub hash_pass: String,
    pub role: Role,
    #[serde(default)]
    pub department: Option<Department>,
    #[serde(default = "default_true")]
    pub is_approved: bool,
    pub created_at: i64,
}

fn default_true() -> bool {
    true
}

/// Create user payload
#[derive(Debug, Clone)]
pub struct UserCreate {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub department: Option<Department>,
}

impl UserRecord {
    /// Verify password using argon2
    pub fn verify_password(&self, password: &str) -> Result<bool, argon2::password_hash::Error> {
        use argon2::{
            Argon2,
            password_hash::{PasswordHash, PasswordVerifier},
        };

        let parsed_hash = PasswordHash::new(&self.hash_pass)?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash password using argon2
    pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
        use argon2::{
            Argon2,
            password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
        };

        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let password_hash = argon2.hash_password(password.as_bytes(), &salt)?;
        Ok(password_hash.to_string())
    }

    /// Public view without the password hash
    pub fn to_public(&self) -> UserPublic {
        UserPublic {
            id: self.user_id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            department: self.department,
            is_approved: self.is_approved,
            created_at: Some(millis_to_rfc3339(self.created_at)),
        }
    }
}
