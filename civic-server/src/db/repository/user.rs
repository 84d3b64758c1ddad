//! User Repository

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{UserCreate, UserRecord};
use crate::db::next_numeric_id;
use crate::utils::time::now_millis;
use shared::types::{Department, Role};

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All accounts, oldest first
    pub async fn find_all(&self) -> RepoResult<Vec<UserRecord>> {
        let users: Vec<UserRecord> = self
            .base
            .db()
            .query("SELECT * FROM user ORDER BY user_id")
            .await?
            .take(0)?;
        Ok(users)
    }

    pub async fn find_by_id(&self, user_id: i64) -> RepoResult<Option<UserRecord>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM user WHERE user_id = $user_id LIMIT 1")
            .bind(("user_id", user_id))
            .await?;
        let users: Vec<UserRecord> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<UserRecord>> {
        let email_owned = email.to_lowercase();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM user WHERE email = $email LIMIT 1")
            .bind(("email", email_owned))
            .await?;
        let users: Vec<UserRecord> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Approved inspectors of one department, in id order.
    /// The ordering is what makes round-robin assignment deterministic.
    pub async fn find_inspectors(&self, department: Department) -> RepoResult<Vec<UserRecord>> {
        let mut result = self
            .base
            .db()
            .query(
                r#"SELECT * FROM user
                    WHERE role = $role
                    AND department = $department
                    AND is_approved = true
                ORDER BY user_id"#,
            )
            .bind(("role", Role::Inspector))
            .bind(("department", department))
            .await?;
        let users: Vec<UserRecord> = result.take(0)?;
        Ok(users)
    }

    /// Create a new account
    pub async fn create(&self, data: UserCreate) -> RepoResult<UserRecord> {
        let email = data.email.to_lowercase();

        // Check duplicate email
        if self.find_by_email(&email).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Email '{}' is already registered",
                email
            )));
        }

        let hash_pass = UserRecord::hash_password(&data.password)
            .map_err(|e| RepoError::Database(format!("Failed to hash password: {}", e)))?;

        let record = UserRecord {
            user_id: next_numeric_id(),
            name: data.name,
            email,
            hash_pass,
            role: data.role,
            department: data.department,
            is_approved: true,
            created_at: now_millis(),
        };

        // hash_pass is skip_serializing on the record, so bind fields explicitly
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE user SET
                    user_id = $user_id,
                    name = $name,
                    email = $email,
                    hash_pass = $hash_pass,
                    role = $role,
                    department = $department,
                    is_approved = $is_approved,
                    created_at = $created_at
                RETURN AFTER"#,
            )
            .bind(("user_id", record.user_id))
            .bind(("name", record.name.clone()))
            .bind(("email", record.email.clone()))
            .bind(("hash_pass", record.hash_pass.clone()))
            .bind(("role", record.role))
            .bind(("department", record.department))
            .bind(("is_approved", record.is_approved))
            .bind(("created_at", record.created_at))
            .await?;

        let created: Option<UserRecord> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create user".to_string()))
    }

    /// Hard delete an account
    pub async fn delete(&self, user_id: i64) -> RepoResult<bool> {
        let existing = self
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("User {} not found", user_id)))?;

        self.base
            .db()
            .query("DELETE FROM user WHERE user_id = $user_id")
            .bind(("user_id", existing.user_id))
            .await?;
        Ok(true)
    }
}
