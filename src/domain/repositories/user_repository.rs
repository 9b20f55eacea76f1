//! Repository trait for user accounts and permissions.

use crate::domain::entities::{Permission, User};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for users.
///
/// Returned users always carry their granted permissions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Creates an active user with no permissions.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the username is taken.
    async fn create(&self, username: &str, password_hash: &str) -> Result<User, AppError>;

    /// Finds a user by username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Finds a user by id.
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;

    /// Lists all users ordered by username.
    async fn list(&self) -> Result<Vec<User>, AppError>;

    /// Grants a permission. Granting twice is a no-op.
    async fn grant_permission(&self, user_id: i64, permission: Permission)
    -> Result<(), AppError>;

    /// Revokes a permission. Returns `Ok(false)` if it was not granted.
    async fn revoke_permission(
        &self,
        user_id: i64,
        permission: Permission,
    ) -> Result<bool, AppError>;
}
