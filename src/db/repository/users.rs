//! Accounts and employee profiles.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{EmployeeProfile, NewUser, User, UserChanges, UserId};

/// Repository trait for user accounts and their profiles.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait UserRepository: Send + Sync {
    // ==================== Health & Connection ====================

    /// Check if the storage backend is reachable.
    ///
    /// # Returns
    /// - `Ok(true)` if connection is healthy
    /// - `Ok(false)` if connection is unhealthy but no error occurred
    /// - `Err(RepositoryError)` if an error occurred during the check
    async fn health_check(&self) -> RepositoryResult<bool>;

    // ==================== Users ====================

    /// Insert a new user.
    ///
    /// # Returns
    /// * `Ok(User)` - The stored user with its assigned id
    /// * `Err(RepositoryError::Duplicate)` - If the email is already taken
    async fn create_user(&self, user: NewUser) -> RepositoryResult<User>;

    async fn get_user(&self, id: UserId) -> RepositoryResult<Option<User>>;

    /// Look a user up by email, ignoring case.
    async fn get_user_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;

    /// List users ordered by id, optionally only active ones.
    async fn list_users(&self, active_only: bool) -> RepositoryResult<Vec<User>>;

    /// Apply a partial update.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If the user doesn't exist
    /// * `Err(RepositoryError::Duplicate)` - If a new email is already taken
    async fn update_user(&self, id: UserId, changes: UserChanges) -> RepositoryResult<User>;

    /// Delete a user and every record owned by it.
    ///
    /// Returns `false` when the user did not exist.
    async fn delete_user(&self, id: UserId) -> RepositoryResult<bool>;

    // ==================== Profiles ====================

    async fn get_profile(&self, user_id: UserId) -> RepositoryResult<Option<EmployeeProfile>>;

    /// Insert or replace the profile of `profile.user_id`.
    async fn save_profile(&self, profile: EmployeeProfile) -> RepositoryResult<EmployeeProfile>;

    async fn list_profiles(&self) -> RepositoryResult<Vec<EmployeeProfile>>;
}
