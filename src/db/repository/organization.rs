//! Departments and company settings.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{CompanySetting, Department, DepartmentId};

#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    /// Departments ordered by name.
    async fn list_departments(&self) -> RepositoryResult<Vec<Department>>;

    async fn get_department(&self, id: DepartmentId) -> RepositoryResult<Option<Department>>;

    /// # Returns
    /// * `Err(RepositoryError::Duplicate)` - If the name is already used
    async fn create_department(&self, name: &str, is_default: bool)
        -> RepositoryResult<Department>;

    async fn delete_department(&self, id: DepartmentId) -> RepositoryResult<bool>;

    async fn list_company_settings(&self) -> RepositoryResult<Vec<CompanySetting>>;

    /// Create or overwrite a setting. `None` clears the value but keeps the key.
    async fn set_company_setting(
        &self,
        key: &str,
        value: Option<String>,
    ) -> RepositoryResult<CompanySetting>;
}
