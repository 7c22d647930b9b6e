//! Departments and company-wide display settings.

use serde::Deserialize;

use super::error::{found, ServiceError, ServiceResult};
use crate::db::FullRepository;
use crate::models::{
    is_icon_key, is_valid_icon, CompanySettings, Department, DepartmentId, IconSettingsUpdate,
    LOGO_URL_KEY,
};

const MAX_DEPARTMENT_NAME_LEN: usize = 100;

#[derive(Debug, Clone, Deserialize)]
pub struct DepartmentCreate {
    pub name: String,
}

pub async fn list_departments(repo: &dyn FullRepository) -> ServiceResult<Vec<Department>> {
    Ok(repo.list_departments().await?)
}

pub async fn create_department(
    repo: &dyn FullRepository,
    input: DepartmentCreate,
) -> ServiceResult<Department> {
    let name = input.name.trim();
    if name.is_empty() || name.chars().count() > MAX_DEPARTMENT_NAME_LEN {
        return Err(ServiceError::validation(format!(
            "Department name must be between 1 and {} characters",
            MAX_DEPARTMENT_NAME_LEN
        )));
    }
    if repo.list_departments().await?.iter().any(|d| d.name == name) {
        return Err(ServiceError::validation(
            "Department with this name already exists",
        ));
    }
    Ok(repo.create_department(name, false).await?)
}

/// Delete a department added by an admin; seeded defaults stay.
pub async fn delete_department(repo: &dyn FullRepository, id: DepartmentId) -> ServiceResult<()> {
    let department = found(repo.get_department(id).await?, "Department")?;
    if department.is_default {
        return Err(ServiceError::validation("Cannot delete default department"));
    }
    repo.delete_department(id).await?;
    Ok(())
}

/// Logo and icons with defaults for anything never set.
pub async fn company_settings(repo: &dyn FullRepository) -> ServiceResult<CompanySettings> {
    let stored = repo.list_company_settings().await?;
    Ok(CompanySettings::from_settings(&stored))
}

/// Validate every icon first, then store them.
pub async fn update_icons(
    repo: &dyn FullRepository,
    update: IconSettingsUpdate,
) -> ServiceResult<CompanySettings> {
    let entries = update.entries();
    for (key, value) in &entries {
        if !is_icon_key(key) {
            return Err(ServiceError::validation(format!("Invalid icon type: {}", key)));
        }
        if !is_valid_icon(value) {
            return Err(ServiceError::validation(format!(
                "Icon '{}' is not in the allowed icons list",
                value
            )));
        }
    }
    for (key, value) in entries.into_iter().filter(|(_, v)| !v.is_empty()) {
        repo.set_company_setting(key, Some(value.to_string())).await?;
    }
    company_settings(repo).await
}

pub async fn set_logo(repo: &dyn FullRepository, logo_url: &str) -> ServiceResult<CompanySettings> {
    let logo_url = logo_url.trim();
    if logo_url.is_empty() {
        return Err(ServiceError::validation("logo_url must not be empty"));
    }
    repo.set_company_setting(LOGO_URL_KEY, Some(logo_url.to_string()))
        .await?;
    company_settings(repo).await
}

pub async fn delete_logo(repo: &dyn FullRepository) -> ServiceResult<()> {
    repo.set_company_setting(LOGO_URL_KEY, None).await?;
    Ok(())
}
