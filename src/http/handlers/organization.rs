//! Departments and company settings.

use axum::{extract::State, http::StatusCode, Json};

use super::HandlerResult;
use crate::http::dto::{AllowedIconsResponse, LogoRequest};
use crate::http::error::AppError;
use crate::http::extract::{ApiJson, ApiPath, CurrentAdmin, CurrentUser};
use crate::http::state::AppState;
use crate::models::{CompanySettings, Department, DepartmentId, IconSettingsUpdate, ALLOWED_ICONS};
use crate::services::organization::{self, DepartmentCreate};

/// GET /departments
pub async fn list_departments(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> HandlerResult<Vec<Department>> {
    Ok(Json(organization::list_departments(state.repo()).await?))
}

/// POST /departments
pub async fn create_department(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    ApiJson(input): ApiJson<DepartmentCreate>,
) -> HandlerResult<Department> {
    Ok(Json(organization::create_department(state.repo(), input).await?))
}

/// DELETE /departments/{id}
pub async fn delete_department(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    ApiPath(id): ApiPath<DepartmentId>,
) -> Result<StatusCode, AppError> {
    organization::delete_department(state.repo(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /admin/settings
pub async fn settings(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
) -> HandlerResult<CompanySettings> {
    Ok(Json(organization::company_settings(state.repo()).await?))
}

/// GET /admin/settings/icons/allowed
pub async fn allowed_icons(_admin: CurrentAdmin) -> HandlerResult<AllowedIconsResponse> {
    Ok(Json(AllowedIconsResponse {
        icons: ALLOWED_ICONS.iter().map(|i| i.to_string()).collect(),
    }))
}

/// PUT /admin/settings/icons
pub async fn update_icons(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    ApiJson(update): ApiJson<IconSettingsUpdate>,
) -> HandlerResult<CompanySettings> {
    Ok(Json(organization::update_icons(state.repo(), update).await?))
}

/// PUT /admin/settings/logo
pub async fn set_logo(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    ApiJson(request): ApiJson<LogoRequest>,
) -> HandlerResult<CompanySettings> {
    Ok(Json(
        organization::set_logo(state.repo(), &request.logo_url).await?,
    ))
}

/// DELETE /admin/settings/logo
pub async fn delete_logo(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
) -> Result<StatusCode, AppError> {
    organization::delete_logo(state.repo()).await?;
    Ok(StatusCode::NO_CONTENT)
}
