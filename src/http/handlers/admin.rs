//! Admin: employee management, per-employee records and statistics.

use axum::{extract::State, http::StatusCode, Json};

use super::HandlerResult;
use crate::http::dto::{ActiveOnlyQuery, EmployeeStatsQuery, RequiredRangeQuery, StatsQuery};
use crate::http::error::AppError;
use crate::http::extract::{ApiJson, ApiPath, ApiQuery, CurrentAdmin, CurrentUser};
use crate::http::state::AppState;
use crate::models::{
    DayStatus, DayStatusId, DayStatusInput, Employee, EmployeeProfile, ProfileChanges, TimeEntry,
    TimeEntryInput, User, UserId,
};
use crate::services::stats::{self, StatsResponse, StatsSummary};
use crate::services::users::{self, EmployeeCreate, EmployeeUpdate};
use crate::services::{day_status, local_today, time_entries};

// =============================================================================
// Employees
// =============================================================================

/// GET /admin/employees?active_only
pub async fn list_employees(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    ApiQuery(query): ApiQuery<ActiveOnlyQuery>,
) -> HandlerResult<Vec<Employee>> {
    Ok(Json(
        users::list_employees(state.repo(), query.active_only).await?,
    ))
}

/// POST /admin/employees
pub async fn create_employee(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    ApiJson(input): ApiJson<EmployeeCreate>,
) -> Result<(StatusCode, Json<Employee>), AppError> {
    let employee = users::create_employee(state.repo(), input).await?;
    Ok((StatusCode::CREATED, Json(employee)))
}

/// GET /admin/employees/{id}
pub async fn get_employee(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    ApiPath(id): ApiPath<UserId>,
) -> HandlerResult<Employee> {
    Ok(Json(users::get_employee(state.repo(), id).await?))
}

/// PUT /admin/employees/{id}
pub async fn update_employee(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    ApiPath(id): ApiPath<UserId>,
    ApiJson(update): ApiJson<EmployeeUpdate>,
) -> HandlerResult<Employee> {
    Ok(Json(users::update_employee(state.repo(), id, update).await?))
}

/// DELETE /admin/employees/{id}
pub async fn delete_employee(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
    ApiPath(id): ApiPath<UserId>,
) -> Result<StatusCode, AppError> {
    if admin.id == id {
        return Err(AppError::BadRequest(
            "Cannot delete your own account".to_string(),
        ));
    }
    users::delete_employee(state.repo(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /admin/employees/{id}/profile
pub async fn update_employee_profile(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    ApiPath(id): ApiPath<UserId>,
    ApiJson(changes): ApiJson<ProfileChanges>,
) -> HandlerResult<EmployeeProfile> {
    Ok(Json(users::update_profile(state.repo(), id, changes).await?))
}

/// PATCH /admin/employees/{id}/activate
pub async fn activate_employee(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    ApiPath(id): ApiPath<UserId>,
) -> HandlerResult<User> {
    Ok(Json(users::set_active(state.repo(), id, true).await?))
}

/// PATCH /admin/employees/{id}/deactivate
pub async fn deactivate_employee(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
    ApiPath(id): ApiPath<UserId>,
) -> HandlerResult<User> {
    if admin.id == id {
        return Err(AppError::BadRequest(
            "Cannot deactivate your own account".to_string(),
        ));
    }
    Ok(Json(users::set_active(state.repo(), id, false).await?))
}

// =============================================================================
// Records of one employee
// =============================================================================

/// GET /admin/employees/{id}/time-entries?date_from&date_to
pub async fn employee_time_entries(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    ApiPath(id): ApiPath<UserId>,
    ApiQuery(query): ApiQuery<RequiredRangeQuery>,
) -> HandlerResult<Vec<TimeEntry>> {
    users::get_user(state.repo(), id).await?;
    Ok(Json(
        time_entries::list_for_range(state.repo(), id, query.date_from, query.date_to).await?,
    ))
}

/// POST /admin/employees/{id}/time-entries
///
/// Admin rules apply: no work-week horizon, no daily maximum, explicit breaks.
pub async fn create_employee_time_entry(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
    ApiPath(id): ApiPath<UserId>,
    ApiJson(input): ApiJson<TimeEntryInput>,
) -> Result<(StatusCode, Json<TimeEntry>), AppError> {
    users::get_user(state.repo(), id).await?;
    let entry = time_entries::create_entry(state.repo(), &admin, id, input, local_today()).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// POST /admin/employees/{id}/day-status
pub async fn set_employee_day_status(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    ApiPath(id): ApiPath<UserId>,
    ApiJson(input): ApiJson<DayStatusInput>,
) -> Result<(StatusCode, Json<DayStatus>), AppError> {
    users::get_user(state.repo(), id).await?;
    let status = day_status::set_status(state.repo(), id, input).await?;
    Ok((StatusCode::CREATED, Json(status)))
}

/// DELETE /admin/employees/{id}/day-status/{status_id}
pub async fn delete_employee_day_status(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    ApiPath((id, status_id)): ApiPath<(UserId, DayStatusId)>,
) -> Result<StatusCode, AppError> {
    day_status::delete_status_of(state.repo(), id, status_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Statistics
// =============================================================================

/// GET /stats/me?period&date_from&date_to
pub async fn my_stats(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiQuery(query): ApiQuery<StatsQuery>,
) -> HandlerResult<StatsResponse> {
    Ok(Json(
        stats::user_stats(
            state.repo(),
            user.id,
            query.period,
            query.date_from,
            query.date_to,
            local_today(),
        )
        .await?,
    ))
}

/// GET /admin/stats?user_id&period&date_from&date_to
pub async fn employee_stats(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    ApiQuery(query): ApiQuery<EmployeeStatsQuery>,
) -> HandlerResult<StatsResponse> {
    Ok(Json(
        stats::employee_stats(
            state.repo(),
            query.user_id,
            query.period,
            query.date_from,
            query.date_to,
            local_today(),
        )
        .await?,
    ))
}

/// GET /admin/stats/summary?period&date_from&date_to
pub async fn stats_summary(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    ApiQuery(query): ApiQuery<StatsQuery>,
) -> HandlerResult<StatsSummary> {
    Ok(Json(
        stats::summary(
            state.repo(),
            query.period,
            query.date_from,
            query.date_to,
            local_today(),
        )
        .await?,
    ))
}
