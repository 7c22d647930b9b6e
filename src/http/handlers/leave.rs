//! Day statuses and vacations of the calling user.

use axum::{extract::State, http::StatusCode, Json};
use chrono::Datelike;

use super::HandlerResult;
use crate::http::dto::{RangeQuery, RequiredDateQuery, YearQuery};
use crate::http::error::AppError;
use crate::http::extract::{ApiJson, ApiPath, ApiQuery, CurrentUser};
use crate::http::state::AppState;
use crate::models::{
    DayStatus, DayStatusChanges, DayStatusId, DayStatusInput, Vacation, VacationChanges,
    VacationId, VacationInput,
};
use crate::services::calendar::month_bounds;
use crate::services::day_status::{self, SickDayRange};
use crate::services::{local_today, vacations};

// =============================================================================
// Day status
// =============================================================================

/// GET /day-status?date_from&date_to
///
/// Defaults to the current month.
pub async fn list_statuses(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiQuery(query): ApiQuery<RangeQuery>,
) -> HandlerResult<Vec<DayStatus>> {
    let today = local_today();
    let (month_first, month_last) = month_bounds(today.year(), today.month())?;
    let from = query.date_from.unwrap_or(month_first);
    let to = query.date_to.unwrap_or(month_last);
    Ok(Json(
        day_status::list_for_range(state.repo(), user.id, from, to).await?,
    ))
}

/// GET /day-status/my-sick-days
pub async fn my_sick_days(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> HandlerResult<Vec<DayStatus>> {
    Ok(Json(day_status::sick_days(state.repo(), user.id).await?))
}

/// GET /day-status/date?date
pub async fn status_for_date(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiQuery(query): ApiQuery<RequiredDateQuery>,
) -> HandlerResult<DayStatus> {
    Ok(Json(
        day_status::status_for_date(state.repo(), user.id, query.date).await?,
    ))
}

/// POST /day-status
pub async fn set_status(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(input): ApiJson<DayStatusInput>,
) -> Result<(StatusCode, Json<DayStatus>), AppError> {
    let status = day_status::set_status(state.repo(), user.id, input).await?;
    Ok((StatusCode::CREATED, Json(status)))
}

/// POST /day-status/sick-day
pub async fn set_sick_days(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(range): ApiJson<SickDayRange>,
) -> Result<(StatusCode, Json<Vec<DayStatus>>), AppError> {
    let statuses = day_status::set_sick_range(state.repo(), user.id, range).await?;
    Ok((StatusCode::CREATED, Json(statuses)))
}

/// PUT /day-status/{id}
pub async fn update_status(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<DayStatusId>,
    ApiJson(changes): ApiJson<DayStatusChanges>,
) -> HandlerResult<DayStatus> {
    Ok(Json(
        day_status::update_status(state.repo(), &user, id, changes, local_today()).await?,
    ))
}

/// DELETE /day-status/{id}
pub async fn delete_status(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<DayStatusId>,
) -> Result<StatusCode, AppError> {
    day_status::delete_status(state.repo(), &user, id, local_today()).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Vacations
// =============================================================================

/// GET /vacations?year
pub async fn list_vacations(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiQuery(query): ApiQuery<YearQuery>,
) -> HandlerResult<Vec<Vacation>> {
    Ok(Json(
        vacations::list_vacations(state.repo(), user.id, query.year).await?,
    ))
}

/// GET /vacations/current
pub async fn current_vacation(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> HandlerResult<Vacation> {
    Ok(Json(
        vacations::current_vacation(state.repo(), user.id, local_today()).await?,
    ))
}

/// POST /vacations
pub async fn create_vacation(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(input): ApiJson<VacationInput>,
) -> Result<(StatusCode, Json<Vacation>), AppError> {
    let vacation = vacations::create_vacation(state.repo(), user.id, input).await?;
    Ok((StatusCode::CREATED, Json(vacation)))
}

/// GET /vacations/{id}
pub async fn get_vacation(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<VacationId>,
) -> HandlerResult<Vacation> {
    Ok(Json(vacations::get_vacation(state.repo(), &user, id).await?))
}

/// PUT /vacations/{id}
pub async fn update_vacation(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<VacationId>,
    ApiJson(changes): ApiJson<VacationChanges>,
) -> HandlerResult<Vacation> {
    Ok(Json(
        vacations::update_vacation(state.repo(), &user, id, changes, local_today()).await?,
    ))
}

/// DELETE /vacations/{id}
pub async fn delete_vacation(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<VacationId>,
) -> Result<StatusCode, AppError> {
    vacations::delete_vacation(state.repo(), &user, id, local_today()).await?;
    Ok(StatusCode::NO_CONTENT)
}
