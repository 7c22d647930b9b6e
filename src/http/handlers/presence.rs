//! Workplace plans and who is where.

use axum::{extract::State, http::StatusCode, Json};
use chrono::NaiveDate;

use super::HandlerResult;
use crate::http::dto::{DateQuery, RequiredDateQuery, RequiredRangeQuery};
use crate::http::error::AppError;
use crate::http::extract::{ApiJson, ApiPath, ApiQuery, CurrentUser};
use crate::http::state::AppState;
use crate::models::{WorkplacePlan, WorkplacePlanInput};
use crate::services::local_today;
use crate::services::presence::{self, DailyOverview, DayPresence, WeekPresence};

/// GET /workplace-plans?date_from&date_to
pub async fn list_plans(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiQuery(query): ApiQuery<RequiredRangeQuery>,
) -> HandlerResult<Vec<WorkplacePlan>> {
    Ok(Json(
        presence::list_plans(state.repo(), user.id, query.date_from, query.date_to).await?,
    ))
}

/// GET /workplace-plans/date?date
///
/// `null` when nothing is planned.
pub async fn plan_for_date(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiQuery(query): ApiQuery<RequiredDateQuery>,
) -> HandlerResult<Option<WorkplacePlan>> {
    Ok(Json(
        presence::plan_for_date(state.repo(), user.id, query.date).await?,
    ))
}

/// POST /workplace-plans
pub async fn set_plan(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(input): ApiJson<WorkplacePlanInput>,
) -> Result<(StatusCode, Json<WorkplacePlan>), AppError> {
    let plan = presence::set_plan(state.repo(), user.id, input).await?;
    Ok((StatusCode::CREATED, Json(plan)))
}

/// DELETE /workplace-plans/{date}
pub async fn delete_plan(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(date): ApiPath<NaiveDate>,
) -> Result<StatusCode, AppError> {
    presence::delete_plan(state.repo(), user.id, date).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /office?date
pub async fn office(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiQuery(query): ApiQuery<DateQuery>,
) -> HandlerResult<DayPresence> {
    let date = query.date.unwrap_or_else(local_today);
    Ok(Json(presence::office_presence(state.repo(), date).await?))
}

/// GET /office/week?date
pub async fn office_week(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiQuery(query): ApiQuery<DateQuery>,
) -> HandlerResult<WeekPresence> {
    let date = query.date.unwrap_or_else(local_today);
    Ok(Json(presence::week_presence(state.repo(), date).await?))
}

/// GET /office/all-employees?date
pub async fn all_employees(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiQuery(query): ApiQuery<DateQuery>,
) -> HandlerResult<DailyOverview> {
    let date = query.date.unwrap_or_else(local_today);
    Ok(Json(presence::daily_overview(state.repo(), date).await?))
}
