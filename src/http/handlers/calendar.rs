//! Holiday calendar.

use axum::{extract::State, Json};

use super::HandlerResult;
use crate::http::dto::{MonthQuery, RequiredDateQuery, RequiredRangeQuery};
use crate::http::extract::{ApiQuery, CurrentUser};
use crate::http::state::AppState;
use crate::models::CalendarDay;
use crate::services::calendar;

/// GET /calendar/month?year&month
pub async fn month(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiQuery(query): ApiQuery<MonthQuery>,
) -> HandlerResult<Vec<CalendarDay>> {
    Ok(Json(
        calendar::get_month(state.repo(), query.year, query.month).await?,
    ))
}

/// GET /calendar/day?date
pub async fn day(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiQuery(query): ApiQuery<RequiredDateQuery>,
) -> HandlerResult<CalendarDay> {
    Ok(Json(calendar::get_day(state.repo(), query.date).await?))
}

/// GET /calendar/working-days?date_from&date_to
pub async fn working_days(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiQuery(query): ApiQuery<RequiredRangeQuery>,
) -> HandlerResult<Vec<CalendarDay>> {
    Ok(Json(
        calendar::get_working_days(state.repo(), query.date_from, query.date_to).await?,
    ))
}
