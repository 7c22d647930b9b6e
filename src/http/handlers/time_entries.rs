//! Time entries of the calling user.

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;

use super::HandlerResult;
use crate::http::dto::{DateQuery, TimeEntriesQuery};
use crate::http::error::AppError;
use crate::http::extract::{ApiJson, ApiPath, ApiQuery, CurrentUser};
use crate::http::state::AppState;
use crate::models::{DaySummary, TimeEntry, TimeEntryChanges, TimeEntryId, TimeEntryInput};
use crate::services::{local_today, time_entries};

/// GET /time-entries?date | date_from&date_to
pub async fn list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiQuery(query): ApiQuery<TimeEntriesQuery>,
) -> HandlerResult<Vec<TimeEntry>> {
    let entries = match (query.date_from, query.date_to) {
        (Some(from), Some(to)) => {
            time_entries::list_for_range(state.repo(), user.id, from, to).await?
        }
        _ => {
            let date = query.date.unwrap_or_else(local_today);
            time_entries::list_for_date(state.repo(), user.id, date).await?
        }
    };
    Ok(Json(entries))
}

/// GET /time-entries/day-summary?date
pub async fn day_summary(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiQuery(query): ApiQuery<DateQuery>,
) -> HandlerResult<DaySummary> {
    let date = query.date.unwrap_or_else(local_today);
    Ok(Json(
        time_entries::day_summary(state.repo(), user.id, date).await?,
    ))
}

/// POST /time-entries
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(input): ApiJson<TimeEntryInput>,
) -> Result<(StatusCode, Json<TimeEntry>), AppError> {
    let entry =
        time_entries::create_entry(state.repo(), &user, user.id, input, local_today()).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// GET /time-entries/{id}
pub async fn get(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<TimeEntryId>,
) -> HandlerResult<TimeEntry> {
    Ok(Json(time_entries::get_entry(state.repo(), &user, id).await?))
}

/// PUT /time-entries/{id}
pub async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<TimeEntryId>,
    ApiJson(changes): ApiJson<TimeEntryChanges>,
) -> HandlerResult<TimeEntry> {
    Ok(Json(
        time_entries::update_entry(state.repo(), &user, id, changes, Utc::now()).await?,
    ))
}

/// DELETE /time-entries/{id}
pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<TimeEntryId>,
) -> Result<StatusCode, AppError> {
    time_entries::delete_entry(state.repo(), &user, id, Utc::now()).await?;
    Ok(StatusCode::NO_CONTENT)
}
