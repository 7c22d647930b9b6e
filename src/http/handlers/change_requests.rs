//! Change requests: employee side and admin review.

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;

use super::HandlerResult;
use crate::http::dto::{ChangeRequestsQuery, CountResponse, StatusFilterQuery};
use crate::http::error::AppError;
use crate::http::extract::{ApiJson, ApiPath, ApiQuery, CurrentAdmin, CurrentUser};
use crate::http::state::AppState;
use crate::models::{ChangeRequestId, ChangeRequestInput, ChangeRequestResolution};
use crate::services::change_requests::{
    self, ChangeRequestList, ChangeRequestView, DEFAULT_PAGE_SIZE,
};

/// GET /change-requests/my?status
pub async fn list_mine(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiQuery(query): ApiQuery<StatusFilterQuery>,
) -> HandlerResult<Vec<ChangeRequestView>> {
    Ok(Json(
        change_requests::list_mine(state.repo(), user.id, query.status).await?,
    ))
}

/// POST /change-requests
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(input): ApiJson<ChangeRequestInput>,
) -> HandlerResult<ChangeRequestView> {
    Ok(Json(
        change_requests::create(state.repo(), &state.mail, &user, input).await?,
    ))
}

/// DELETE /change-requests/{id}
pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<ChangeRequestId>,
) -> Result<StatusCode, AppError> {
    change_requests::delete(state.repo(), user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /change-requests/admin/all?status&limit&offset
pub async fn list_all(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    ApiQuery(query): ApiQuery<ChangeRequestsQuery>,
) -> HandlerResult<ChangeRequestList> {
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE);
    Ok(Json(
        change_requests::list_all(state.repo(), query.status, limit, query.offset).await?,
    ))
}

/// GET /change-requests/admin/pending-count
pub async fn pending_count(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
) -> HandlerResult<CountResponse> {
    let count = change_requests::pending_count(state.repo()).await?;
    Ok(Json(CountResponse { count }))
}

/// PUT /change-requests/admin/{id}
pub async fn resolve(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
    ApiPath(id): ApiPath<ChangeRequestId>,
    ApiJson(resolution): ApiJson<ChangeRequestResolution>,
) -> HandlerResult<ChangeRequestView> {
    Ok(Json(
        change_requests::resolve(state.repo(), &admin, id, resolution, Utc::now()).await?,
    ))
}
