//! In-app notifications and preferences.

use axum::{extract::State, Json};

use super::HandlerResult;
use crate::http::dto::{CountResponse, MessageResponse, NotificationsQuery};
use crate::http::extract::{ApiJson, ApiPath, ApiQuery, CurrentAdmin, CurrentUser};
use crate::http::state::AppState;
use crate::models::{
    Notification, NotificationId, NotificationSettings, NotificationSettingsUpdate,
};
use crate::services::local_today;
use crate::services::notifications::{self, EventCheckReport, DEFAULT_LIST_LIMIT};

/// GET /notifications?unread_only&limit
pub async fn list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiQuery(query): ApiQuery<NotificationsQuery>,
) -> HandlerResult<Vec<Notification>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT);
    Ok(Json(
        notifications::list(state.repo(), user.id, query.unread_only, limit).await?,
    ))
}

/// GET /notifications/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> HandlerResult<CountResponse> {
    let count = notifications::unread_count(state.repo(), user.id).await?;
    Ok(Json(CountResponse { count }))
}

/// POST /notifications/{id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<NotificationId>,
) -> HandlerResult<MessageResponse> {
    notifications::mark_read(state.repo(), user.id, id).await?;
    Ok(Json(MessageResponse::new("Notification marked as read")))
}

/// POST /notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> HandlerResult<CountResponse> {
    let count = notifications::mark_all_read(state.repo(), user.id).await?;
    Ok(Json(CountResponse { count }))
}

/// GET /notifications/settings
pub async fn get_settings(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> HandlerResult<NotificationSettings> {
    Ok(Json(notifications::get_settings(state.repo(), user.id).await?))
}

/// PUT /notifications/settings
pub async fn update_settings(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(update): ApiJson<NotificationSettingsUpdate>,
) -> HandlerResult<NotificationSettings> {
    Ok(Json(
        notifications::update_settings(state.repo(), user.id, update).await?,
    ))
}

/// POST /notifications/admin/check-events
pub async fn check_events(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
) -> HandlerResult<EventCheckReport> {
    Ok(Json(
        notifications::check_events(state.repo(), &state.mail, local_today()).await?,
    ))
}
