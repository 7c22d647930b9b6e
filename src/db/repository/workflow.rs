//! Change requests and notifications.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::error::RepositoryResult;
use crate::models::{
    ApprovalStatus, ChangeRequest, ChangeRequestId, NewChangeRequest, NewNotification,
    Notification, NotificationId, NotificationSettings, NotificationType, UserId,
};

/// Selection of change requests; `None` fields do not filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeRequestFilter {
    pub user_id: Option<UserId>,
    pub status: Option<ApprovalStatus>,
    pub limit: Option<usize>,
    pub offset: usize,
}

impl ChangeRequestFilter {
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: Option<ApprovalStatus>) -> Self {
        self.status = status;
        self
    }

    pub fn page(mut self, limit: usize, offset: usize) -> Self {
        self.limit = Some(limit);
        self.offset = offset;
        self
    }
}

#[async_trait]
pub trait ChangeRequestRepository: Send + Sync {
    async fn create_change_request(
        &self,
        request: NewChangeRequest,
    ) -> RepositoryResult<ChangeRequest>;

    async fn get_change_request(
        &self,
        id: ChangeRequestId,
    ) -> RepositoryResult<Option<ChangeRequest>>;

    /// Matching requests, newest first, paged by the filter's limit and offset.
    async fn list_change_requests(
        &self,
        filter: &ChangeRequestFilter,
    ) -> RepositoryResult<Vec<ChangeRequest>>;

    /// Number of matching requests, ignoring limit and offset.
    async fn count_change_requests(&self, filter: &ChangeRequestFilter) -> RepositoryResult<usize>;

    async fn update_change_request(&self, request: ChangeRequest)
        -> RepositoryResult<ChangeRequest>;

    async fn delete_change_request(&self, id: ChangeRequestId) -> RepositoryResult<bool>;
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn create_notification(
        &self,
        notification: NewNotification,
    ) -> RepositoryResult<Notification>;

    /// Notifications of a user, newest first.
    async fn list_notifications(
        &self,
        user_id: UserId,
        unread_only: bool,
        limit: usize,
    ) -> RepositoryResult<Vec<Notification>>;

    async fn count_unread_notifications(&self, user_id: UserId) -> RepositoryResult<usize>;

    /// Mark one notification read; `false` if it doesn't exist or belongs to someone else.
    async fn mark_notification_read(
        &self,
        user_id: UserId,
        id: NotificationId,
    ) -> RepositoryResult<bool>;

    async fn mark_all_notifications_read(&self, user_id: UserId) -> RepositoryResult<usize>;

    /// Whether a notification of `kind` was created for `user_id` within
    /// `since..until`, optionally about `related_user_id`.
    async fn notification_exists(
        &self,
        user_id: UserId,
        kind: NotificationType,
        related_user_id: Option<UserId>,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> RepositoryResult<bool>;

    async fn get_notification_settings(
        &self,
        user_id: UserId,
    ) -> RepositoryResult<Option<NotificationSettings>>;

    async fn save_notification_settings(
        &self,
        settings: NotificationSettings,
    ) -> RepositoryResult<NotificationSettings>;
}
