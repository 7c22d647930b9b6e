//! In-app notifications and per-user notification preferences.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ChangeRequestId, NotificationId, UserId};

/// Longest notification title.
pub const MAX_TITLE_LEN: usize = 200;

crate::define_text_enum! {
    pub enum NotificationType {
        Birthday => "birthday",
        NameDay => "name_day",
        ChangeRequest => "change_request",
        WeeklyReminder => "weekly_reminder",
        MissingEntry => "missing_entry",
        System => "system",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub related_user_id: Option<UserId>,
    pub related_request_id: Option<ChangeRequestId>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub user_id: UserId,
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub related_user_id: Option<UserId>,
    pub related_request_id: Option<ChangeRequestId>,
}

impl NewNotification {
    pub fn new(
        user_id: UserId,
        kind: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let mut title: String = title.into();
        if title.chars().count() > MAX_TITLE_LEN {
            title = title.chars().take(MAX_TITLE_LEN).collect();
        }
        Self {
            user_id,
            kind,
            title,
            message: message.into(),
            related_user_id: None,
            related_request_id: None,
        }
    }

    pub fn related_user(mut self, user_id: UserId) -> Self {
        self.related_user_id = Some(user_id);
        self
    }

    pub fn related_request(mut self, request_id: ChangeRequestId) -> Self {
        self.related_request_id = Some(request_id);
        self
    }
}

/// Per-user switches for email and in-app notifications.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationSettings {
    pub user_id: UserId,
    pub email_birthday: bool,
    pub email_name_day: bool,
    pub email_change_request: bool,
    pub email_weekly_reminder: bool,
    pub app_birthday: bool,
    pub app_name_day: bool,
    pub app_change_request: bool,
    pub app_weekly_reminder: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NotificationSettings {
    /// Settings a user gets before changing anything.
    pub fn defaults_for(user_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            email_birthday: true,
            email_name_day: true,
            email_change_request: true,
            email_weekly_reminder: false,
            app_birthday: true,
            app_name_day: true,
            app_change_request: true,
            app_weekly_reminder: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, update: &NotificationSettingsUpdate) {
        let fields = [
            (&mut self.email_birthday, update.email_birthday),
            (&mut self.email_name_day, update.email_name_day),
            (&mut self.email_change_request, update.email_change_request),
            (&mut self.email_weekly_reminder, update.email_weekly_reminder),
            (&mut self.app_birthday, update.app_birthday),
            (&mut self.app_name_day, update.app_name_day),
            (&mut self.app_change_request, update.app_change_request),
            (&mut self.app_weekly_reminder, update.app_weekly_reminder),
        ];
        for (field, value) in fields {
            if let Some(value) = value {
                *field = value;
            }
        }
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct NotificationSettingsUpdate {
    pub email_birthday: Option<bool>,
    pub email_name_day: Option<bool>,
    pub email_change_request: Option<bool>,
    pub email_weekly_reminder: Option<bool>,
    pub app_birthday: Option<bool>,
    pub app_name_day: Option<bool>,
    pub app_change_request: Option<bool>,
    pub app_weekly_reminder: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_disable_weekly_email() {
        let settings = NotificationSettings::defaults_for(UserId::new(3));
        assert!(settings.email_birthday);
        assert!(!settings.email_weekly_reminder);
        assert!(settings.app_weekly_reminder);
    }

    #[test]
    fn test_partial_update_keeps_other_switches() {
        let mut settings = NotificationSettings::defaults_for(UserId::new(3));
        settings.apply(&NotificationSettingsUpdate {
            email_weekly_reminder: Some(true),
            app_birthday: Some(false),
            ..Default::default()
        });
        assert!(settings.email_weekly_reminder);
        assert!(!settings.app_birthday);
        assert!(settings.app_name_day);
    }

    #[test]
    fn test_notification_serializes_type_field() {
        let notification = Notification {
            id: NotificationId::new(1),
            user_id: UserId::new(2),
            kind: NotificationType::MissingEntry,
            title: "t".into(),
            message: "m".into(),
            is_read: false,
            related_user_id: None,
            related_request_id: None,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&notification).unwrap();
        assert_eq!(json["type"], "missing_entry");
    }

    #[test]
    fn test_long_title_is_truncated() {
        let n = NewNotification::new(UserId::new(1), NotificationType::System, "x".repeat(250), "");
        assert_eq!(n.title.len(), MAX_TITLE_LEN);
    }
}
