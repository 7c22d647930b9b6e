//! In-app notifications, notification preferences and the daily event check.

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use super::error::{ServiceError, ServiceResult};
use super::mailer::EmailService;
use super::presence::week_start;
use super::users::{list_admins, list_employees};
use super::local_day_bounds;
use crate::db::FullRepository;
use crate::models::{
    ApprovalStatus, ChangeRequest, Employee, NewNotification, Notification, NotificationId,
    NotificationSettings, NotificationSettingsUpdate, NotificationType, StatusType, UserId,
};

pub const DEFAULT_LIST_LIMIT: usize = 50;
pub const MAX_LIST_LIMIT: usize = 100;

/// Days ahead at which upcoming birthdays and name days are announced.
pub const ANNOUNCE_DAYS_AHEAD: i64 = 2;

pub async fn list(
    repo: &dyn FullRepository,
    user_id: UserId,
    unread_only: bool,
    limit: usize,
) -> ServiceResult<Vec<Notification>> {
    if limit > MAX_LIST_LIMIT {
        return Err(ServiceError::validation(format!(
            "limit must be at most {}",
            MAX_LIST_LIMIT
        )));
    }
    Ok(repo.list_notifications(user_id, unread_only, limit).await?)
}

pub async fn unread_count(repo: &dyn FullRepository, user_id: UserId) -> ServiceResult<usize> {
    Ok(repo.count_unread_notifications(user_id).await?)
}

pub async fn mark_read(
    repo: &dyn FullRepository,
    user_id: UserId,
    id: NotificationId,
) -> ServiceResult<()> {
    if !repo.mark_notification_read(user_id, id).await? {
        return Err(ServiceError::not_found("Notification not found"));
    }
    Ok(())
}

pub async fn mark_all_read(repo: &dyn FullRepository, user_id: UserId) -> ServiceResult<usize> {
    Ok(repo.mark_all_notifications_read(user_id).await?)
}

/// Stored preferences, or the defaults when the user never saved any.
async fn preferences(
    repo: &dyn FullRepository,
    user_id: UserId,
) -> ServiceResult<NotificationSettings> {
    Ok(repo
        .get_notification_settings(user_id)
        .await?
        .unwrap_or_else(|| NotificationSettings::defaults_for(user_id)))
}

/// Preferences of a user, storing the defaults on first access.
pub async fn get_settings(
    repo: &dyn FullRepository,
    user_id: UserId,
) -> ServiceResult<NotificationSettings> {
    if let Some(settings) = repo.get_notification_settings(user_id).await? {
        return Ok(settings);
    }
    Ok(repo
        .save_notification_settings(NotificationSettings::defaults_for(user_id))
        .await?)
}

pub async fn update_settings(
    repo: &dyn FullRepository,
    user_id: UserId,
    update: NotificationSettingsUpdate,
) -> ServiceResult<NotificationSettings> {
    let mut settings = preferences(repo, user_id).await?;
    settings.apply(&update);
    Ok(repo.save_notification_settings(settings).await?)
}

/// Whether `user_id` already got a notification of `kind` on `date`.
pub(crate) async fn notified_on(
    repo: &dyn FullRepository,
    user_id: UserId,
    kind: NotificationType,
    related_user_id: Option<UserId>,
    date: NaiveDate,
) -> ServiceResult<bool> {
    notified_between(repo, user_id, kind, related_user_id, date, date).await
}

/// Same as [`notified_on`] over the local days `first..=last`.
async fn notified_between(
    repo: &dyn FullRepository,
    user_id: UserId,
    kind: NotificationType,
    related_user_id: Option<UserId>,
    first: NaiveDate,
    last: NaiveDate,
) -> ServiceResult<bool> {
    let (since, _) = local_day_bounds(first);
    let (_, until) = local_day_bounds(last);
    Ok(repo
        .notification_exists(user_id, kind, related_user_id, since, until)
        .await?)
}

/// Tell every active admin about a new change request, in the app and by email.
pub async fn notify_admins_change_request(
    repo: &dyn FullRepository,
    mail: &EmailService,
    requester: &Employee,
    request: &ChangeRequest,
) -> ServiceResult<usize> {
    let employee_name = requester.display_name();
    let message = serde_json::json!({
        "employee_name": employee_name,
        "request_type": request.request_type,
    })
    .to_string();

    let mut created = 0;
    for admin in list_admins(repo).await? {
        let settings = preferences(repo, admin.user.id).await?;

        if settings.app_change_request {
            repo.create_notification(
                NewNotification::new(
                    admin.user.id,
                    NotificationType::ChangeRequest,
                    "notification.changeRequest.title",
                    message.clone(),
                )
                .related_user(request.user_id)
                .related_request(request.id),
            )
            .await?;
            created += 1;
        }

        if settings.email_change_request && mail.is_enabled() {
            let email = mail.change_request_message(
                &admin.user.email,
                &admin.display_name(),
                &employee_name,
                request.request_type.as_str(),
                request.date,
                &request.reason,
            );
            mail.send(email).await;
        }
    }
    Ok(created)
}

/// Counts of notifications created by [`check_events`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EventCheckReport {
    pub birthday_notifications: usize,
    pub name_day_notifications: usize,
    pub weekly_reminder_notifications: usize,
    pub total: usize,
}

fn same_day_of_year(a: NaiveDate, b: NaiveDate) -> bool {
    a.month() == b.month() && a.day() == b.day()
}

#[derive(Clone, Copy)]
enum Occasion {
    Birthday,
    NameDay,
}

impl Occasion {
    fn kind(self) -> NotificationType {
        match self {
            Occasion::Birthday => NotificationType::Birthday,
            Occasion::NameDay => NotificationType::NameDay,
        }
    }

    fn date_of(self, employee: &Employee) -> Option<NaiveDate> {
        let profile = employee.profile.as_ref()?;
        match self {
            Occasion::Birthday => profile.birthday,
            Occasion::NameDay => profile.name_day,
        }
    }

    fn enabled(self, settings: &NotificationSettings) -> bool {
        match self {
            Occasion::Birthday => settings.app_birthday,
            Occasion::NameDay => settings.app_name_day,
        }
    }

    /// Title and message for the occasion, today or `ANNOUNCE_DAYS_AHEAD` days out.
    fn text(self, name: &str, upcoming: Option<NaiveDate>) -> (String, String) {
        let (emoji, label, noun) = match self {
            Occasion::Birthday => ("🎂", "Birthday", "birthday"),
            Occasion::NameDay => ("🎉", "Name Day", "name day"),
        };
        match upcoming {
            None => (
                format!("{} {} Today!", emoji, label),
                format!("{} has a {} today!", name, noun),
            ),
            Some(date) => (
                format!("{} Upcoming {}", emoji, label),
                format!(
                    "{} will have a {} in {} days ({})",
                    name,
                    noun,
                    ANNOUNCE_DAYS_AHEAD,
                    date.format("%B %d")
                ),
            ),
        }
    }
}

async fn announce(
    repo: &dyn FullRepository,
    occasion: Occasion,
    employees: &[Employee],
    admins: &[Employee],
    today: NaiveDate,
) -> ServiceResult<usize> {
    let ahead = today + Duration::days(ANNOUNCE_DAYS_AHEAD);
    let mut created = 0;

    for employee in employees {
        let Some(date) = occasion.date_of(employee) else {
            continue;
        };
        let upcoming = if same_day_of_year(date, today) {
            None
        } else if same_day_of_year(date, ahead) {
            Some(ahead)
        } else {
            continue;
        };
        let (title, message) = occasion.text(&employee.display_name(), upcoming);

        for admin in admins {
            if !occasion.enabled(&preferences(repo, admin.user.id).await?) {
                continue;
            }
            if notified_on(repo, admin.user.id, occasion.kind(), Some(employee.user.id), today)
                .await?
            {
                continue;
            }
            repo.create_notification(
                NewNotification::new(admin.user.id, occasion.kind(), title.clone(), message.clone())
                    .related_user(employee.user.id),
            )
            .await?;
            created += 1;
        }
    }
    Ok(created)
}

/// Whether the user has a sick day or an approved vacation in Monday..Friday of the week.
async fn away_this_week(
    repo: &dyn FullRepository,
    user_id: UserId,
    today: NaiveDate,
) -> ServiceResult<bool> {
    let monday = week_start(today);
    let friday = monday + Duration::days(4);

    let sick = repo
        .list_day_statuses(Some(user_id), monday, friday)
        .await?
        .iter()
        .any(|s| s.status == StatusType::Sick);
    if sick {
        return Ok(true);
    }
    Ok(repo
        .list_vacations_overlapping(Some(user_id), monday, friday)
        .await?
        .iter()
        .any(|v| v.status == ApprovalStatus::Approved))
}

/// Monday planning reminder in the app. Users who also opted in to the email
/// get it together with a newly created reminder.
async fn weekly_reminders(
    repo: &dyn FullRepository,
    mail: &EmailService,
    employees: &[Employee],
    today: NaiveDate,
) -> ServiceResult<usize> {
    if today.weekday().num_days_from_monday() != 0 {
        return Ok(0);
    }
    let friday = today + Duration::days(4);
    let mut created = 0;

    for employee in employees {
        let id = employee.user.id;
        if away_this_week(repo, id, today).await? {
            log::info!("Skipping weekly reminder for user {}: sick or on vacation", id);
            continue;
        }
        // At most one reminder per week
        let sunday = today + Duration::days(6);
        if notified_between(repo, id, NotificationType::WeeklyReminder, None, today, sunday).await? {
            continue;
        }
        let settings = preferences(repo, id).await?;
        if !settings.app_weekly_reminder {
            continue;
        }
        repo.create_notification(NewNotification::new(
            id,
            NotificationType::WeeklyReminder,
            "📅 Weekly Planning Reminder",
            "Don't forget to plan your workplace schedule for this week!",
        ))
        .await?;
        created += 1;

        // The notification above is what keeps a second run from mailing again.
        if settings.email_weekly_reminder && mail.is_enabled() {
            let email = mail.weekly_planning_message(
                &employee.user.email,
                &employee.display_name(),
                today,
                friday,
            );
            mail.send(email).await;
        }
    }
    Ok(created)
}

/// Birthdays and name days for admins, and the Monday planning reminder.
///
/// Running it twice on the same day creates nothing new.
pub async fn check_events(
    repo: &dyn FullRepository,
    mail: &EmailService,
    today: NaiveDate,
) -> ServiceResult<EventCheckReport> {
    let employees = list_employees(repo, true).await?;
    let admins: Vec<Employee> = employees.iter().filter(|e| e.user.is_admin()).cloned().collect();

    let (birthdays, name_days) = if admins.is_empty() {
        (0, 0)
    } else {
        (
            announce(repo, Occasion::Birthday, &employees, &admins, today).await?,
            announce(repo, Occasion::NameDay, &employees, &admins, today).await?,
        )
    };
    let weekly = weekly_reminders(repo, mail, &employees, today).await?;

    let report = EventCheckReport {
        birthday_notifications: birthdays,
        name_day_notifications: name_days,
        weekly_reminder_notifications: weekly,
        total: birthdays + name_days + weekly,
    };
    log::info!("Notification event check for {}: {:?}", today, report);
    Ok(report)
}
