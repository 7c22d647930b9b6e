//! Reminders run by the background jobs.
//!
//! `check_missing_entries` nags users who left recent working days empty;
//! `weekly_planning` asks users to plan office and remote days for the week.

use std::collections::HashSet;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use super::calendar;
use super::error::ServiceResult;
use super::mailer::EmailService;
use super::notifications::notified_on;
use super::presence::week_start;
use super::users::list_employees;
use crate::db::FullRepository;
use crate::models::{
    ApprovalStatus, DayStatus, NewNotification, NotificationType, StatusType, UserId, Vacation,
};

/// Working days inspected for missing entries, ending yesterday.
pub const DAYS_TO_CHECK: usize = 5;

/// Leave lookups over a date window for every user at once.
struct LeaveCalendar {
    statuses: Vec<DayStatus>,
    vacations: Vec<Vacation>,
}

impl LeaveCalendar {
    async fn load(repo: &dyn FullRepository, from: NaiveDate, to: NaiveDate) -> ServiceResult<Self> {
        Ok(Self {
            statuses: repo.list_day_statuses(None, from, to).await?,
            vacations: repo
                .list_vacations_overlapping(None, from, to)
                .await?
                .into_iter()
                .filter(|v| v.status == ApprovalStatus::Approved)
                .collect(),
        })
    }

    /// Sick or vacation day status, or an approved vacation covering the date.
    fn on_leave(&self, user_id: UserId, date: NaiveDate) -> bool {
        self.statuses.iter().any(|s| {
            s.user_id == user_id
                && s.date == date
                && matches!(s.status, StatusType::Sick | StatusType::Vacation)
        }) || self
            .vacations
            .iter()
            .any(|v| v.user_id == user_id && v.covers(date))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReminderReport {
    pub checked_users: usize,
    pub notifications_created: usize,
    pub emails_sent: usize,
}

fn day_month_list(dates: &[NaiveDate]) -> String {
    dates
        .iter()
        .map(|d| d.format("%d.%m").to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Notify active users about working days without any time entry.
///
/// Looks at the last [`DAYS_TO_CHECK`] working days up to yesterday. Users
/// on leave today are skipped, as are days they were on leave. At most one
/// notification per user and day.
pub async fn check_missing_entries(
    repo: &dyn FullRepository,
    mail: &EmailService,
    today: NaiveDate,
) -> ServiceResult<ReminderReport> {
    let yesterday = today - Duration::days(1);
    let mut days = calendar::last_working_days(repo, DAYS_TO_CHECK, yesterday).await?;
    days.sort();
    let Some(&first) = days.first() else {
        return Ok(ReminderReport::default());
    };

    let employees = list_employees(repo, true).await?;
    let leave = LeaveCalendar::load(repo, first, today).await?;
    let logged: HashSet<(UserId, NaiveDate)> = repo
        .list_time_entries(None, first, yesterday)
        .await?
        .into_iter()
        .map(|e| (e.user_id, e.date))
        .collect();

    log::info!("Checking {} users for dates {:?}", employees.len(), days);
    let mut report = ReminderReport {
        checked_users: employees.len(),
        ..Default::default()
    };

    for employee in &employees {
        let id = employee.user.id;
        if leave.on_leave(id, today) {
            log::debug!("Skipping user {}: currently on leave", id);
            continue;
        }
        let missing: Vec<NaiveDate> = days
            .iter()
            .copied()
            .filter(|d| !leave.on_leave(id, *d) && !logged.contains(&(id, *d)))
            .collect();
        if missing.is_empty() {
            continue;
        }
        if notified_on(repo, id, NotificationType::MissingEntry, None, today).await? {
            log::debug!("User {} already reminded today", id);
            continue;
        }
        let Some(profile) = employee.profile.as_ref() else {
            continue;
        };

        let message = serde_json::json!({
            "dates": day_month_list(&missing),
            "count": missing.len(),
        })
        .to_string();
        repo.create_notification(NewNotification::new(
            id,
            NotificationType::MissingEntry,
            "notification.missingEntry.title",
            message,
        ))
        .await?;
        report.notifications_created += 1;

        let email = mail.missing_entries_message(&employee.user.email, &profile.full_name(), &missing);
        if mail.send(email).await {
            report.emails_sent += 1;
        }
    }

    log::info!("Missing entries check completed: {:?}", report);
    Ok(report)
}

/// Email users who have not planned any working day of the current week.
///
/// Users on leave for every working day of the week are left alone. Mail
/// goes to the work address when the profile has one.
pub async fn weekly_planning(
    repo: &dyn FullRepository,
    mail: &EmailService,
    today: NaiveDate,
) -> ServiceResult<ReminderReport> {
    let monday = week_start(today);
    let friday = monday + Duration::days(4);
    let working: Vec<NaiveDate> = calendar::get_working_days(repo, monday, friday)
        .await?
        .into_iter()
        .map(|d| d.date)
        .collect();
    if working.is_empty() {
        log::info!("No working days in week of {}, skipping planning reminders", monday);
        return Ok(ReminderReport::default());
    }

    let employees = list_employees(repo, true).await?;
    let leave = LeaveCalendar::load(repo, monday, friday).await?;
    let planned: HashSet<UserId> = repo
        .list_workplace_plans(None, monday, friday)
        .await?
        .into_iter()
        .filter(|p| working.contains(&p.date))
        .map(|p| p.user_id)
        .collect();

    let mut report = ReminderReport {
        checked_users: employees.len(),
        ..Default::default()
    };
    for employee in &employees {
        let id = employee.user.id;
        if working.iter().all(|d| leave.on_leave(id, *d)) {
            log::debug!("Skipping user {}: on leave the whole week", id);
            continue;
        }
        if planned.contains(&id) {
            continue;
        }
        let Some(profile) = employee.profile.as_ref() else {
            continue;
        };
        let email = mail.weekly_planning_message(
            employee.contact_email(),
            &profile.full_name(),
            monday,
            friday,
        );
        if mail.send(email).await {
            report.emails_sent += 1;
        }
    }

    log::info!("Weekly planning reminders for {}: {:?}", monday, report);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_month_list() {
        let dates = [
            NaiveDate::from_ymd_opt(2025, 3, 6).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 7).unwrap(),
        ];
        assert_eq!(day_month_list(&dates), "06.03, 07.03");
        assert_eq!(day_month_list(&[]), "");
    }
}
