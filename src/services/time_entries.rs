//! Time entry rules.
//!
//! Employees log their own hours under a few limits: nothing past the end
//! of the current work week, no overlapping intervals, a fixed lunch break on
//! the first entry of a day and at most eight worked hours per day. Their
//! own entries stay editable for a short window after creation. Admins are
//! exempt from the break and daily limits and from the edit window.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};

use super::error::{found, ServiceError, ServiceResult};
use crate::db::FullRepository;
use crate::models::{
    net_minutes, DaySummary, NewTimeEntry, StatusType, TimeEntry, TimeEntryChanges,
    TimeEntryId, TimeEntryInput, User, UserId, MAX_BREAK_MINUTES, MAX_COMMENT_LEN,
};

/// Minutes after creation during which employees may change their own entries.
pub const EDIT_WINDOW_MINUTES: i64 = 30;
/// Break forced onto the first entry of a day.
pub const FIRST_ENTRY_BREAK_MINUTES: i32 = 60;
/// Upper bound of an employee's net work per day.
pub const MAX_DAILY_WORK_MINUTES: i32 = 480;

/// Message of the 403 returned once the edit window has passed.
pub const EDIT_TIME_EXPIRED: &str = "EDIT_TIME_EXPIRED";

/// Last date entries may be created for: Friday of the current week, or
/// today on weekends.
pub fn work_week_end(today: NaiveDate) -> NaiveDate {
    let weekday = today.weekday().num_days_from_monday() as i64;
    let until_friday = (4 - weekday).max(0);
    today + Duration::days(until_friday)
}

fn validate_interval(start: NaiveTime, end: NaiveTime) -> ServiceResult<()> {
    if end <= start {
        return Err(ServiceError::validation("end_time must be after start_time"));
    }
    Ok(())
}

fn validate_fields(break_minutes: i32, comment: Option<&str>) -> ServiceResult<()> {
    if !(0..=MAX_BREAK_MINUTES).contains(&break_minutes) {
        return Err(ServiceError::validation(format!(
            "break_minutes must be between 0 and {}",
            MAX_BREAK_MINUTES
        )));
    }
    if comment.map_or(0, |c| c.chars().count()) > MAX_COMMENT_LEN {
        return Err(ServiceError::validation(format!(
            "Comment must be at most {} characters",
            MAX_COMMENT_LEN
        )));
    }
    Ok(())
}

/// Entries of one user on one date, ordered by start time.
pub async fn list_for_date(
    repo: &dyn FullRepository,
    user_id: UserId,
    date: NaiveDate,
) -> ServiceResult<Vec<TimeEntry>> {
    Ok(repo.list_time_entries(Some(user_id), date, date).await?)
}

/// Entries of one user in `from..=to`, ordered by date and start time.
pub async fn list_for_range(
    repo: &dyn FullRepository,
    user_id: UserId,
    from: NaiveDate,
    to: NaiveDate,
) -> ServiceResult<Vec<TimeEntry>> {
    if to < from {
        return Err(ServiceError::validation("date_to must not be before date_from"));
    }
    Ok(repo.list_time_entries(Some(user_id), from, to).await?)
}

pub async fn day_summary(
    repo: &dyn FullRepository,
    user_id: UserId,
    date: NaiveDate,
) -> ServiceResult<DaySummary> {
    let entries = list_for_date(repo, user_id, date).await?;
    Ok(DaySummary::from_entries(date, entries))
}

async fn ensure_no_overlap(
    repo: &dyn FullRepository,
    user_id: UserId,
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
    exclude: Option<TimeEntryId>,
) -> ServiceResult<()> {
    let entries = list_for_date(repo, user_id, date).await?;
    let clash = entries
        .iter()
        .filter(|e| Some(e.id) != exclude)
        .any(|e| e.overlaps(start, end));
    if clash {
        return Err(ServiceError::validation("Time entry overlaps with existing entry"));
    }
    Ok(())
}

/// Create an entry owned by `owner` on behalf of `actor`.
///
/// Leave days block entries when users log their own time. The break and
/// daily limits apply unless the actor is an admin.
pub async fn create_entry(
    repo: &dyn FullRepository,
    actor: &User,
    owner: UserId,
    mut input: TimeEntryInput,
    today: NaiveDate,
) -> ServiceResult<TimeEntry> {
    validate_interval(input.start_time, input.end_time)?;
    validate_fields(input.break_minutes, input.comment.as_deref())?;

    if actor.id == owner {
        if let Some(status) = repo.get_day_status_for_date(owner, input.date).await? {
            if matches!(status.status, StatusType::Sick | StatusType::Vacation) {
                return Err(ServiceError::validation(format!(
                    "Cannot create time entry for a day marked as {}",
                    status.status
                )));
            }
        }
    }

    if !actor.is_admin() {
        let existing = list_for_date(repo, owner, input.date).await?;
        input.break_minutes = if existing.is_empty() {
            FIRST_ENTRY_BREAK_MINUTES
        } else {
            0
        };
        let worked: i32 = existing.iter().map(TimeEntry::duration_minutes).sum();
        let added = net_minutes(input.start_time, input.end_time, input.break_minutes);
        if worked + added > MAX_DAILY_WORK_MINUTES {
            return Err(ServiceError::validation(
                "Maximum total work time per day is 8 hours",
            ));
        }
    }

    if input.date > work_week_end(today) {
        return Err(ServiceError::validation(
            "Cannot create time entries beyond current week",
        ));
    }

    ensure_no_overlap(repo, owner, input.date, input.start_time, input.end_time, None).await?;

    let entry: NewTimeEntry = input.for_user(owner);
    let created = repo.create_time_entry(entry).await?;
    log::debug!("User {} logged entry {} on {}", owner, created.id, created.date);
    Ok(created)
}

async fn load_for(
    repo: &dyn FullRepository,
    actor: &User,
    id: TimeEntryId,
    action: &str,
) -> ServiceResult<TimeEntry> {
    let entry = found(repo.get_time_entry(id).await?, "Time entry")?;
    if entry.user_id != actor.id && !actor.is_admin() {
        return Err(ServiceError::forbidden(format!(
            "Not authorized to {} this entry",
            action
        )));
    }
    Ok(entry)
}

fn check_edit_window(actor: &User, entry: &TimeEntry, now: DateTime<Utc>) -> ServiceResult<()> {
    if !actor.is_admin()
        && entry.user_id == actor.id
        && now - entry.created_at > Duration::minutes(EDIT_WINDOW_MINUTES)
    {
        return Err(ServiceError::forbidden(EDIT_TIME_EXPIRED));
    }
    Ok(())
}

pub async fn get_entry(
    repo: &dyn FullRepository,
    actor: &User,
    id: TimeEntryId,
) -> ServiceResult<TimeEntry> {
    load_for(repo, actor, id, "access").await
}

pub async fn update_entry(
    repo: &dyn FullRepository,
    actor: &User,
    id: TimeEntryId,
    mut changes: TimeEntryChanges,
    now: DateTime<Utc>,
) -> ServiceResult<TimeEntry> {
    let mut entry = load_for(repo, actor, id, "update").await?;
    check_edit_window(actor, &entry, now)?;
    if !actor.is_admin() {
        changes.break_minutes = None;
    }

    let touches_interval = changes.touches_interval();
    entry.apply(&changes);
    validate_interval(entry.start_time, entry.end_time)?;
    validate_fields(entry.break_minutes, entry.comment.as_deref())?;

    if touches_interval {
        ensure_no_overlap(
            repo,
            entry.user_id,
            entry.date,
            entry.start_time,
            entry.end_time,
            Some(entry.id),
        )
        .await?;
    }

    Ok(repo.update_time_entry(entry).await?)
}

pub async fn delete_entry(
    repo: &dyn FullRepository,
    actor: &User,
    id: TimeEntryId,
    now: DateTime<Utc>,
) -> ServiceResult<()> {
    let entry = load_for(repo, actor, id, "delete").await?;
    check_edit_window(actor, &entry, now)?;
    repo.delete_time_entry(entry.id).await?;
    Ok(())
}
