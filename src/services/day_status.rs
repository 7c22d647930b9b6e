//! Whole-day statuses: sick, vacation, excused, or explicitly normal.
//!
//! One status per user and date; creating a status for a date that already
//! has one overwrites it. Employees may only touch today and later.

use chrono::NaiveDate;
use serde::Deserialize;

use super::error::{found, ServiceError, ServiceResult};
use crate::db::FullRepository;
use crate::models::{
    dates_between, DayStatus, DayStatusChanges, DayStatusId, DayStatusInput, StatusType, User,
    UserId, MAX_COMMENT_LEN,
};

/// Sick leave over a date range.
#[derive(Debug, Clone, Deserialize)]
pub struct SickDayRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub note: Option<String>,
}

fn check_note(note: Option<&str>) -> ServiceResult<()> {
    if note.map_or(0, |n| n.chars().count()) > MAX_COMMENT_LEN {
        return Err(ServiceError::validation(format!(
            "Note must be at most {} characters",
            MAX_COMMENT_LEN
        )));
    }
    Ok(())
}

pub async fn list_for_range(
    repo: &dyn FullRepository,
    user_id: UserId,
    from: NaiveDate,
    to: NaiveDate,
) -> ServiceResult<Vec<DayStatus>> {
    Ok(repo.list_day_statuses(Some(user_id), from, to).await?)
}

/// All sick days of a user, latest first.
pub async fn sick_days(repo: &dyn FullRepository, user_id: UserId) -> ServiceResult<Vec<DayStatus>> {
    Ok(repo.list_day_statuses_of_type(user_id, StatusType::Sick).await?)
}

pub async fn status_for_date(
    repo: &dyn FullRepository,
    user_id: UserId,
    date: NaiveDate,
) -> ServiceResult<DayStatus> {
    repo.get_day_status_for_date(user_id, date)
        .await?
        .ok_or_else(|| ServiceError::not_found("No status for this date"))
}

/// Create or overwrite the status of `(user_id, input.date)`.
pub async fn set_status(
    repo: &dyn FullRepository,
    user_id: UserId,
    input: DayStatusInput,
) -> ServiceResult<DayStatus> {
    check_note(input.note.as_deref())?;
    Ok(repo
        .upsert_day_status(user_id, input.date, input.status, input.note)
        .await?)
}

/// Mark every date of the range as sick.
pub async fn set_sick_range(
    repo: &dyn FullRepository,
    user_id: UserId,
    range: SickDayRange,
) -> ServiceResult<Vec<DayStatus>> {
    if range.start_date > range.end_date {
        return Err(ServiceError::validation("Start date must be before end date"));
    }
    check_note(range.note.as_deref())?;

    let mut statuses = Vec::new();
    for date in dates_between(range.start_date, range.end_date) {
        statuses.push(
            repo.upsert_day_status(user_id, date, StatusType::Sick, range.note.clone())
                .await?,
        );
    }
    log::debug!(
        "User {} sick from {} to {}",
        user_id,
        range.start_date,
        range.end_date
    );
    Ok(statuses)
}

async fn load_for(
    repo: &dyn FullRepository,
    actor: &User,
    id: DayStatusId,
    action: &str,
) -> ServiceResult<DayStatus> {
    let status = found(repo.get_day_status(id).await?, "Day status")?;
    if status.user_id != actor.id && !actor.is_admin() {
        return Err(ServiceError::forbidden(format!(
            "Not authorized to {} this status",
            action
        )));
    }
    Ok(status)
}

pub async fn update_status(
    repo: &dyn FullRepository,
    actor: &User,
    id: DayStatusId,
    changes: DayStatusChanges,
    today: NaiveDate,
) -> ServiceResult<DayStatus> {
    let mut status = load_for(repo, actor, id, "update").await?;

    if !actor.is_admin() {
        if status.date < today {
            return Err(ServiceError::validation(
                "Cannot modify day status for a past date",
            ));
        }
        if changes.date.is_some_and(|d| d < today) {
            return Err(ServiceError::validation("New date cannot be in the past"));
        }
    }
    check_note(changes.note.as_deref())?;

    if let Some(date) = changes.date {
        status.date = date;
    }
    if let Some(kind) = changes.status {
        status.status = kind;
    }
    if changes.note.is_some() {
        status.note = changes.note;
    }
    Ok(repo.update_day_status(status).await?)
}

pub async fn delete_status(
    repo: &dyn FullRepository,
    actor: &User,
    id: DayStatusId,
    today: NaiveDate,
) -> ServiceResult<()> {
    let status = load_for(repo, actor, id, "delete").await?;
    if !actor.is_admin() && status.date <= today {
        return Err(ServiceError::validation(
            "Cannot delete day status for today or past dates. You can only edit future dates.",
        ));
    }
    repo.delete_day_status(id).await?;
    Ok(())
}

/// Admin removal of a status that must belong to `user_id`.
pub async fn delete_status_of(
    repo: &dyn FullRepository,
    user_id: UserId,
    id: DayStatusId,
) -> ServiceResult<()> {
    let status = found(repo.get_day_status(id).await?, "Day status")?;
    if status.user_id != user_id {
        return Err(ServiceError::validation(
            "Day status does not belong to this employee",
        ));
    }
    repo.delete_day_status(id).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_length() {
        assert!(check_note(None).is_ok());
        assert!(check_note(Some(&"n".repeat(500))).is_ok());
        assert!(check_note(Some(&"n".repeat(501))).is_err());
    }
}
