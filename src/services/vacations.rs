//! Vacations and their day statuses.
//!
//! Every day of a vacation carries a `vacation` day status. Creating,
//! moving and deleting a vacation keeps those statuses in step.

use chrono::NaiveDate;

use super::error::{found, ServiceError, ServiceResult};
use crate::db::FullRepository;
use crate::models::{
    dates_between, ApprovalStatus, NewVacation, StatusType, User, UserId, Vacation,
    VacationChanges, VacationId, VacationInput, MAX_COMMENT_LEN,
};

fn check_dates(from: NaiveDate, to: NaiveDate) -> ServiceResult<()> {
    if to < from {
        return Err(ServiceError::validation(
            "date_to must be after or equal to date_from",
        ));
    }
    Ok(())
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

async fn ensure_no_overlap(
    repo: &dyn FullRepository,
    user_id: UserId,
    from: NaiveDate,
    to: NaiveDate,
    exclude: Option<VacationId>,
) -> ServiceResult<()> {
    let clash = repo
        .list_vacations_overlapping(Some(user_id), from, to)
        .await?
        .iter()
        .any(|v| Some(v.id) != exclude);
    if clash {
        return Err(ServiceError::validation("Vacation overlaps with existing vacation"));
    }
    Ok(())
}

async fn mark_days(
    repo: &dyn FullRepository,
    user_id: UserId,
    from: NaiveDate,
    to: NaiveDate,
) -> ServiceResult<()> {
    for date in dates_between(from, to) {
        let note = repo
            .get_day_status_for_date(user_id, date)
            .await?
            .and_then(|s| s.note);
        repo.upsert_day_status(user_id, date, StatusType::Vacation, note)
            .await?;
    }
    Ok(())
}

async fn unmark_days(
    repo: &dyn FullRepository,
    user_id: UserId,
    from: NaiveDate,
    to: NaiveDate,
) -> ServiceResult<usize> {
    Ok(repo
        .delete_day_statuses_in_range(user_id, from, to, StatusType::Vacation)
        .await?)
}

/// Vacations of a user, latest first, or those touching `year` in date order.
pub async fn list_vacations(
    repo: &dyn FullRepository,
    user_id: UserId,
    year: Option<i32>,
) -> ServiceResult<Vec<Vacation>> {
    match year {
        Some(year) => {
            let (first, last) = NaiveDate::from_ymd_opt(year, 1, 1)
                .zip(NaiveDate::from_ymd_opt(year, 12, 31))
                .ok_or_else(|| ServiceError::validation("Invalid year"))?;
            Ok(repo
                .list_vacations_overlapping(Some(user_id), first, last)
                .await?)
        }
        None => Ok(repo.list_vacations(user_id).await?),
    }
}

/// Approved vacation covering `today`, if any.
pub async fn current_vacation(
    repo: &dyn FullRepository,
    user_id: UserId,
    today: NaiveDate,
) -> ServiceResult<Vacation> {
    repo.list_vacations_overlapping(Some(user_id), today, today)
        .await?
        .into_iter()
        .find(|v| v.status == ApprovalStatus::Approved)
        .ok_or_else(|| ServiceError::not_found("No active vacation"))
}

/// Create an approved vacation and mark its days.
pub async fn create_vacation(
    repo: &dyn FullRepository,
    user_id: UserId,
    input: VacationInput,
) -> ServiceResult<Vacation> {
    check_dates(input.date_from, input.date_to)?;
    check_note(input.note.as_deref())?;
    ensure_no_overlap(repo, user_id, input.date_from, input.date_to, None).await?;

    let vacation = repo
        .create_vacation(NewVacation {
            user_id,
            date_from: input.date_from,
            date_to: input.date_to,
            status: ApprovalStatus::Approved,
            note: input.note,
        })
        .await?;
    mark_days(repo, user_id, vacation.date_from, vacation.date_to).await?;

    log::info!(
        "Vacation {} for user {}: {} days",
        vacation.id,
        user_id,
        vacation.days_count()
    );
    Ok(vacation)
}

async fn load_for(
    repo: &dyn FullRepository,
    actor: &User,
    id: VacationId,
    action: &str,
) -> ServiceResult<Vacation> {
    let vacation = found(repo.get_vacation(id).await?, "Vacation")?;
    if vacation.user_id != actor.id && !actor.is_admin() {
        return Err(ServiceError::forbidden(format!(
            "Not authorized to {} this vacation",
            action
        )));
    }
    Ok(vacation)
}

pub async fn get_vacation(
    repo: &dyn FullRepository,
    actor: &User,
    id: VacationId,
) -> ServiceResult<Vacation> {
    load_for(repo, actor, id, "access").await
}

/// Apply changes without ownership or date-window rules, resyncing day
/// statuses when the range moves.
pub async fn apply_changes(
    repo: &dyn FullRepository,
    mut vacation: Vacation,
    changes: VacationChanges,
) -> ServiceResult<Vacation> {
    let new_from = changes.date_from.unwrap_or(vacation.date_from);
    let new_to = changes.date_to.unwrap_or(vacation.date_to);
    check_dates(new_from, new_to)?;
    check_note(changes.note.as_deref())?;

    let moved = new_from != vacation.date_from || new_to != vacation.date_to;
    if moved {
        ensure_no_overlap(repo, vacation.user_id, new_from, new_to, Some(vacation.id)).await?;
        unmark_days(repo, vacation.user_id, vacation.date_from, vacation.date_to).await?;
        mark_days(repo, vacation.user_id, new_from, new_to).await?;
    }

    vacation.date_from = new_from;
    vacation.date_to = new_to;
    if let Some(status) = changes.status {
        vacation.status = status;
    }
    if changes.note.is_some() {
        vacation.note = changes.note;
    }
    Ok(repo.update_vacation(vacation).await?)
}

/// Employee-facing update.
///
/// Non-admins cannot touch a vacation that has ended, cannot move the start
/// of one that has begun, and cannot move either end into the past.
pub async fn update_vacation(
    repo: &dyn FullRepository,
    actor: &User,
    id: VacationId,
    changes: VacationChanges,
    today: NaiveDate,
) -> ServiceResult<Vacation> {
    let vacation = load_for(repo, actor, id, "update").await?;

    if !actor.is_admin() {
        if vacation.date_to < today {
            return Err(ServiceError::validation(
                "Cannot modify a vacation that has already ended",
            ));
        }
        if vacation.date_from < today && changes.date_from.is_some() {
            return Err(ServiceError::validation(
                "Cannot change start date of an ongoing vacation",
            ));
        }
        if changes.date_from.is_some_and(|d| d < today) {
            return Err(ServiceError::validation("Start date cannot be in the past"));
        }
        if vacation.date_from <= today && changes.date_to.is_some_and(|d| d < today) {
            return Err(ServiceError::validation(
                "End date cannot be in the past for an ongoing vacation",
            ));
        }
    }

    apply_changes(repo, vacation, changes).await
}

/// Delete a vacation and the vacation statuses of its days.
pub async fn remove(repo: &dyn FullRepository, vacation: &Vacation) -> ServiceResult<()> {
    unmark_days(repo, vacation.user_id, vacation.date_from, vacation.date_to).await?;
    repo.delete_vacation(vacation.id).await?;
    Ok(())
}

pub async fn delete_vacation(
    repo: &dyn FullRepository,
    actor: &User,
    id: VacationId,
    today: NaiveDate,
) -> ServiceResult<()> {
    let vacation = load_for(repo, actor, id, "delete").await?;
    if !actor.is_admin() && vacation.date_from <= today {
        return Err(ServiceError::validation(
            "Cannot delete a vacation that has already started. You can only edit it.",
        ));
    }
    remove(repo, &vacation).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_check() {
        let d = |day| NaiveDate::from_ymd_opt(2025, 8, day).unwrap();
        assert!(check_dates(d(3), d(3)).is_ok());
        assert!(check_dates(d(3), d(2)).is_err());
    }
}
