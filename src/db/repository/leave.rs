//! Day statuses and vacations.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::error::RepositoryResult;
use crate::models::{DayStatus, DayStatusId, NewVacation, StatusType, UserId, Vacation, VacationId};

/// Whole-day markers. A user has at most one status per date.
#[async_trait]
pub trait DayStatusRepository: Send + Sync {
    /// Insert the status for `(user_id, date)` or overwrite status and note
    /// of the existing row.
    async fn upsert_day_status(
        &self,
        user_id: UserId,
        date: NaiveDate,
        status: StatusType,
        note: Option<String>,
    ) -> RepositoryResult<DayStatus>;

    async fn get_day_status(&self, id: DayStatusId) -> RepositoryResult<Option<DayStatus>>;

    async fn get_day_status_for_date(
        &self,
        user_id: UserId,
        date: NaiveDate,
    ) -> RepositoryResult<Option<DayStatus>>;

    /// Statuses dated within `from..=to` ordered by date; `None` covers every user.
    async fn list_day_statuses(
        &self,
        user_id: Option<UserId>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepositoryResult<Vec<DayStatus>>;

    /// Every status of one kind for a user, newest date first.
    async fn list_day_statuses_of_type(
        &self,
        user_id: UserId,
        status: StatusType,
    ) -> RepositoryResult<Vec<DayStatus>>;

    /// Persist every field of an existing status.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If the status doesn't exist
    /// * `Err(RepositoryError::Duplicate)` - If the user already has a status on the new date
    async fn update_day_status(&self, status: DayStatus) -> RepositoryResult<DayStatus>;

    async fn delete_day_status(&self, id: DayStatusId) -> RepositoryResult<bool>;

    /// Remove statuses of one kind within `from..=to`, returning how many were removed.
    async fn delete_day_statuses_in_range(
        &self,
        user_id: UserId,
        from: NaiveDate,
        to: NaiveDate,
        status: StatusType,
    ) -> RepositoryResult<usize>;
}

#[async_trait]
pub trait VacationRepository: Send + Sync {
    async fn create_vacation(&self, vacation: NewVacation) -> RepositoryResult<Vacation>;

    async fn get_vacation(&self, id: VacationId) -> RepositoryResult<Option<Vacation>>;

    /// All vacations of a user, latest start first.
    async fn list_vacations(&self, user_id: UserId) -> RepositoryResult<Vec<Vacation>>;

    /// Vacations intersecting `from..=to`, ordered by start date.
    ///
    /// `user_id = None` covers every user.
    async fn list_vacations_overlapping(
        &self,
        user_id: Option<UserId>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepositoryResult<Vec<Vacation>>;

    async fn update_vacation(&self, vacation: Vacation) -> RepositoryResult<Vacation>;

    async fn delete_vacation(&self, id: VacationId) -> RepositoryResult<bool>;
}
