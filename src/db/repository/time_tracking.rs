//! Time entries and workplace plans.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::error::RepositoryResult;
use crate::models::{NewTimeEntry, TimeEntry, TimeEntryId, UserId, Workplace, WorkplacePlan};

#[async_trait]
pub trait TimeEntryRepository: Send + Sync {
    async fn create_time_entry(&self, entry: NewTimeEntry) -> RepositoryResult<TimeEntry>;

    async fn get_time_entry(&self, id: TimeEntryId) -> RepositoryResult<Option<TimeEntry>>;

    /// Entries dated within `from..=to`, ordered by date then start time.
    ///
    /// `user_id = None` returns entries of every user.
    async fn list_time_entries(
        &self,
        user_id: Option<UserId>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepositoryResult<Vec<TimeEntry>>;

    /// Persist every field of an existing entry.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If the entry doesn't exist
    async fn update_time_entry(&self, entry: TimeEntry) -> RepositoryResult<TimeEntry>;

    async fn delete_time_entry(&self, id: TimeEntryId) -> RepositoryResult<bool>;
}

/// Planned workplace per user and date (at most one plan per pair).
#[async_trait]
pub trait WorkplacePlanRepository: Send + Sync {
    /// Create the plan or overwrite the workplace of the existing one.
    async fn upsert_workplace_plan(
        &self,
        user_id: UserId,
        date: NaiveDate,
        workplace: Workplace,
    ) -> RepositoryResult<WorkplacePlan>;

    async fn get_workplace_plan(
        &self,
        user_id: UserId,
        date: NaiveDate,
    ) -> RepositoryResult<Option<WorkplacePlan>>;

    /// Plans within `from..=to` ordered by date; `None` covers every user.
    async fn list_workplace_plans(
        &self,
        user_id: Option<UserId>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepositoryResult<Vec<WorkplacePlan>>;

    async fn delete_workplace_plan(&self, user_id: UserId, date: NaiveDate)
        -> RepositoryResult<bool>;
}
