//! Stored calendar days.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::error::RepositoryResult;
use crate::models::CalendarDay;

#[async_trait]
pub trait CalendarRepository: Send + Sync {
    /// Insert days whose date is not stored yet; existing dates are left alone.
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of days actually inserted
    async fn insert_calendar_days(&self, days: Vec<CalendarDay>) -> RepositoryResult<usize>;

    async fn get_calendar_day(&self, date: NaiveDate) -> RepositoryResult<Option<CalendarDay>>;

    /// Stored days within `from..=to`, ordered by date.
    async fn list_calendar_days(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepositoryResult<Vec<CalendarDay>>;
}
