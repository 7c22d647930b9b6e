//! Service layer for business rules and orchestration.
//!
//! Services sit between the HTTP handlers (and background jobs) and the
//! repository. Every function takes the repository as `&dyn FullRepository`
//! and, where the outcome depends on it, the current date or time, so the
//! same code runs against Postgres and the in-memory backend.

pub mod auth;
pub mod calendar;
pub mod change_requests;
pub mod day_status;
pub mod error;
pub mod mailer;
pub mod notifications;
pub mod organization;
pub mod presence;
pub mod reminders;
pub mod stats;
pub mod time_entries;
pub mod users;
pub mod vacations;

pub use auth::TokenService;
pub use error::{ServiceError, ServiceResult};
pub use mailer::EmailService;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Timezone in which working days and reminder schedules are evaluated.
pub const LOCAL_TZ: Tz = chrono_tz::Europe::Riga;

/// Today's date in [`LOCAL_TZ`].
pub fn local_today() -> NaiveDate {
    Utc::now().with_timezone(&LOCAL_TZ).date_naive()
}

fn local_midnight(date: NaiveDate) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN);
    LOCAL_TZ
        .from_local_datetime(&naive)
        .earliest()
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc())
}

/// UTC instants bounding `date` in [`LOCAL_TZ`], end exclusive.
pub fn local_day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    (local_midnight(date), local_midnight(date + Duration::days(1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_day_bounds_follow_riga_offset() {
        let winter = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let (since, until) = local_day_bounds(winter);
        assert_eq!(since.to_rfc3339(), "2025-01-14T22:00:00+00:00");
        assert_eq!(until - since, Duration::hours(24));

        // Clocks go forward on the last Sunday of March
        let (since, until) = local_day_bounds(NaiveDate::from_ymd_opt(2025, 3, 30).unwrap());
        assert_eq!(until - since, Duration::hours(23));
    }
}
