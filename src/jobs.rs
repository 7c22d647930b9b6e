//! Periodic reminder jobs.
//!
//! Each job fires at a fixed wall-clock time in [`LOCAL_TZ`], optionally on
//! a single weekday. The runner spawns one tokio task per schedule; a failed
//! run is logged and the task waits for the next slot.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, Duration, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use tokio::task::JoinHandle;

use crate::db::FullRepository;
use crate::services::mailer::EmailService;
use crate::services::reminders;
use crate::services::LOCAL_TZ;

/// What a scheduled slot runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderJob {
    MissingEntries,
    WeeklyPlanning,
}

impl ReminderJob {
    pub fn name(self) -> &'static str {
        match self {
            ReminderJob::MissingEntries => "check_missing_entries",
            ReminderJob::WeeklyPlanning => "weekly_planning_reminder",
        }
    }
}

/// A wall-clock slot: every day, or only on `weekday`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub job: ReminderJob,
    pub weekday: Option<Weekday>,
    pub at: NaiveTime,
}

impl Schedule {
    pub fn daily(job: ReminderJob, hour: u32, minute: u32) -> Self {
        Self {
            job,
            weekday: None,
            at: NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN),
        }
    }

    pub fn weekly(job: ReminderJob, weekday: Weekday, hour: u32, minute: u32) -> Self {
        Self {
            weekday: Some(weekday),
            ..Self::daily(job, hour, minute)
        }
    }

    /// First slot strictly after `now`.
    ///
    /// A slot that does not exist locally (DST gap) moves to the next
    /// matching day.
    pub fn next_after(&self, now: DateTime<Tz>) -> Option<DateTime<Tz>> {
        let today = now.date_naive();
        (0..=14).find_map(|offset| {
            let date = today + Duration::days(offset);
            if self.weekday.is_some_and(|w| date.weekday() != w) {
                return None;
            }
            let slot = now
                .timezone()
                .from_local_datetime(&date.and_time(self.at))
                .earliest()?;
            (slot > now).then_some(slot)
        })
    }
}

/// Slots of the reminder jobs: missing entries every day at 09:00, the
/// planning reminder Monday 08:00 and again Tuesday 09:00.
pub fn default_schedules() -> Vec<Schedule> {
    vec![
        Schedule::daily(ReminderJob::MissingEntries, 9, 0),
        Schedule::weekly(ReminderJob::WeeklyPlanning, Weekday::Mon, 8, 0),
        Schedule::weekly(ReminderJob::WeeklyPlanning, Weekday::Tue, 9, 0),
    ]
}

/// Run one job for the local date of `now`.
pub async fn run_job(
    repo: &dyn FullRepository,
    mail: &EmailService,
    job: ReminderJob,
    now: DateTime<Utc>,
) -> Result<()> {
    let today = now.with_timezone(&LOCAL_TZ).date_naive();
    let report = match job {
        ReminderJob::MissingEntries => reminders::check_missing_entries(repo, mail, today).await,
        ReminderJob::WeeklyPlanning => reminders::weekly_planning(repo, mail, today).await,
    }
    .with_context(|| format!("{} failed for {}", job.name(), today))?;

    log::info!(
        "{} finished: {} users checked, {} notifications, {} emails",
        job.name(),
        report.checked_users,
        report.notifications_created,
        report.emails_sent
    );
    Ok(())
}

/// Spawns the reminder tasks on the current tokio runtime.
pub struct JobRunner {
    repo: Arc<dyn FullRepository>,
    mail: Arc<EmailService>,
    schedules: Vec<Schedule>,
}

impl JobRunner {
    pub fn new(repo: Arc<dyn FullRepository>, mail: Arc<EmailService>) -> Self {
        Self {
            repo,
            mail,
            schedules: default_schedules(),
        }
    }

    pub fn spawn(self) -> Vec<JoinHandle<()>> {
        self.schedules
            .into_iter()
            .map(|schedule| {
                let repo = Arc::clone(&self.repo);
                let mail = Arc::clone(&self.mail);
                tokio::spawn(run_schedule(repo, mail, schedule))
            })
            .collect()
    }
}

async fn run_schedule(repo: Arc<dyn FullRepository>, mail: Arc<EmailService>, schedule: Schedule) {
    log::info!(
        "Scheduled {} at {} ({})",
        schedule.job.name(),
        schedule.at,
        schedule
            .weekday
            .map_or_else(|| "daily".to_string(), |w| w.to_string())
    );
    loop {
        let now = Utc::now().with_timezone(&LOCAL_TZ);
        let Some(next) = schedule.next_after(now) else {
            log::error!("No upcoming slot for {}, stopping", schedule.job.name());
            return;
        };
        let wait = (next - now).to_std().unwrap_or_default();
        log::debug!("{} sleeps until {}", schedule.job.name(), next);
        tokio::time::sleep(wait).await;

        if let Err(e) = run_job(repo.as_ref(), &mail, schedule.job, Utc::now()).await {
            log::error!("{:#}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn riga(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Tz> {
        LOCAL_TZ.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_daily_slot_rolls_over() {
        let schedule = Schedule::daily(ReminderJob::MissingEntries, 9, 0);
        // Wednesday
        assert_eq!(
            schedule.next_after(riga(2025, 3, 12, 8, 30)),
            Some(riga(2025, 3, 12, 9, 0))
        );
        assert_eq!(
            schedule.next_after(riga(2025, 3, 12, 9, 0)),
            Some(riga(2025, 3, 13, 9, 0))
        );
    }

    #[test]
    fn test_weekly_slot_waits_for_weekday() {
        let schedule = Schedule::weekly(ReminderJob::WeeklyPlanning, Weekday::Mon, 8, 0);
        assert_eq!(
            schedule.next_after(riga(2025, 3, 12, 10, 0)),
            Some(riga(2025, 3, 17, 8, 0))
        );
        assert_eq!(
            schedule.next_after(riga(2025, 3, 17, 7, 59)),
            Some(riga(2025, 3, 17, 8, 0))
        );
    }

    #[test]
    fn test_default_schedules() {
        let schedules = default_schedules();
        assert_eq!(schedules.len(), 3);
        assert_eq!(
            schedules
                .iter()
                .filter(|s| s.job == ReminderJob::WeeklyPlanning)
                .count(),
            2
        );
    }
}
