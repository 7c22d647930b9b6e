//! Worked-time statistics per user and period.
//!
//! A period is resolved to a date range relative to today; explicit dates
//! override either bound. Every date of the range gets a daily row, and the
//! rows are rolled up into ISO weeks (month, year and custom periods) and
//! calendar months (year period).

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use super::calendar::{self, month_bounds};
use super::error::{ServiceError, ServiceResult};
use super::presence::week_start;
use super::users::{get_user, list_employees};
use crate::db::FullRepository;
use crate::models::{
    dates_between, minutes_to_hours, CalendarDay, DayStatus, StatusType, TimeEntry, UserId,
    Workplace,
};

crate::define_text_enum! {
    pub enum PeriodType {
        Week => "week",
        Month => "month",
        Year => "year",
        Custom => "custom",
    }
}

impl Default for PeriodType {
    fn default() -> Self {
        PeriodType::Month
    }
}

/// Date range of `period` around `today`, with explicit bounds taking precedence.
pub fn resolve_range(
    period: PeriodType,
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
    today: NaiveDate,
) -> ServiceResult<(NaiveDate, NaiveDate)> {
    let (default_from, default_to) = match period {
        PeriodType::Week => {
            let monday = week_start(today);
            (monday, monday + Duration::days(6))
        }
        PeriodType::Month => month_bounds(today.year(), today.month())?,
        PeriodType::Year => (
            month_bounds(today.year(), 1)?.0,
            month_bounds(today.year(), 12)?.1,
        ),
        PeriodType::Custom => match (date_from, date_to) {
            (Some(from), Some(to)) => (from, to),
            _ => {
                return Err(ServiceError::validation(
                    "date_from and date_to are required for custom period",
                ))
            }
        },
    };

    let from = date_from.unwrap_or(default_from);
    let to = date_to.unwrap_or(default_to);
    if to < from {
        return Err(ServiceError::validation("date_to must not be before date_from"));
    }
    Ok((from, to))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyStats {
    pub date: NaiveDate,
    pub total_minutes: i64,
    pub total_hours: f64,
    pub break_minutes: i64,
    pub office_minutes: i64,
    pub remote_minutes: i64,
    pub status: Option<StatusType>,
    pub is_working_day: bool,
}

impl DailyStats {
    fn has_status(&self, status: StatusType) -> bool {
        self.status == Some(status)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyStats {
    pub week_number: u32,
    pub year: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_minutes: i64,
    pub total_hours: f64,
    pub working_days: usize,
    pub days_with_entries: usize,
    pub office_days: usize,
    pub remote_days: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyStats {
    pub month: u32,
    pub year: i32,
    pub total_minutes: i64,
    pub total_hours: f64,
    pub working_days: usize,
    pub days_with_entries: usize,
    pub sick_days: usize,
    pub vacation_days: usize,
    pub office_days: usize,
    pub remote_days: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub period: PeriodType,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub total_minutes: i64,
    pub total_hours: f64,
    pub total_break_minutes: i64,
    pub working_days: usize,
    pub days_with_entries: usize,
    pub sick_days: usize,
    pub vacation_days: usize,
    pub office_days: usize,
    pub remote_days: usize,
    pub daily_stats: Vec<DailyStats>,
    pub weekly_stats: Option<Vec<WeeklyStats>>,
    pub monthly_stats: Option<Vec<MonthlyStats>>,
}

fn daily_rows(
    from: NaiveDate,
    to: NaiveDate,
    entries: &[TimeEntry],
    statuses: &[DayStatus],
    days: &[CalendarDay],
) -> Vec<DailyStats> {
    let working: HashMap<NaiveDate, bool> = days.iter().map(|d| (d.date, d.is_working_day)).collect();
    let status_of: HashMap<NaiveDate, StatusType> = statuses.iter().map(|s| (s.date, s.status)).collect();

    dates_between(from, to)
        .map(|date| {
            let mut row = DailyStats {
                date,
                total_minutes: 0,
                total_hours: 0.0,
                break_minutes: 0,
                office_minutes: 0,
                remote_minutes: 0,
                status: status_of.get(&date).copied(),
                is_working_day: working
                    .get(&date)
                    .copied()
                    .unwrap_or_else(|| date.weekday().num_days_from_monday() < 5),
            };
            for entry in entries.iter().filter(|e| e.date == date) {
                let minutes = entry.duration_minutes() as i64;
                row.total_minutes += minutes;
                row.break_minutes += entry.break_minutes as i64;
                match entry.workplace {
                    Workplace::Office => row.office_minutes += minutes,
                    Workplace::Remote => row.remote_minutes += minutes,
                }
            }
            row.total_hours = minutes_to_hours(row.total_minutes);
            row
        })
        .collect()
}

fn weekly_rows(daily: &[DailyStats]) -> Vec<WeeklyStats> {
    let mut weeks: BTreeMap<(i32, u32), Vec<&DailyStats>> = BTreeMap::new();
    for day in daily {
        let iso = day.date.iso_week();
        weeks.entry((iso.year(), iso.week())).or_default().push(day);
    }

    weeks
        .into_iter()
        .filter_map(|((year, week_number), days)| {
            let first = days.iter().map(|d| d.date).min()?;
            let start_date = week_start(first);
            let total_minutes: i64 = days.iter().map(|d| d.total_minutes).sum();
            Some(WeeklyStats {
                week_number,
                year,
                start_date,
                end_date: start_date + Duration::days(6),
                total_minutes,
                total_hours: minutes_to_hours(total_minutes),
                working_days: days.iter().filter(|d| d.is_working_day).count(),
                days_with_entries: days.iter().filter(|d| d.total_minutes > 0).count(),
                office_days: days.iter().filter(|d| d.office_minutes > 0).count(),
                remote_days: days.iter().filter(|d| d.remote_minutes > 0).count(),
            })
        })
        .collect()
}

fn monthly_rows(daily: &[DailyStats]) -> Vec<MonthlyStats> {
    let mut months: BTreeMap<(i32, u32), Vec<&DailyStats>> = BTreeMap::new();
    for day in daily {
        months
            .entry((day.date.year(), day.date.month()))
            .or_default()
            .push(day);
    }

    months
        .into_iter()
        .map(|((year, month), days)| {
            let total_minutes: i64 = days.iter().map(|d| d.total_minutes).sum();
            MonthlyStats {
                month,
                year,
                total_minutes,
                total_hours: minutes_to_hours(total_minutes),
                working_days: days.iter().filter(|d| d.is_working_day).count(),
                days_with_entries: days.iter().filter(|d| d.total_minutes > 0).count(),
                sick_days: days.iter().filter(|d| d.has_status(StatusType::Sick)).count(),
                vacation_days: days.iter().filter(|d| d.has_status(StatusType::Vacation)).count(),
                office_days: days.iter().filter(|d| d.office_minutes > 0).count(),
                remote_days: days.iter().filter(|d| d.remote_minutes > 0).count(),
            }
        })
        .collect()
}

/// Assemble the statistics of one user from already loaded rows.
pub fn build_stats(
    period: PeriodType,
    from: NaiveDate,
    to: NaiveDate,
    entries: &[TimeEntry],
    statuses: &[DayStatus],
    days: &[CalendarDay],
) -> StatsResponse {
    let daily = daily_rows(from, to, entries, statuses, days);

    // A day counts as office or remote when it has an entry there,
    // even if that entry nets zero minutes.
    let entry_days = |workplace: Option<Workplace>| {
        daily
            .iter()
            .filter(|d| {
                entries
                    .iter()
                    .any(|e| e.date == d.date && workplace.map_or(true, |w| e.workplace == w))
            })
            .count()
    };

    let total_minutes: i64 = daily.iter().map(|d| d.total_minutes).sum();
    let weekly_stats = matches!(
        period,
        PeriodType::Month | PeriodType::Year | PeriodType::Custom
    )
    .then(|| weekly_rows(&daily));
    let monthly_stats = (period == PeriodType::Year).then(|| monthly_rows(&daily));

    StatsResponse {
        period,
        date_from: from,
        date_to: to,
        total_minutes,
        total_hours: minutes_to_hours(total_minutes),
        total_break_minutes: daily.iter().map(|d| d.break_minutes).sum(),
        working_days: daily.iter().filter(|d| d.is_working_day).count(),
        days_with_entries: entry_days(None),
        sick_days: daily.iter().filter(|d| d.has_status(StatusType::Sick)).count(),
        vacation_days: daily.iter().filter(|d| d.has_status(StatusType::Vacation)).count(),
        office_days: entry_days(Some(Workplace::Office)),
        remote_days: entry_days(Some(Workplace::Remote)),
        daily_stats: daily,
        weekly_stats,
        monthly_stats,
    }
}

/// Statistics of `user_id` for the resolved period.
pub async fn user_stats(
    repo: &dyn FullRepository,
    user_id: UserId,
    period: PeriodType,
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
    today: NaiveDate,
) -> ServiceResult<StatsResponse> {
    let (from, to) = resolve_range(period, date_from, date_to, today)?;
    let entries = repo.list_time_entries(Some(user_id), from, to).await?;
    let statuses = repo.list_day_statuses(Some(user_id), from, to).await?;
    let days = calendar::get_range(repo, from, to).await?;
    Ok(build_stats(period, from, to, &entries, &statuses, &days))
}

/// Statistics of an existing employee; `NotFound("Employee not found")` otherwise.
pub async fn employee_stats(
    repo: &dyn FullRepository,
    user_id: UserId,
    period: PeriodType,
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
    today: NaiveDate,
) -> ServiceResult<StatsResponse> {
    get_user(repo, user_id).await?;
    user_stats(repo, user_id, period, date_from, date_to, today).await
}

#[derive(Debug, Clone, Serialize)]
pub struct EmployeeSummary {
    pub user_id: UserId,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub total_hours: f64,
    pub working_days: usize,
    pub days_with_entries: usize,
    pub sick_days: usize,
    pub vacation_days: usize,
    pub office_days: usize,
    pub remote_days: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsSummary {
    pub period: PeriodType,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub employees: Vec<EmployeeSummary>,
}

/// Period totals of every active employee.
pub async fn summary(
    repo: &dyn FullRepository,
    period: PeriodType,
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
    today: NaiveDate,
) -> ServiceResult<StatsSummary> {
    let (from, to) = resolve_range(period, date_from, date_to, today)?;
    let days = calendar::get_range(repo, from, to).await?;
    let entries = repo.list_time_entries(None, from, to).await?;
    let statuses = repo.list_day_statuses(None, from, to).await?;

    let employees = list_employees(repo, true)
        .await?
        .into_iter()
        .map(|employee| {
            let id = employee.user.id;
            let own_entries: Vec<TimeEntry> =
                entries.iter().filter(|e| e.user_id == id).cloned().collect();
            let own_statuses: Vec<DayStatus> =
                statuses.iter().filter(|s| s.user_id == id).cloned().collect();
            let stats = build_stats(period, from, to, &own_entries, &own_statuses, &days);
            EmployeeSummary {
                user_id: id,
                first_name: employee.profile.as_ref().map(|p| p.first_name.clone()),
                last_name: employee.profile.as_ref().map(|p| p.last_name.clone()),
                email: employee.user.email,
                total_hours: stats.total_hours,
                working_days: stats.working_days,
                days_with_entries: stats.days_with_entries,
                sick_days: stats.sick_days,
                vacation_days: stats.vacation_days,
                office_days: stats.office_days,
                remote_days: stats.remote_days,
            }
        })
        .collect();

    Ok(StatsSummary {
        period,
        date_from: from,
        date_to: to,
        employees,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DayStatusId, TimeEntryId};
    use chrono::{NaiveTime, Utc};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn entry(date: NaiveDate, start: u32, end: u32, workplace: Workplace) -> TimeEntry {
        let now = Utc::now();
        TimeEntry {
            id: TimeEntryId::new(1),
            user_id: UserId::new(1),
            date,
            start_time: NaiveTime::from_hms_opt(start, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(end, 0, 0).unwrap(),
            break_minutes: 0,
            workplace,
            comment: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn status(date: NaiveDate, status: StatusType) -> DayStatus {
        let now = Utc::now();
        DayStatus {
            id: DayStatusId::new(1),
            user_id: UserId::new(1),
            date,
            status,
            note: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_period_ranges() {
        let today = d(2025, 3, 12);
        assert_eq!(
            resolve_range(PeriodType::Week, None, None, today).unwrap(),
            (d(2025, 3, 10), d(2025, 3, 16))
        );
        assert_eq!(
            resolve_range(PeriodType::Month, None, None, today).unwrap(),
            (d(2025, 3, 1), d(2025, 3, 31))
        );
        assert_eq!(
            resolve_range(PeriodType::Year, None, None, today).unwrap(),
            (d(2025, 1, 1), d(2025, 12, 31))
        );
        assert_eq!(
            resolve_range(PeriodType::Month, Some(d(2025, 3, 5)), None, today).unwrap(),
            (d(2025, 3, 5), d(2025, 3, 31))
        );
        assert!(resolve_range(PeriodType::Custom, Some(d(2025, 3, 5)), None, today).is_err());
    }

    #[test]
    fn test_totals_and_rollups() {
        let from = d(2025, 3, 1);
        let to = d(2025, 3, 31);
        let entries = vec![
            entry(d(2025, 3, 3), 9, 13, Workplace::Office),
            entry(d(2025, 3, 3), 14, 16, Workplace::Remote),
            entry(d(2025, 3, 11), 9, 17, Workplace::Remote),
        ];
        let statuses = vec![
            status(d(2025, 3, 5), StatusType::Sick),
            status(d(2025, 3, 6), StatusType::Vacation),
        ];
        let stats = build_stats(PeriodType::Month, from, to, &entries, &statuses, &[]);

        assert_eq!(stats.daily_stats.len(), 31);
        assert_eq!(stats.total_minutes, 240 + 120 + 480);
        assert_eq!(stats.total_hours, 14.0);
        assert_eq!(stats.days_with_entries, 2);
        assert_eq!(stats.office_days, 1);
        assert_eq!(stats.remote_days, 2);
        assert_eq!(stats.sick_days, 1);
        assert_eq!(stats.vacation_days, 1);
        // weekday fallback without calendar rows
        assert_eq!(stats.working_days, 21);

        let weeks = stats.weekly_stats.unwrap();
        // 2025-03-01 is a Saturday in ISO week 9
        assert_eq!(weeks.first().map(|w| (w.week_number, w.start_date)), Some((9, d(2025, 2, 24))));
        let week_10 = weeks.iter().find(|w| w.week_number == 10).unwrap();
        assert_eq!(week_10.total_minutes, 360);
        assert_eq!(week_10.office_days, 1);
        assert!(stats.monthly_stats.is_none());
    }

    #[test]
    fn test_week_period_has_no_rollups() {
        let stats = build_stats(PeriodType::Week, d(2025, 3, 10), d(2025, 3, 16), &[], &[], &[]);
        assert!(stats.weekly_stats.is_none());
        assert!(stats.monthly_stats.is_none());
        assert_eq!(stats.working_days, 5);
    }
}
