//! Workplace plans and who is where on a given day.

use std::collections::{HashMap, HashSet};

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use super::error::{ServiceError, ServiceResult};
use super::users::list_employees;
use crate::db::FullRepository;
use crate::models::{
    DayStatus, Employee, StatusType, UserId, Workplace, WorkplacePlan, WorkplacePlanInput,
};

pub async fn list_plans(
    repo: &dyn FullRepository,
    user_id: UserId,
    from: NaiveDate,
    to: NaiveDate,
) -> ServiceResult<Vec<WorkplacePlan>> {
    if to < from {
        return Err(ServiceError::validation("date_to must not be before date_from"));
    }
    Ok(repo.list_workplace_plans(Some(user_id), from, to).await?)
}

pub async fn plan_for_date(
    repo: &dyn FullRepository,
    user_id: UserId,
    date: NaiveDate,
) -> ServiceResult<Option<WorkplacePlan>> {
    Ok(repo.get_workplace_plan(user_id, date).await?)
}

/// Create the plan for a date or replace its workplace.
pub async fn set_plan(
    repo: &dyn FullRepository,
    user_id: UserId,
    input: WorkplacePlanInput,
) -> ServiceResult<WorkplacePlan> {
    Ok(repo
        .upsert_workplace_plan(user_id, input.date, input.workplace)
        .await?)
}

pub async fn delete_plan(
    repo: &dyn FullRepository,
    user_id: UserId,
    date: NaiveDate,
) -> ServiceResult<()> {
    if !repo.delete_workplace_plan(user_id, date).await? {
        return Err(ServiceError::not_found("Workplace plan not found"));
    }
    Ok(())
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OfficePresence {
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub avatar_url: Option<String>,
    pub position: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayPresence {
    pub date: NaiveDate,
    pub employees: Vec<OfficePresence>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeekPresence {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub days: Vec<DayPresence>,
}

fn presence_of(employee: &Employee) -> Option<OfficePresence> {
    employee.profile.as_ref().map(|p| OfficePresence {
        user_id: employee.user.id,
        first_name: p.first_name.clone(),
        last_name: p.last_name.clone(),
        avatar_url: p.avatar_url.clone(),
        position: p.position.clone(),
    })
}

fn on_leave(statuses: &[DayStatus], user_id: UserId, date: NaiveDate) -> bool {
    statuses
        .iter()
        .any(|s| s.user_id == user_id && s.date == date && s.status.is_leave())
}

fn office_day(
    employees: &[Employee],
    plans: &[WorkplacePlan],
    statuses: &[DayStatus],
    date: NaiveDate,
) -> DayPresence {
    let in_office: Vec<OfficePresence> = plans
        .iter()
        .filter(|p| p.date == date && p.workplace == Workplace::Office)
        .filter(|p| !on_leave(statuses, p.user_id, date))
        .filter_map(|p| employees.iter().find(|e| e.user.id == p.user_id))
        .filter_map(presence_of)
        .collect();

    DayPresence {
        date,
        count: in_office.len(),
        employees: in_office,
    }
}

/// Active employees planning to work from the office on `date`, minus those on leave.
pub async fn office_presence(repo: &dyn FullRepository, date: NaiveDate) -> ServiceResult<DayPresence> {
    let employees = list_employees(repo, true).await?;
    let plans = repo.list_workplace_plans(None, date, date).await?;
    let statuses = repo.list_day_statuses(None, date, date).await?;
    Ok(office_day(&employees, &plans, &statuses, date))
}

/// Office presence for Monday..Sunday of the week containing `date`.
pub async fn week_presence(repo: &dyn FullRepository, date: NaiveDate) -> ServiceResult<WeekPresence> {
    let start = week_start(date);
    let end = start + Duration::days(6);

    let employees = list_employees(repo, true).await?;
    let plans = repo.list_workplace_plans(None, start, end).await?;
    let statuses = repo.list_day_statuses(None, start, end).await?;

    let days = (0..7)
        .map(|offset| office_day(&employees, &plans, &statuses, start + Duration::days(offset)))
        .collect();
    Ok(WeekPresence {
        week_start: start,
        week_end: end,
        days,
    })
}

/// Where an employee is on a day, for the daily overview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DailyState {
    Sick,
    Vacation,
    Excused,
    Office,
    Remote,
    OfficeAndRemote,
    NoPlan,
}

impl DailyState {
    /// Leave statuses win; otherwise plans and logged entries are combined.
    /// A `normal` status counts as no status.
    pub fn resolve(status: Option<StatusType>, office: bool, remote: bool) -> Self {
        match status {
            Some(StatusType::Sick) => Self::Sick,
            Some(StatusType::Vacation) => Self::Vacation,
            Some(StatusType::Excused) => Self::Excused,
            Some(StatusType::Normal) | None => match (office, remote) {
                (true, true) => Self::OfficeAndRemote,
                (true, false) => Self::Office,
                (false, true) => Self::Remote,
                (false, false) => Self::NoPlan,
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sick => "sick",
            Self::Vacation => "vacation",
            Self::Excused => "excused",
            Self::Office => "office",
            Self::Remote => "remote",
            Self::OfficeAndRemote => "office/remote",
            Self::NoPlan => "no_plan",
        }
    }

    pub fn emoji(&self) -> Option<&'static str> {
        match self {
            Self::Sick => Some("🤒"),
            Self::Vacation => Some("🏖️"),
            Self::Excused => Some("✅"),
            Self::Office => Some("🏢"),
            Self::Remote => Some("🏠"),
            Self::OfficeAndRemote => Some("🏢/🏠"),
            Self::NoPlan => None,
        }
    }

    /// Component statuses; `None` when there is nothing to list.
    pub fn parts(&self) -> Option<Vec<&'static str>> {
        match self {
            Self::OfficeAndRemote => Some(vec!["office", "remote"]),
            Self::NoPlan => None,
            other => Some(vec![other.as_str()]),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EmployeeDayStatus {
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub avatar_url: Option<String>,
    pub position: Option<String>,
    pub status: &'static str,
    pub status_emoji: Option<&'static str>,
    pub statuses: Option<Vec<&'static str>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyOverview {
    pub date: NaiveDate,
    pub employees: Vec<EmployeeDayStatus>,
}

/// Every active employee with a profile and where they are on `date`.
pub async fn daily_overview(repo: &dyn FullRepository, date: NaiveDate) -> ServiceResult<DailyOverview> {
    let employees = list_employees(repo, true).await?;
    let plans = repo.list_workplace_plans(None, date, date).await?;
    let statuses: HashMap<UserId, StatusType> = repo
        .list_day_statuses(None, date, date)
        .await?
        .into_iter()
        .map(|s| (s.user_id, s.status))
        .collect();
    let entries = repo.list_time_entries(None, date, date).await?;

    let worked_at = |workplace: Workplace| -> HashSet<UserId> {
        plans
            .iter()
            .filter(|p| p.workplace == workplace)
            .map(|p| p.user_id)
            .chain(
                entries
                    .iter()
                    .filter(|e| e.workplace == workplace)
                    .map(|e| e.user_id),
            )
            .collect()
    };
    let office = worked_at(Workplace::Office);
    let remote = worked_at(Workplace::Remote);

    let rows = employees
        .iter()
        .filter_map(|employee| {
            let person = presence_of(employee)?;
            let id = employee.user.id;
            let state = DailyState::resolve(
                statuses.get(&id).copied(),
                office.contains(&id),
                remote.contains(&id),
            );
            Some(EmployeeDayStatus {
                user_id: id,
                first_name: person.first_name,
                last_name: person.last_name,
                avatar_url: person.avatar_url,
                position: person.position,
                status: state.as_str(),
                status_emoji: state.emoji(),
                statuses: state.parts(),
            })
        })
        .collect();

    Ok(DailyOverview {
        date,
        employees: rows,
    })
}
