//! Row types mapped onto the Postgres tables and their conversions to the
//! domain model. Enum columns are stored as text and parsed on load.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use diesel::prelude::*;
use std::str::FromStr;

use super::schema::{
    calendar_days, change_requests, company_settings, day_statuses, departments,
    employee_profiles, notification_settings, notifications, time_entries, users, vacations,
    workplace_plans,
};
use crate::db::repository::{RepositoryError, RepositoryResult};
use crate::models::*;

fn parse_text<T>(column: &str, value: &str) -> RepositoryResult<T>
where
    T: FromStr<Err = String>,
{
    value.parse::<T>().map_err(|e| {
        RepositoryError::internal(e)
            .with_operation("decode_row")
            .with_details(format!("column={}", column))
    })
}

fn parse_optional<T>(column: &str, value: Option<&str>) -> RepositoryResult<Option<T>>
where
    T: FromStr<Err = String>,
{
    value.map(|v| parse_text(column, v)).transpose()
}

// ==================== Users ====================

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> RepositoryResult<Self> {
        Ok(User {
            id: UserId::new(row.id),
            email: row.email,
            password_hash: row.password_hash,
            role: parse_text("role", &row.role)?,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow {
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub is_active: bool,
}

impl From<NewUser> for NewUserRow {
    fn from(user: NewUser) -> Self {
        Self {
            email: user.email,
            password_hash: user.password_hash,
            role: user.role.as_str().to_string(),
            is_active: user.is_active,
        }
    }
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = users)]
pub struct UserChangesRow {
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<UserChanges> for UserChangesRow {
    fn from(changes: UserChanges) -> Self {
        Self {
            email: changes.email,
            password_hash: changes.password_hash,
            role: changes.role.map(|r| r.as_str().to_string()),
            is_active: changes.is_active,
            updated_at: Some(Utc::now()),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = employee_profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct ProfileRow {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub bank_account: Option<String>,
    pub position: Option<String>,
    pub department: Option<String>,
    pub default_workplace: String,
    pub work_email: Option<String>,
    pub employment_type: Option<String>,
    pub payment_type: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub name_day: Option<NaiveDate>,
    pub contract_number: Option<String>,
    pub employment_start_date: Option<NaiveDate>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub declared_address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ProfileRow> for EmployeeProfile {
    type Error = RepositoryError;

    fn try_from(row: ProfileRow) -> RepositoryResult<Self> {
        Ok(EmployeeProfile {
            user_id: UserId::new(row.user_id),
            first_name: row.first_name,
            last_name: row.last_name,
            phone: row.phone,
            avatar_url: row.avatar_url,
            bank_account: row.bank_account,
            position: row.position,
            department: row.department,
            default_workplace: parse_text("default_workplace", &row.default_workplace)?,
            work_email: row.work_email,
            employment_type: parse_optional("employment_type", row.employment_type.as_deref())?,
            payment_type: parse_optional("payment_type", row.payment_type.as_deref())?,
            birthday: row.birthday,
            name_day: row.name_day,
            contract_number: row.contract_number,
            employment_start_date: row.employment_start_date,
            emergency_contact_name: row.emergency_contact_name,
            emergency_contact_phone: row.emergency_contact_phone,
            declared_address: row.declared_address,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl From<EmployeeProfile> for ProfileRow {
    fn from(p: EmployeeProfile) -> Self {
        Self {
            user_id: p.user_id.value(),
            first_name: p.first_name,
            last_name: p.last_name,
            phone: p.phone,
            avatar_url: p.avatar_url,
            bank_account: p.bank_account,
            position: p.position,
            department: p.department,
            default_workplace: p.default_workplace.as_str().to_string(),
            work_email: p.work_email,
            employment_type: p.employment_type.map(|t| t.as_str().to_string()),
            payment_type: p.payment_type.map(|t| t.as_str().to_string()),
            birthday: p.birthday,
            name_day: p.name_day,
            contract_number: p.contract_number,
            employment_start_date: p.employment_start_date,
            emergency_contact_name: p.emergency_contact_name,
            emergency_contact_phone: p.emergency_contact_phone,
            declared_address: p.declared_address,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

// ==================== Time tracking ====================

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = time_entries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TimeEntryRow {
    pub id: i64,
    pub user_id: i64,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub break_minutes: i32,
    pub workplace: String,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<TimeEntryRow> for TimeEntry {
    type Error = RepositoryError;

    fn try_from(row: TimeEntryRow) -> RepositoryResult<Self> {
        Ok(TimeEntry {
            id: TimeEntryId::new(row.id),
            user_id: UserId::new(row.user_id),
            date: row.date,
            start_time: row.start_time,
            end_time: row.end_time,
            break_minutes: row.break_minutes,
            workplace: parse_text("workplace", &row.workplace)?,
            comment: row.comment,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = time_entries)]
#[diesel(treat_none_as_null = true)]
pub struct TimeEntryValues {
    pub user_id: i64,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub break_minutes: i32,
    pub workplace: String,
    pub comment: Option<String>,
}

impl From<NewTimeEntry> for TimeEntryValues {
    fn from(e: NewTimeEntry) -> Self {
        Self {
            user_id: e.user_id.value(),
            date: e.date,
            start_time: e.start_time,
            end_time: e.end_time,
            break_minutes: e.break_minutes,
            workplace: e.workplace.as_str().to_string(),
            comment: e.comment,
        }
    }
}

impl From<&TimeEntry> for TimeEntryValues {
    fn from(e: &TimeEntry) -> Self {
        Self {
            user_id: e.user_id.value(),
            date: e.date,
            start_time: e.start_time,
            end_time: e.end_time,
            break_minutes: e.break_minutes,
            workplace: e.workplace.as_str().to_string(),
            comment: e.comment.clone(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = workplace_plans)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct WorkplacePlanRow {
    pub id: i64,
    pub user_id: i64,
    pub date: NaiveDate,
    pub workplace: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<WorkplacePlanRow> for WorkplacePlan {
    type Error = RepositoryError;

    fn try_from(row: WorkplacePlanRow) -> RepositoryResult<Self> {
        Ok(WorkplacePlan {
            id: WorkplacePlanId::new(row.id),
            user_id: UserId::new(row.user_id),
            date: row.date,
            workplace: parse_text("workplace", &row.workplace)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = workplace_plans)]
pub struct NewWorkplacePlanRow {
    pub user_id: i64,
    pub date: NaiveDate,
    pub workplace: String,
}

// ==================== Leave ====================

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = day_statuses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DayStatusRow {
    pub id: i64,
    pub user_id: i64,
    pub date: NaiveDate,
    pub status: String,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DayStatusRow> for DayStatus {
    type Error = RepositoryError;

    fn try_from(row: DayStatusRow) -> RepositoryResult<Self> {
        Ok(DayStatus {
            id: DayStatusId::new(row.id),
            user_id: UserId::new(row.user_id),
            date: row.date,
            status: parse_text("status", &row.status)?,
            note: row.note,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = day_statuses)]
pub struct NewDayStatusRow {
    pub user_id: i64,
    pub date: NaiveDate,
    pub status: String,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = vacations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct VacationRow {
    pub id: i64,
    pub user_id: i64,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub status: String,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<VacationRow> for Vacation {
    type Error = RepositoryError;

    fn try_from(row: VacationRow) -> RepositoryResult<Self> {
        Ok(Vacation {
            id: VacationId::new(row.id),
            user_id: UserId::new(row.user_id),
            date_from: row.date_from,
            date_to: row.date_to,
            status: parse_text("status", &row.status)?,
            note: row.note,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = vacations)]
#[diesel(treat_none_as_null = true)]
pub struct VacationValues {
    pub user_id: i64,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub status: String,
    pub note: Option<String>,
}

impl From<NewVacation> for VacationValues {
    fn from(v: NewVacation) -> Self {
        Self {
            user_id: v.user_id.value(),
            date_from: v.date_from,
            date_to: v.date_to,
            status: v.status.as_str().to_string(),
            note: v.note,
        }
    }
}

impl From<&Vacation> for VacationValues {
    fn from(v: &Vacation) -> Self {
        Self {
            user_id: v.user_id.value(),
            date_from: v.date_from,
            date_to: v.date_to,
            status: v.status.as_str().to_string(),
            note: v.note.clone(),
        }
    }
}

// ==================== Calendar ====================

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = calendar_days)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CalendarDayRow {
    pub date: NaiveDate,
    pub day_type: String,
    pub holiday_name: Option<String>,
    pub holiday_name_lv: Option<String>,
    pub holiday_name_en: Option<String>,
    pub country: String,
    pub is_working_day: bool,
}

impl TryFrom<CalendarDayRow> for CalendarDay {
    type Error = RepositoryError;

    fn try_from(row: CalendarDayRow) -> RepositoryResult<Self> {
        Ok(CalendarDay {
            date: row.date,
            day_type: parse_text("day_type", &row.day_type)?,
            holiday_name: row.holiday_name,
            holiday_name_lv: row.holiday_name_lv,
            holiday_name_en: row.holiday_name_en,
            country: row.country,
            is_working_day: row.is_working_day,
        })
    }
}

impl From<CalendarDay> for CalendarDayRow {
    fn from(day: CalendarDay) -> Self {
        Self {
            date: day.date,
            day_type: day.day_type.as_str().to_string(),
            holiday_name: day.holiday_name,
            holiday_name_lv: day.holiday_name_lv,
            holiday_name_en: day.holiday_name_en,
            country: day.country,
            is_working_day: day.is_working_day,
        }
    }
}

// ==================== Change requests ====================

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = change_requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ChangeRequestRow {
    pub id: i64,
    pub user_id: i64,
    pub request_type: String,
    pub time_entry_id: Option<i64>,
    pub vacation_id: Option<i64>,
    pub day_status_id: Option<i64>,
    pub date: NaiveDate,
    pub date_to: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub break_minutes: Option<i32>,
    pub workplace: Option<String>,
    pub comment: Option<String>,
    pub reason: String,
    pub status: String,
    pub admin_id: Option<i64>,
    pub admin_comment: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ChangeRequestRow> for ChangeRequest {
    type Error = RepositoryError;

    fn try_from(row: ChangeRequestRow) -> RepositoryResult<Self> {
        Ok(ChangeRequest {
            id: ChangeRequestId::new(row.id),
            user_id: UserId::new(row.user_id),
            request_type: parse_text("request_type", &row.request_type)?,
            time_entry_id: row.time_entry_id.map(TimeEntryId::new),
            vacation_id: row.vacation_id.map(VacationId::new),
            day_status_id: row.day_status_id.map(DayStatusId::new),
            date: row.date,
            date_to: row.date_to,
            start_time: row.start_time,
            end_time: row.end_time,
            break_minutes: row.break_minutes,
            workplace: parse_optional("workplace", row.workplace.as_deref())?,
            comment: row.comment,
            reason: row.reason,
            status: parse_text("status", &row.status)?,
            admin_id: row.admin_id.map(UserId::new),
            admin_comment: row.admin_comment,
            resolved_at: row.resolved_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = change_requests)]
pub struct NewChangeRequestRow {
    pub user_id: i64,
    pub request_type: String,
    pub time_entry_id: Option<i64>,
    pub vacation_id: Option<i64>,
    pub day_status_id: Option<i64>,
    pub date: NaiveDate,
    pub date_to: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub break_minutes: Option<i32>,
    pub workplace: Option<String>,
    pub comment: Option<String>,
    pub reason: String,
    pub status: String,
}

impl From<NewChangeRequest> for NewChangeRequestRow {
    fn from(request: NewChangeRequest) -> Self {
        let input = request.input;
        Self {
            user_id: request.user_id.value(),
            request_type: input.request_type.as_str().to_string(),
            time_entry_id: input.time_entry_id.map(|id| id.value()),
            vacation_id: input.vacation_id.map(|id| id.value()),
            day_status_id: input.day_status_id.map(|id| id.value()),
            date: input.date,
            date_to: input.date_to,
            start_time: input.start_time,
            end_time: input.end_time,
            break_minutes: input.break_minutes,
            workplace: input.workplace.map(|w| w.as_str().to_string()),
            comment: input.comment,
            reason: input.reason,
            status: ApprovalStatus::Pending.as_str().to_string(),
        }
    }
}

/// Columns an admin resolution touches.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = change_requests)]
#[diesel(treat_none_as_null = true)]
pub struct ChangeRequestResolutionRow {
    pub status: String,
    pub admin_id: Option<i64>,
    pub admin_comment: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl From<&ChangeRequest> for ChangeRequestResolutionRow {
    fn from(r: &ChangeRequest) -> Self {
        Self {
            status: r.status.as_str().to_string(),
            admin_id: r.admin_id.map(|id| id.value()),
            admin_comment: r.admin_comment.clone(),
            resolved_at: r.resolved_at,
            updated_at: r.updated_at,
        }
    }
}

// ==================== Notifications ====================

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NotificationRow {
    pub id: i64,
    pub user_id: i64,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub related_user_id: Option<i64>,
    pub related_request_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = RepositoryError;

    fn try_from(row: NotificationRow) -> RepositoryResult<Self> {
        Ok(Notification {
            id: NotificationId::new(row.id),
            user_id: UserId::new(row.user_id),
            kind: parse_text("kind", &row.kind)?,
            title: row.title,
            message: row.message,
            is_read: row.is_read,
            related_user_id: row.related_user_id.map(UserId::new),
            related_request_id: row.related_request_id.map(ChangeRequestId::new),
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = notifications)]
pub struct NewNotificationRow {
    pub user_id: i64,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub related_user_id: Option<i64>,
    pub related_request_id: Option<i64>,
}

impl From<NewNotification> for NewNotificationRow {
    fn from(n: NewNotification) -> Self {
        Self {
            user_id: n.user_id.value(),
            kind: n.kind.as_str().to_string(),
            title: n.title,
            message: n.message,
            related_user_id: n.related_user_id.map(|id| id.value()),
            related_request_id: n.related_request_id.map(|id| id.value()),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = notification_settings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NotificationSettingsRow {
    pub user_id: i64,
    pub email_birthday: bool,
    pub email_name_day: bool,
    pub email_change_request: bool,
    pub email_weekly_reminder: bool,
    pub app_birthday: bool,
    pub app_name_day: bool,
    pub app_change_request: bool,
    pub app_weekly_reminder: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<NotificationSettingsRow> for NotificationSettings {
    fn from(row: NotificationSettingsRow) -> Self {
        Self {
            user_id: UserId::new(row.user_id),
            email_birthday: row.email_birthday,
            email_name_day: row.email_name_day,
            email_change_request: row.email_change_request,
            email_weekly_reminder: row.email_weekly_reminder,
            app_birthday: row.app_birthday,
            app_name_day: row.app_name_day,
            app_change_request: row.app_change_request,
            app_weekly_reminder: row.app_weekly_reminder,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<NotificationSettings> for NotificationSettingsRow {
    fn from(s: NotificationSettings) -> Self {
        Self {
            user_id: s.user_id.value(),
            email_birthday: s.email_birthday,
            email_name_day: s.email_name_day,
            email_change_request: s.email_change_request,
            email_weekly_reminder: s.email_weekly_reminder,
            app_birthday: s.app_birthday,
            app_name_day: s.app_name_day,
            app_change_request: s.app_change_request,
            app_weekly_reminder: s.app_weekly_reminder,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

// ==================== Organization ====================

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = departments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DepartmentRow {
    pub id: i64,
    pub name: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

impl From<DepartmentRow> for Department {
    fn from(row: DepartmentRow) -> Self {
        Self {
            id: DepartmentId::new(row.id),
            name: row.name,
            is_default: row.is_default,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = company_settings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct CompanySettingRow {
    pub key: String,
    pub value: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<CompanySettingRow> for CompanySetting {
    fn from(row: CompanySettingRow) -> Self {
        Self {
            key: row.key,
            value: row.value,
            updated_at: row.updated_at,
        }
    }
}

/// Convert a batch of rows, failing on the first undecodable one.
pub fn decode_all<R, T>(rows: Vec<R>) -> RepositoryResult<Vec<T>>
where
    T: TryFrom<R, Error = RepositoryError>,
{
    rows.into_iter().map(T::try_from).collect()
}
