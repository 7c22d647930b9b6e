//! Employee proposals to alter time entries, vacations or sick days.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ApprovalStatus, ChangeRequestId, DayStatusId, TimeEntryId, UserId, VacationId, Workplace};

crate::define_text_enum! {
    pub enum ChangeRequestType {
        Add => "add",
        Edit => "edit",
        Delete => "delete",
        AddVacation => "add_vacation",
        EditVacation => "edit_vacation",
        DeleteVacation => "delete_vacation",
        AddSickDay => "add_sick_day",
        EditSickDay => "edit_sick_day",
        DeleteSickDay => "delete_sick_day",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeRequest {
    pub id: ChangeRequestId,
    pub user_id: UserId,
    pub request_type: ChangeRequestType,
    pub time_entry_id: Option<TimeEntryId>,
    pub vacation_id: Option<VacationId>,
    pub day_status_id: Option<DayStatusId>,
    pub date: NaiveDate,
    pub date_to: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub break_minutes: Option<i32>,
    pub workplace: Option<Workplace>,
    pub comment: Option<String>,
    pub reason: String,
    pub status: ApprovalStatus,
    pub admin_id: Option<UserId>,
    pub admin_comment: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChangeRequest {
    pub fn is_pending(&self) -> bool {
        self.status == ApprovalStatus::Pending
    }

    /// Last date covered by the request; single-day requests end on `date`.
    pub fn end_date(&self) -> NaiveDate {
        self.date_to.unwrap_or(self.date)
    }
}

/// Change request as submitted by a client.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChangeRequestInput {
    pub request_type: ChangeRequestType,
    #[serde(default)]
    pub time_entry_id: Option<TimeEntryId>,
    #[serde(default)]
    pub vacation_id: Option<VacationId>,
    #[serde(default)]
    pub day_status_id: Option<DayStatusId>,
    pub date: NaiveDate,
    #[serde(default)]
    pub date_to: Option<NaiveDate>,
    #[serde(default)]
    pub start_time: Option<NaiveTime>,
    #[serde(default)]
    pub end_time: Option<NaiveTime>,
    #[serde(default)]
    pub break_minutes: Option<i32>,
    #[serde(default)]
    pub workplace: Option<Workplace>,
    #[serde(default)]
    pub comment: Option<String>,
    pub reason: String,
}

/// Fields required to insert a change request.
#[derive(Debug, Clone, PartialEq)]
pub struct NewChangeRequest {
    pub user_id: UserId,
    pub input: ChangeRequestInput,
}

/// Admin decision on a pending request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChangeRequestResolution {
    pub status: ApprovalStatus,
    #[serde(default)]
    pub admin_comment: Option<String>,
}
