//! Day statuses and vacations.

use chrono::{DateTime, NaiveDate, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use super::{DayStatusId, UserId, VacationId};

crate::define_text_enum! {
    /// Whole-day marker for a user.
    pub enum StatusType {
        Normal => "normal",
        Sick => "sick",
        Vacation => "vacation",
        Excused => "excused",
    }
}

impl StatusType {
    /// Sick, vacation and excused days are skipped by reminders and presence lists.
    pub fn is_leave(&self) -> bool {
        matches!(self, StatusType::Sick | StatusType::Vacation | StatusType::Excused)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayStatus {
    pub id: DayStatusId,
    pub user_id: UserId,
    pub date: NaiveDate,
    pub status: StatusType,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DayStatus {
    pub fn auto_skip_day(&self) -> bool {
        self.status.is_leave()
    }
}

impl Serialize for DayStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("DayStatus", 8)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("user_id", &self.user_id)?;
        state.serialize_field("date", &self.date)?;
        state.serialize_field("status", &self.status)?;
        state.serialize_field("note", &self.note)?;
        state.serialize_field("auto_skip_day", &self.auto_skip_day())?;
        state.serialize_field("created_at", &self.created_at)?;
        state.serialize_field("updated_at", &self.updated_at)?;
        state.end()
    }
}

/// Day status as submitted by a client.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DayStatusInput {
    pub date: NaiveDate,
    pub status: StatusType,
    #[serde(default)]
    pub note: Option<String>,
}

/// Partial update of a day status.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DayStatusChanges {
    pub date: Option<NaiveDate>,
    pub status: Option<StatusType>,
    pub note: Option<String>,
}

crate::define_text_enum! {
    /// Review state shared by vacations and change requests.
    pub enum ApprovalStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Vacation {
    pub id: VacationId,
    pub user_id: UserId,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub status: ApprovalStatus,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vacation {
    /// Inclusive number of calendar days.
    pub fn days_count(&self) -> i64 {
        (self.date_to - self.date_from).num_days() + 1
    }

    pub fn overlaps(&self, from: NaiveDate, to: NaiveDate) -> bool {
        self.date_from <= to && self.date_to >= from
    }

    pub fn covers(&self, date: NaiveDate) -> bool {
        self.date_from <= date && date <= self.date_to
    }
}

impl Serialize for Vacation {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Vacation", 9)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("user_id", &self.user_id)?;
        state.serialize_field("date_from", &self.date_from)?;
        state.serialize_field("date_to", &self.date_to)?;
        state.serialize_field("status", &self.status)?;
        state.serialize_field("note", &self.note)?;
        state.serialize_field("days_count", &self.days_count())?;
        state.serialize_field("created_at", &self.created_at)?;
        state.serialize_field("updated_at", &self.updated_at)?;
        state.end()
    }
}

/// Fields required to insert a vacation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewVacation {
    pub user_id: UserId,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub status: ApprovalStatus,
    pub note: Option<String>,
}

/// Vacation as submitted by a client.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VacationInput {
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    #[serde(default)]
    pub note: Option<String>,
}

/// Partial update of a vacation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct VacationChanges {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub status: Option<ApprovalStatus>,
    pub note: Option<String>,
}

/// Iterate every date of an inclusive range.
pub fn dates_between(from: NaiveDate, to: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    from.iter_days().take_while(move |d| *d <= to)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn vacation(from: NaiveDate, to: NaiveDate) -> Vacation {
        let now = Utc::now();
        Vacation {
            id: VacationId::new(1),
            user_id: UserId::new(1),
            date_from: from,
            date_to: to,
            status: ApprovalStatus::Approved,
            note: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_days_count_is_inclusive() {
        assert_eq!(vacation(d(2025, 7, 1), d(2025, 7, 1)).days_count(), 1);
        assert_eq!(vacation(d(2025, 7, 28), d(2025, 8, 3)).days_count(), 7);
    }

    #[test]
    fn test_vacation_overlap_touching_ranges() {
        let v = vacation(d(2025, 7, 10), d(2025, 7, 20));
        assert!(v.overlaps(d(2025, 7, 20), d(2025, 7, 25)));
        assert!(v.overlaps(d(2025, 7, 1), d(2025, 7, 10)));
        assert!(!v.overlaps(d(2025, 7, 21), d(2025, 7, 25)));
    }

    #[test]
    fn test_leave_statuses() {
        assert!(!StatusType::Normal.is_leave());
        assert!(StatusType::Sick.is_leave());
        assert!(StatusType::Vacation.is_leave());
        assert!(StatusType::Excused.is_leave());
    }

    #[test]
    fn test_dates_between_inclusive() {
        let dates: Vec<_> = dates_between(d(2024, 2, 28), d(2024, 3, 1)).collect();
        assert_eq!(dates, vec![d(2024, 2, 28), d(2024, 2, 29), d(2024, 3, 1)]);
        assert_eq!(dates_between(d(2024, 3, 2), d(2024, 3, 1)).count(), 0);
    }
}
