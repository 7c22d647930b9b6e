//! Time entries: worked intervals on a date.

use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use super::{minutes_to_hours, TimeEntryId, UserId};

/// Longest break that can be recorded on one entry.
pub const MAX_BREAK_MINUTES: i32 = 480;
/// Longest free-text comment on an entry.
pub const MAX_COMMENT_LEN: usize = 500;

crate::define_text_enum! {
    /// Where the work was done.
    pub enum Workplace {
        Office => "office",
        Remote => "remote",
    }
}

impl Default for Workplace {
    fn default() -> Self {
        Workplace::Office
    }
}

/// Minutes since midnight, ignoring seconds.
pub fn minute_of_day(time: NaiveTime) -> i32 {
    (time.hour() * 60 + time.minute()) as i32
}

/// Net worked minutes of an interval: `end - start - break`, never negative.
pub fn net_minutes(start: NaiveTime, end: NaiveTime, break_minutes: i32) -> i32 {
    (minute_of_day(end) - minute_of_day(start) - break_minutes).max(0)
}

/// Whether `[a_start, a_end)` and `[b_start, b_end)` intersect.
pub fn intervals_overlap(
    a_start: NaiveTime,
    a_end: NaiveTime,
    b_start: NaiveTime,
    b_end: NaiveTime,
) -> bool {
    a_start < b_end && a_end > b_start
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeEntry {
    pub id: TimeEntryId,
    pub user_id: UserId,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub break_minutes: i32,
    pub workplace: Workplace,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TimeEntry {
    pub fn duration_minutes(&self) -> i32 {
        net_minutes(self.start_time, self.end_time, self.break_minutes)
    }

    pub fn duration_hours(&self) -> f64 {
        minutes_to_hours(self.duration_minutes() as i64)
    }

    pub fn overlaps(&self, start: NaiveTime, end: NaiveTime) -> bool {
        intervals_overlap(start, end, self.start_time, self.end_time)
    }

    /// Apply a partial update in place.
    pub fn apply(&mut self, changes: &TimeEntryChanges) {
        if let Some(date) = changes.date {
            self.date = date;
        }
        if let Some(start) = changes.start_time {
            self.start_time = start;
        }
        if let Some(end) = changes.end_time {
            self.end_time = end;
        }
        if let Some(break_minutes) = changes.break_minutes {
            self.break_minutes = break_minutes;
        }
        if let Some(workplace) = changes.workplace {
            self.workplace = workplace;
        }
        if changes.comment.is_some() {
            self.comment = changes.comment.clone();
        }
        self.updated_at = Utc::now();
    }
}

impl Serialize for TimeEntry {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("TimeEntry", 12)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("user_id", &self.user_id)?;
        state.serialize_field("date", &self.date)?;
        state.serialize_field("start_time", &self.start_time)?;
        state.serialize_field("end_time", &self.end_time)?;
        state.serialize_field("break_minutes", &self.break_minutes)?;
        state.serialize_field("workplace", &self.workplace)?;
        state.serialize_field("comment", &self.comment)?;
        state.serialize_field("duration_minutes", &self.duration_minutes())?;
        state.serialize_field("duration_hours", &self.duration_hours())?;
        state.serialize_field("created_at", &self.created_at)?;
        state.serialize_field("updated_at", &self.updated_at)?;
        state.end()
    }
}

/// A time entry as submitted by a client, before it is assigned to a user.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TimeEntryInput {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(default)]
    pub break_minutes: i32,
    #[serde(default)]
    pub workplace: Workplace,
    #[serde(default)]
    pub comment: Option<String>,
}

impl TimeEntryInput {
    pub fn for_user(self, user_id: UserId) -> NewTimeEntry {
        NewTimeEntry {
            user_id,
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
            break_minutes: self.break_minutes,
            workplace: self.workplace,
            comment: self.comment,
        }
    }
}

/// Fields required to insert a time entry.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTimeEntry {
    pub user_id: UserId,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub break_minutes: i32,
    pub workplace: Workplace,
    pub comment: Option<String>,
}

/// Partial update of a time entry. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TimeEntryChanges {
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub break_minutes: Option<i32>,
    pub workplace: Option<Workplace>,
    pub comment: Option<String>,
}

impl TimeEntryChanges {
    pub fn touches_interval(&self) -> bool {
        self.date.is_some() || self.start_time.is_some() || self.end_time.is_some()
    }
}

/// Aggregate of one user's entries on one date.
#[derive(Debug, Clone, Serialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub entries: Vec<TimeEntry>,
    pub total_minutes: i64,
    pub total_hours: f64,
    pub total_break_minutes: i64,
    pub has_office: bool,
    pub has_remote: bool,
}

impl DaySummary {
    /// Sum durations and breaks over the given entries.
    pub fn from_entries(date: NaiveDate, entries: Vec<TimeEntry>) -> Self {
        let total_minutes: i64 = entries.iter().map(|e| e.duration_minutes() as i64).sum();
        let total_break_minutes: i64 = entries.iter().map(|e| e.break_minutes as i64).sum();
        let has_office = entries.iter().any(|e| e.workplace == Workplace::Office);
        let has_remote = entries.iter().any(|e| e.workplace == Workplace::Remote);

        Self {
            date,
            total_hours: minutes_to_hours(total_minutes),
            entries,
            total_minutes,
            total_break_minutes,
            has_office,
            has_remote,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn entry(start: NaiveTime, end: NaiveTime, break_minutes: i32, workplace: Workplace) -> TimeEntry {
        let now = Utc::now();
        TimeEntry {
            id: TimeEntryId::new(1),
            user_id: UserId::new(1),
            date: NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
            start_time: start,
            end_time: end,
            break_minutes,
            workplace,
            comment: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_duration_deducts_break() {
        let e = entry(t(9, 0), t(18, 0), 60, Workplace::Office);
        assert_eq!(e.duration_minutes(), 480);
        assert_eq!(e.duration_hours(), 8.0);
    }

    #[test]
    fn test_duration_never_negative() {
        let e = entry(t(9, 0), t(9, 30), 60, Workplace::Office);
        assert_eq!(e.duration_minutes(), 0);
    }

    #[test]
    fn test_overlap_is_half_open() {
        let e = entry(t(9, 0), t(12, 0), 0, Workplace::Office);
        assert!(e.overlaps(t(11, 0), t(13, 0)));
        assert!(e.overlaps(t(8, 0), t(9, 30)));
        assert!(!e.overlaps(t(12, 0), t(13, 0)));
        assert!(!e.overlaps(t(7, 0), t(9, 0)));
    }

    #[test]
    fn test_day_summary_totals() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        let summary = DaySummary::from_entries(
            date,
            vec![
                entry(t(9, 0), t(13, 0), 60, Workplace::Office),
                entry(t(14, 0), t(16, 20), 0, Workplace::Remote),
            ],
        );
        assert_eq!(summary.total_minutes, 180 + 140);
        assert_eq!(summary.total_break_minutes, 60);
        assert_eq!(summary.total_hours, 5.33);
        assert!(summary.has_office);
        assert!(summary.has_remote);
    }

    #[test]
    fn test_serialized_entry_includes_duration() {
        let json = serde_json::to_value(entry(t(9, 0), t(10, 30), 0, Workplace::Remote)).unwrap();
        assert_eq!(json["duration_minutes"], 90);
        assert_eq!(json["duration_hours"], 1.5);
        assert_eq!(json["workplace"], "remote");
        assert_eq!(json["start_time"], "09:00:00");
    }
}
