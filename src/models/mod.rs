//! Domain model for the time-tracking application.
//!
//! Entities mirror the relational tables one to one. Derived values
//! (durations, day counts, full names) are computed on access and included
//! when an entity is serialized.

pub mod calendar;
pub mod change_request;
pub mod leave;
pub mod macros;
pub mod notification;
pub mod settings;
pub mod time_entry;
pub mod user;
pub mod workplace;

pub use calendar::*;
pub use change_request::*;
pub use leave::*;
pub use notification::*;
pub use settings::*;
pub use time_entry::*;
pub use user::*;
pub use workplace::*;

crate::define_id_type!(i64, UserId);
crate::define_id_type!(i64, TimeEntryId);
crate::define_id_type!(i64, DayStatusId);
crate::define_id_type!(i64, VacationId);
crate::define_id_type!(i64, WorkplacePlanId);
crate::define_id_type!(i64, ChangeRequestId);
crate::define_id_type!(i64, DepartmentId);
crate::define_id_type!(i64, NotificationId);

/// Round to two decimal places, the precision used for hour values in responses.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Convert minutes to hours rounded to two decimal places.
pub fn minutes_to_hours(minutes: i64) -> f64 {
    round2(minutes as f64 / 60.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minutes_to_hours_rounding() {
        assert_eq!(minutes_to_hours(0), 0.0);
        assert_eq!(minutes_to_hours(90), 1.5);
        assert_eq!(minutes_to_hours(100), 1.67);
        assert_eq!(minutes_to_hours(480), 8.0);
    }

    #[test]
    fn test_id_serializes_as_number() {
        let id = UserId::new(42);
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");
        let parsed: UserId = serde_json::from_str("7").unwrap();
        assert_eq!(parsed.value(), 7);
    }

    #[test]
    fn test_text_enum_round_trip() {
        assert_eq!(UserRole::Admin.as_str(), "admin");
        assert_eq!("employee".parse::<UserRole>().unwrap(), UserRole::Employee);
        assert!("root".parse::<UserRole>().is_err());
        assert_eq!(
            serde_json::to_string(&ChangeRequestType::AddSickDay).unwrap(),
            "\"add_sick_day\""
        );
    }
}
