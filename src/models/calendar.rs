//! Calendar days classified as workday, weekend or holiday.

use chrono::NaiveDate;
use serde::Serialize;

crate::define_text_enum! {
    pub enum DayType {
        Workday => "workday",
        Weekend => "weekend",
        Holiday => "holiday",
    }
}

/// Country code of the holiday calendar in use.
pub const CALENDAR_COUNTRY: &str = "LV";

/// One day of the company calendar.
///
/// `holiday_name` carries the Russian name, `holiday_name_lv` and
/// `holiday_name_en` the Latvian and English ones.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub day_type: DayType,
    pub holiday_name: Option<String>,
    pub holiday_name_lv: Option<String>,
    pub holiday_name_en: Option<String>,
    pub country: String,
    pub is_working_day: bool,
}
