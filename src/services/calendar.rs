//! Latvian working-day calendar.
//!
//! Days are classified on first use and stored, so later lookups are plain
//! reads. A day is either a weekend, a public holiday (fixed date, Easter
//! related, or a transferred day off), or a workday.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use super::error::{ServiceError, ServiceResult};
use crate::db::FullRepository;
use crate::models::{dates_between, CalendarDay, DayType, CALENDAR_COUNTRY};

/// How far back [`last_working_days`] looks before giving up.
pub const MAX_LOOKBACK_DAYS: i64 = 60;

/// Holiday name in the three display languages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolidayName {
    pub lv: String,
    pub en: String,
    pub ru: String,
}

impl HolidayName {
    fn new(lv: &str, en: &str, ru: &str) -> Self {
        Self {
            lv: lv.to_string(),
            en: en.to_string(),
            ru: ru.to_string(),
        }
    }

    /// Name of the working day given off in exchange for this holiday.
    fn day_off_for(&self) -> Self {
        Self {
            lv: format!("Brīvdiena par {}", self.lv),
            en: format!("Day off for {}", self.en),
            ru: format!("Выходной за {}", self.ru),
        }
    }
}

/// (month, day, lv, en, ru)
const FIXED_HOLIDAYS: &[(u32, u32, &str, &str, &str)] = &[
    (1, 1, "Jaunais gads", "New Year's Day", "Новый год"),
    (5, 1, "Darba svētki", "Labour Day", "День труда"),
    (
        5,
        4,
        "Latvijas Republikas Neatkarības atjaunošanas diena",
        "Independence Restoration Day",
        "День независимости",
    ),
    (6, 23, "Līgo diena", "Midsummer Eve", "Лиго"),
    (6, 24, "Jāņu diena", "Midsummer Day", "Янов день"),
    (
        11,
        18,
        "Latvijas Republikas proklamēšanas diena",
        "Proclamation Day",
        "День провозглашения Латвийской республики",
    ),
    (12, 24, "Ziemassvētku vakars", "Christmas Eve", "Рождественский сочельник"),
    (12, 25, "Ziemassvētki", "Christmas Day", "Рождество"),
    (12, 26, "Otrie Ziemassvētki", "Second Day of Christmas", "Второй день Рождества"),
    (12, 31, "Vecgada diena", "New Year's Eve", "Канун Нового года"),
];

/// Fixed-date holiday falling on `date`, if any.
pub fn fixed_holiday(date: NaiveDate) -> Option<HolidayName> {
    FIXED_HOLIDAYS
        .iter()
        .find(|(m, d, ..)| *m == date.month() && *d == date.day())
        .map(|(_, _, lv, en, ru)| HolidayName::new(lv, en, ru))
}

/// Easter Sunday by the anonymous Gregorian algorithm.
pub fn easter_sunday(year: i32) -> NaiveDate {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    // The algorithm only yields dates in March or April.
    NaiveDate::from_ymd_opt(year, month as u32, day as u32).unwrap_or(NaiveDate::MIN)
}

/// Good Friday, Easter Sunday and Easter Monday of a year.
pub fn easter_holidays(year: i32) -> BTreeMap<NaiveDate, HolidayName> {
    let easter = easter_sunday(year);
    BTreeMap::from([
        (
            easter - Duration::days(2),
            HolidayName::new("Lielā Piektdiena", "Good Friday", "Страстная пятница"),
        ),
        (easter, HolidayName::new("Lieldienas", "Easter Sunday", "Пасха")),
        (
            easter + Duration::days(1),
            HolidayName::new("Otrās Lieldienas", "Easter Monday", "Пасхальный понедельник"),
        ),
    ])
}

/// Transferred days off of a year.
///
/// A holiday on Saturday frees the preceding Friday, one on Sunday the
/// following Monday. Easter holidays never displace a day that is already
/// transferred or that is itself an Easter holiday.
pub fn transferred_days(year: i32) -> BTreeMap<NaiveDate, HolidayName> {
    let mut days = BTreeMap::new();

    for (month, day, lv, en, ru) in FIXED_HOLIDAYS {
        let Some(date) = NaiveDate::from_ymd_opt(year, *month, *day) else {
            continue;
        };
        let name = HolidayName::new(lv, en, ru);
        match date.weekday() {
            Weekday::Sat => {
                days.insert(date - Duration::days(1), name.day_off_for());
            }
            Weekday::Sun => {
                days.insert(date + Duration::days(1), name.day_off_for());
            }
            _ => {}
        }
    }

    let easter = easter_holidays(year);
    for (date, name) in &easter {
        let target = match date.weekday() {
            Weekday::Sat => *date - Duration::days(1),
            Weekday::Sun => {
                let monday = *date + Duration::days(1);
                if easter.contains_key(&monday) {
                    continue;
                }
                monday
            }
            _ => continue,
        };
        days.entry(target).or_insert_with(|| name.day_off_for());
    }

    days
}

/// Easter holidays and transferred days for a span of years.
///
/// Neighbouring years are included so that a transfer crossing New Year is
/// found from either side.
#[derive(Debug, Default)]
pub struct HolidayTable {
    easter: BTreeMap<NaiveDate, HolidayName>,
    transferred: BTreeMap<NaiveDate, HolidayName>,
}

impl HolidayTable {
    pub fn for_range(from: NaiveDate, to: NaiveDate) -> Self {
        let mut table = Self::default();
        for year in (from.year() - 1)..=(to.year() + 1) {
            table.easter.extend(easter_holidays(year));
            table.transferred.extend(transferred_days(year));
        }
        table
    }

    /// Classify a single date.
    pub fn classify(&self, date: NaiveDate) -> CalendarDay {
        let weekend = matches!(date.weekday(), Weekday::Sat | Weekday::Sun);
        let fixed = fixed_holiday(date);

        let (day_type, name) = if weekend {
            (DayType::Weekend, fixed)
        } else if fixed.is_some() {
            (DayType::Holiday, fixed)
        } else if let Some(name) = self.easter.get(&date) {
            (DayType::Holiday, Some(name.clone()))
        } else if let Some(name) = self.transferred.get(&date) {
            (DayType::Holiday, Some(name.clone()))
        } else {
            (DayType::Workday, None)
        };

        CalendarDay {
            date,
            day_type,
            holiday_name: name.as_ref().map(|n| n.ru.clone()),
            holiday_name_lv: name.as_ref().map(|n| n.lv.clone()),
            holiday_name_en: name.map(|n| n.en),
            country: CALENDAR_COUNTRY.to_string(),
            is_working_day: day_type == DayType::Workday,
        }
    }
}

/// Classify a single date without touching storage.
pub fn classify_day(date: NaiveDate) -> CalendarDay {
    HolidayTable::for_range(date, date).classify(date)
}

/// First and last day of a month, validating the bounds accepted by the API.
pub fn month_bounds(year: i32, month: u32) -> ServiceResult<(NaiveDate, NaiveDate)> {
    if !(2000..=2100).contains(&year) {
        return Err(ServiceError::validation("Year must be between 2000 and 2100"));
    }
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| ServiceError::validation("Month must be between 1 and 12"))?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    let last = next
        .map(|d| d - Duration::days(1))
        .ok_or_else(|| ServiceError::validation("Month must be between 1 and 12"))?;
    Ok((first, last))
}

fn check_range(from: NaiveDate, to: NaiveDate) -> ServiceResult<()> {
    if to < from {
        return Err(ServiceError::validation("date_to must not be before date_from"));
    }
    Ok(())
}

/// Store classified rows for every date in `from..=to` that has none yet.
pub async fn ensure_days_exist(
    repo: &dyn FullRepository,
    from: NaiveDate,
    to: NaiveDate,
) -> ServiceResult<()> {
    if to < from {
        return Ok(());
    }
    let existing = repo.list_calendar_days(from, to).await?;
    let expected = (to - from).num_days() as usize + 1;
    if existing.len() == expected {
        return Ok(());
    }

    let table = HolidayTable::for_range(from, to);
    let missing: Vec<CalendarDay> = dates_between(from, to)
        .filter(|d| !existing.iter().any(|e| e.date == *d))
        .map(|d| table.classify(d))
        .collect();
    let inserted = repo.insert_calendar_days(missing).await?;
    log::debug!("Calendar: stored {} new days for {}..{}", inserted, from, to);
    Ok(())
}

pub async fn get_range(
    repo: &dyn FullRepository,
    from: NaiveDate,
    to: NaiveDate,
) -> ServiceResult<Vec<CalendarDay>> {
    check_range(from, to)?;
    ensure_days_exist(repo, from, to).await?;
    Ok(repo.list_calendar_days(from, to).await?)
}

pub async fn get_month(
    repo: &dyn FullRepository,
    year: i32,
    month: u32,
) -> ServiceResult<Vec<CalendarDay>> {
    let (first, last) = month_bounds(year, month)?;
    get_range(repo, first, last).await
}

pub async fn get_day(repo: &dyn FullRepository, date: NaiveDate) -> ServiceResult<CalendarDay> {
    if let Some(day) = repo.get_calendar_day(date).await? {
        return Ok(day);
    }
    ensure_days_exist(repo, date, date).await?;
    Ok(repo
        .get_calendar_day(date)
        .await?
        .unwrap_or_else(|| classify_day(date)))
}

/// Working days within `from..=to`, ordered by date.
pub async fn get_working_days(
    repo: &dyn FullRepository,
    from: NaiveDate,
    to: NaiveDate,
) -> ServiceResult<Vec<CalendarDay>> {
    let days = get_range(repo, from, to).await?;
    Ok(days.into_iter().filter(|d| d.is_working_day).collect())
}

pub async fn is_working_day(repo: &dyn FullRepository, date: NaiveDate) -> ServiceResult<bool> {
    Ok(get_day(repo, date).await?.is_working_day)
}

/// Up to `n` working days ending at `end` (inclusive), latest first.
///
/// Looks back at most [`MAX_LOOKBACK_DAYS`] days, so fewer than `n` days may
/// be returned after long holiday stretches.
pub async fn last_working_days(
    repo: &dyn FullRepository,
    n: usize,
    end: NaiveDate,
) -> ServiceResult<Vec<NaiveDate>> {
    if n == 0 {
        return Ok(Vec::new());
    }
    let start = end - Duration::days(MAX_LOOKBACK_DAYS - 1);
    let days = get_working_days(repo, start, end).await?;
    Ok(days.iter().rev().take(n).map(|d| d.date).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{CalendarRepository, LocalRepository};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_easter_dates() {
        assert_eq!(easter_sunday(2024), d(2024, 3, 31));
        assert_eq!(easter_sunday(2025), d(2025, 4, 20));
        assert_eq!(easter_sunday(2026), d(2026, 4, 5));
        assert_eq!(easter_sunday(2038), d(2038, 4, 25));
    }

    #[test]
    fn test_easter_monday_is_holiday() {
        let day = classify_day(d(2025, 4, 21));
        assert_eq!(day.day_type, DayType::Holiday);
        assert_eq!(day.holiday_name_en.as_deref(), Some("Easter Monday"));
        assert!(!day.is_working_day);

        let friday = classify_day(d(2025, 4, 18));
        assert_eq!(friday.holiday_name_lv.as_deref(), Some("Lielā Piektdiena"));
    }

    #[test]
    fn test_weekend_keeps_fixed_holiday_name() {
        // 2025-05-04 is a Sunday
        let day = classify_day(d(2025, 5, 4));
        assert_eq!(day.day_type, DayType::Weekend);
        assert_eq!(day.holiday_name_en.as_deref(), Some("Independence Restoration Day"));
        assert!(!day.is_working_day);
    }

    #[test]
    fn test_sunday_holiday_frees_monday() {
        let day = classify_day(d(2025, 5, 5));
        assert_eq!(day.day_type, DayType::Holiday);
        assert_eq!(
            day.holiday_name_en.as_deref(),
            Some("Day off for Independence Restoration Day")
        );
        assert_eq!(day.holiday_name.as_deref(), Some("Выходной за День независимости"));
    }

    #[test]
    fn test_saturday_holiday_frees_friday() {
        // 2027-12-25 is a Saturday, but the Friday before is already Christmas Eve
        let day = classify_day(d(2027, 12, 24));
        assert_eq!(day.holiday_name_en.as_deref(), Some("Christmas Eve"));

        // 2026-11-18 is a Wednesday: no transfer around it
        assert!(classify_day(d(2026, 11, 17)).is_working_day);
        assert!(classify_day(d(2026, 11, 19)).is_working_day);

        // 2023-11-18 was a Saturday
        let friday = classify_day(d(2023, 11, 17));
        assert_eq!(friday.holiday_name_en.as_deref(), Some("Day off for Proclamation Day"));
    }

    #[test]
    fn test_plain_workday() {
        let day = classify_day(d(2025, 3, 12));
        assert_eq!(day.day_type, DayType::Workday);
        assert!(day.is_working_day);
        assert_eq!(day.country, "LV");
        assert!(day.holiday_name.is_none());
    }

    #[test]
    fn test_month_bounds() {
        assert_eq!(month_bounds(2024, 2).unwrap(), (d(2024, 2, 1), d(2024, 2, 29)));
        assert_eq!(month_bounds(2025, 12).unwrap(), (d(2025, 12, 1), d(2025, 12, 31)));
        assert!(month_bounds(2025, 13).is_err());
        assert!(month_bounds(1999, 1).is_err());
    }

    #[tokio::test]
    async fn test_month_is_stored_once() {
        let repo = LocalRepository::new();
        let days = get_month(&repo, 2025, 6).await.unwrap();
        assert_eq!(days.len(), 30);
        let working = get_working_days(&repo, d(2025, 6, 1), d(2025, 6, 30))
            .await
            .unwrap();
        // June 2025: 21 weekdays minus Midsummer Eve and Midsummer Day
        assert_eq!(working.len(), 19);
        assert_eq!(repo.list_calendar_days(d(2025, 6, 1), d(2025, 6, 30)).await.unwrap().len(), 30);
    }

    #[tokio::test]
    async fn test_last_working_days_skip_weekend() {
        let repo = LocalRepository::new();
        // Monday 2025-03-10 back over the weekend
        let days = last_working_days(&repo, 3, d(2025, 3, 10)).await.unwrap();
        assert_eq!(days, vec![d(2025, 3, 10), d(2025, 3, 7), d(2025, 3, 6)]);
    }
}
