//! Date arithmetic over plain calendar dates.
//!
//! Everything here works on `NaiveDate`, which has no time-of-day component,
//! so subtracting two dates never drifts across daylight-saving boundaries.

use chrono::{Datelike, Days, Duration, Local, NaiveDate};

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn to_iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// The Monday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

pub fn current_week(today: NaiveDate) -> [NaiveDate; 7] {
    dates_of_week(week_start(today))
}

pub fn week_dates(offset: i64) -> Option<[NaiveDate; 7]> {
    week_dates_from(today(), offset)
}

/// The seven consecutive dates of the Monday-start week containing `today`,
/// shifted by `offset` whole weeks. `None` when the shifted week leaves the
/// representable date range.
pub fn week_dates_from(today: NaiveDate, offset: i64) -> Option<[NaiveDate; 7]> {
    let start = Duration::try_weeks(offset).and_then(|shift| week_start(today).checked_add_signed(shift))?;
    start.checked_add_days(Days::new(6))?;
    Some(dates_of_week(start))
}

pub fn dates_of_week(start: NaiveDate) -> [NaiveDate; 7] {
    std::array::from_fn(|i| start + Duration::days(i as i64))
}

/// Signed whole days from `a` to `b`; positive when `b` is later.
pub fn days_between(a: NaiveDate, b: NaiveDate) -> i64 {
    (b - a).num_days()
}

pub fn weeks_between(a: NaiveDate, b: NaiveDate) -> i64 {
    days_between(a, b).div_euclid(7)
}

/// Short column label such as `Jan 8`.
pub fn week_label(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}
