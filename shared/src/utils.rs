// Calendar-month helpers used to key and order monthly periods.
use chrono::{Datelike, Months, NaiveDate};

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn is_first_of_month(date: NaiveDate) -> bool {
    date.day() == 1
}

/// First day of the month after `date`. `None` past the end of chrono's calendar.
pub fn next_month(date: NaiveDate) -> Option<NaiveDate> {
    first_of_month(date).checked_add_months(Months::new(1))
}

/// Whole calendar months from `from` to `to`; negative when `to` is earlier.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    let from_index = from.year() as i64 * 12 + from.month0() as i64;
    let to_index = to.year() as i64 * 12 + to.month0() as i64;
    to_index - from_index
}

/// Opaque display key such as `jan-24`. Locale formatting is left to the presentation layer.
pub fn period_label(date: NaiveDate) -> String {
    date.format("%b-%y").to_string().to_lowercase()
}
