//! Date and time parsing for appointment records and filter inputs.
//!
//! Records carry loosely formatted text (`"3/14/2025"`, `"14-03-2025"`,
//! `"Tue 9:05 am"`). Filter inputs use fixed formats (`YYYY-MM-DD`, 24-hour
//! `HH:MM`). Every parser returns `None` instead of failing.

use std::sync::LazyLock;

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

/// Minutes elapsed since midnight.
pub type MinuteOfDay = u32;

static CLOCK_12H: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d{1,2}):(\d{2})\s*(AM|PM)").expect("12-hour clock pattern is valid")
});

fn split_numbers(text: &str, separators: &[char]) -> Option<Vec<i64>> {
    text.split(separators)
        .map(|part| part.trim().parse::<i64>().ok())
        .collect()
}

/// Build a date the lenient way: out-of-range months and days roll over
/// into neighbouring months and years (`2024-02-30` is March 1st).
fn calendar_date(year: i64, month: i64, day: i64) -> Option<NaiveDate> {
    let january = NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, 1, 1)?;

    let month_offset = month - 1;
    let month_start = if month_offset >= 0 {
        january.checked_add_months(Months::new(u32::try_from(month_offset).ok()?))?
    } else {
        january.checked_sub_months(Months::new(u32::try_from(-month_offset).ok()?))?
    };

    month_start.checked_add_signed(Duration::try_days(day - 1)?)
}

/// Parse the record's ambiguous three-part date (`/` or `-` separated).
///
/// Parts are read as `first, second, year`. The value is day-first only
/// when `first > 12` and `second <= 12`; everything else is month-first,
/// so `05/04/2024` is always May 4th. Impossible days roll over, so
/// `02/30/2024` is March 1st.
pub fn parse_record_date(text: &str) -> Option<NaiveDate> {
    let parts = split_numbers(text, &['/', '-'])?;
    let [first, second, year] = parts[..] else {
        return None;
    };

    let (month, day) = if first > 12 && second <= 12 {
        (second, first)
    } else {
        (first, second)
    };

    calendar_date(year, month, day)
}

/// Parse a `YYYY-MM-DD` filter bound.
pub fn parse_explicit_date(text: &str) -> Option<NaiveDate> {
    let parts = split_numbers(text, &['-'])?;
    let [year, month, day] = parts[..] else {
        return None;
    };
    calendar_date(year, month, day)
}

/// Find an `H:MM AM`/`HH:MM pm` clock reading anywhere in `text`.
///
/// `12 AM` is midnight and `12 PM` is noon.
pub fn parse_record_time(text: &str) -> Option<MinuteOfDay> {
    let caps = CLOCK_12H.captures(text)?;
    let mut hour: u32 = caps[1].parse().ok()?;
    let minute: u32 = caps[2].parse().ok()?;
    let is_pm = caps[3].eq_ignore_ascii_case("pm");

    if is_pm && hour != 12 {
        hour += 12;
    }
    if !is_pm && hour == 12 {
        hour = 0;
    }

    Some(hour * 60 + minute)
}

/// Parse a 24-hour `HH:MM` filter bound.
pub fn parse_explicit_time(text: &str) -> Option<MinuteOfDay> {
    let (hour, minute) = text.trim().split_once(':')?;
    let hour: u32 = hour.parse().ok()?;
    let minute: u32 = minute.parse().ok()?;

    if hour > 23 || minute > 59 {
        return None;
    }
    Some(hour * 60 + minute)
}

pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    // 23:59:59.999
    date.and_time(NaiveTime::MIN) + Duration::days(1) - Duration::milliseconds(1)
}

/// Calendar-day equality, ignoring time of day.
pub fn is_same_calendar_day(a: NaiveDateTime, b: NaiveDateTime) -> bool {
    a.year() == b.year() && a.month() == b.month() && a.day() == b.day()
}

/// Sunday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_sunday()))
}

pub fn first_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    first_day_of_month(next_year, next_month)?.pred_opt()
}

/// Year and month of the month before `date`, rolling back across January.
pub fn previous_month(date: NaiveDate) -> (i32, u32) {
    if date.month() == 1 {
        (date.year() - 1, 12)
    } else {
        (date.year(), date.month() - 1)
    }
}

/// Milliseconds since the Unix epoch for midnight of `date`.
pub fn date_millis(date: NaiveDate) -> i64 {
    start_of_day(date).and_utc().timestamp_millis()
}
