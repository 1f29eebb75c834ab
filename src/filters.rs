//! Filter state for the appointment view.
//!
//! `FilterState` is a plain value: the presentation layer owns it, mutates it
//! in response to input, and hands it to [`crate::query::evaluate`].

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::datetime::{
    end_of_day, first_day_of_month, is_same_calendar_day, last_day_of_month,
    parse_explicit_date, parse_explicit_time, previous_month, start_of_day, week_start,
    MinuteOfDay,
};

/// Named calendar windows, resolved relative to the current instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    #[default]
    All,
    Today,
    Tomorrow,
    ThisWeek,
    CurrentMonth,
    LastMonth,
    PastBookings,
    FutureBookings,
}

impl Preset {
    /// Presets in display order.
    pub const ALL: [Preset; 8] = [
        Preset::All,
        Preset::Today,
        Preset::Tomorrow,
        Preset::ThisWeek,
        Preset::CurrentMonth,
        Preset::LastMonth,
        Preset::PastBookings,
        Preset::FutureBookings,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Preset::All => "All",
            Preset::Today => "Today",
            Preset::Tomorrow => "Tomorrow",
            Preset::ThisWeek => "This Week",
            Preset::CurrentMonth => "Current Month",
            Preset::LastMonth => "Last Month",
            Preset::PastBookings => "Past Bookings",
            Preset::FutureBookings => "Future Bookings",
        }
    }

    /// Resolve this preset into a concrete window around `now`.
    pub fn window(&self, now: NaiveDateTime) -> PresetWindow {
        let today = now.date();
        match self {
            Preset::All => PresetWindow::Unbounded,
            Preset::Today => PresetWindow::SameDay(now),
            Preset::Tomorrow => PresetWindow::SameDay(now + Duration::days(1)),
            Preset::ThisWeek => {
                let sunday = week_start(today);
                PresetWindow::Between(
                    start_of_day(sunday),
                    end_of_day(sunday + Duration::days(6)),
                )
            }
            Preset::CurrentMonth => month_window(today.year(), today.month()),
            Preset::LastMonth => {
                let (year, month) = previous_month(today);
                month_window(year, month)
            }
            Preset::PastBookings => PresetWindow::Before(start_of_day(today)),
            Preset::FutureBookings => PresetWindow::After(end_of_day(today)),
        }
    }
}

fn month_window(year: i32, month: u32) -> PresetWindow {
    match (first_day_of_month(year, month), last_day_of_month(year, month)) {
        (Some(first), Some(last)) => PresetWindow::Between(start_of_day(first), end_of_day(last)),
        _ => PresetWindow::Empty,
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid preset: '{0}'. Must be one of: All, Today, Tomorrow, This Week, Current Month, Last Month, Past Bookings, Future Bookings")]
pub struct ParsePresetError(pub String);

impl FromStr for Preset {
    type Err = ParsePresetError;

    /// Accepts labels in any case, with spaces, dashes, or underscores.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let key: String = value
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();

        Preset::ALL
            .into_iter()
            .find(|preset| preset.label().replace(' ', "").to_lowercase() == key)
            .ok_or_else(|| ParsePresetError(value.to_string()))
    }
}

/// A resolved preset window. Bounds are inclusive unless named otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetWindow {
    /// Matches everything, including records without a date.
    Unbounded,
    /// Same calendar day as the given instant.
    SameDay(NaiveDateTime),
    Between(NaiveDateTime, NaiveDateTime),
    /// Strictly earlier.
    Before(NaiveDateTime),
    /// Strictly later.
    After(NaiveDateTime),
    /// Matches nothing dated; only reachable at the edges of chrono's range.
    Empty,
}

impl PresetWindow {
    /// Whether a record with this parsed date falls in the window.
    ///
    /// Undated records only pass an unbounded window.
    pub fn contains(&self, date: Option<NaiveDate>) -> bool {
        let Some(date) = date else {
            return matches!(self, PresetWindow::Unbounded);
        };
        let at = start_of_day(date);

        match *self {
            PresetWindow::Unbounded => true,
            PresetWindow::SameDay(day) => is_same_calendar_day(at, day),
            PresetWindow::Between(start, end) => at >= start && at <= end,
            PresetWindow::Before(limit) => at < limit,
            PresetWindow::After(limit) => at > limit,
            PresetWindow::Empty => false,
        }
    }
}

/// Optional lower and upper date bounds, as typed (`YYYY-MM-DD`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct DateRange {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl DateRange {
    pub fn new(start: Option<&str>, end: Option<&str>) -> Self {
        DateRange {
            start: start.map(str::to_string),
            end: end.map(str::to_string),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Parsed bounds. Unparseable text counts as no bound.
    pub fn bounds(&self) -> (Option<NaiveDate>, Option<NaiveDate>) {
        (
            self.start.as_deref().and_then(parse_explicit_date),
            self.end.as_deref().and_then(parse_explicit_date),
        )
    }
}

/// Optional lower and upper time-of-day bounds, as typed (`HH:MM`, 24-hour).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeRange {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl TimeRange {
    pub fn new(start: Option<&str>, end: Option<&str>) -> Self {
        TimeRange {
            start: start.map(str::to_string),
            end: end.map(str::to_string),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn bounds(&self) -> (Option<MinuteOfDay>, Option<MinuteOfDay>) {
        (
            self.start.as_deref().and_then(parse_explicit_time),
            self.end.as_deref().and_then(parse_explicit_time),
        )
    }
}

/// Everything the user has chosen to narrow the appointment list by.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterState {
    pub active_preset: Preset,
    pub search_query: String,
    pub explicit_date_range: DateRange,
    pub explicit_time_range: TimeRange,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preset(mut self, preset: Preset) -> Self {
        self.active_preset = preset;
        self
    }

    pub fn with_search(mut self, query: impl Into<String>) -> Self {
        self.search_query = query.into();
        self
    }

    pub fn with_date_range(mut self, start: Option<&str>, end: Option<&str>) -> Self {
        self.explicit_date_range = DateRange::new(start, end);
        self
    }

    pub fn with_time_range(mut self, start: Option<&str>, end: Option<&str>) -> Self {
        self.explicit_time_range = TimeRange::new(start, end);
        self
    }

    pub fn clear_date_range(&mut self) {
        self.explicit_date_range = DateRange::default();
    }

    pub fn clear_time_range(&mut self) {
        self.explicit_time_range = TimeRange::default();
    }

    /// Trimmed, lower-cased search text; empty means no text filter.
    pub fn normalized_query(&self) -> String {
        self.search_query.trim().to_lowercase()
    }

    /// The date range inputs are hidden for single-day presets.
    ///
    /// Hiding them does not disable a range that is already set.
    pub fn shows_date_range(&self) -> bool {
        !matches!(self.active_preset, Preset::Today | Preset::Tomorrow)
    }

    /// True when nothing narrows the list.
    pub fn is_unfiltered(&self) -> bool {
        self.active_preset == Preset::All
            && self.normalized_query().is_empty()
            && self.explicit_date_range.is_empty()
            && self.explicit_time_range.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn preset_parses_labels_loosely() {
        assert_eq!("This Week".parse::<Preset>(), Ok(Preset::ThisWeek));
        assert_eq!("current-month".parse::<Preset>(), Ok(Preset::CurrentMonth));
        assert_eq!("PAST_BOOKINGS".parse::<Preset>(), Ok(Preset::PastBookings));
        assert_eq!(" all ".parse::<Preset>(), Ok(Preset::All));
        assert!("next year".parse::<Preset>().is_err());
    }

    #[test]
    fn preset_labels_round_trip_through_display() {
        for preset in Preset::ALL {
            assert_eq!(preset.to_string().parse::<Preset>(), Ok(preset));
        }
    }

    #[test]
    fn today_and_tomorrow_use_calendar_days() {
        let now = at(2024, 3, 13, 22, 30);
        let today = Preset::Today.window(now);
        let tomorrow = Preset::Tomorrow.window(now);

        assert!(today.contains(ymd(2024, 3, 13)));
        assert!(!today.contains(ymd(2024, 3, 14)));
        assert!(tomorrow.contains(ymd(2024, 3, 14)));
        assert!(!tomorrow.contains(ymd(2024, 3, 13)));
    }

    #[test]
    fn this_week_runs_sunday_to_saturday() {
        // Wednesday
        let window = Preset::ThisWeek.window(at(2024, 3, 13, 9, 0));

        assert!(!window.contains(ymd(2024, 3, 9)));
        assert!(window.contains(ymd(2024, 3, 10)));
        assert!(window.contains(ymd(2024, 3, 16)));
        assert!(!window.contains(ymd(2024, 3, 17)));
    }

    #[test]
    fn last_month_rolls_back_the_year_in_january() {
        let window = Preset::LastMonth.window(at(2024, 1, 20, 12, 0));

        assert!(window.contains(ymd(2023, 12, 1)));
        assert!(window.contains(ymd(2023, 12, 31)));
        assert!(!window.contains(ymd(2023, 11, 30)));
        assert!(!window.contains(ymd(2024, 1, 1)));
    }

    #[test]
    fn current_month_covers_whole_month() {
        let window = Preset::CurrentMonth.window(at(2024, 2, 10, 8, 0));

        assert!(window.contains(ymd(2024, 2, 1)));
        assert!(window.contains(ymd(2024, 2, 29)));
        assert!(!window.contains(ymd(2024, 3, 1)));
    }

    #[test]
    fn past_and_future_exclude_today() {
        let now = at(2024, 3, 13, 12, 0);
        let past = Preset::PastBookings.window(now);
        let future = Preset::FutureBookings.window(now);

        assert!(past.contains(ymd(2024, 3, 12)));
        assert!(!past.contains(ymd(2024, 3, 13)));
        assert!(future.contains(ymd(2024, 3, 14)));
        assert!(!future.contains(ymd(2024, 3, 13)));
    }

    #[test]
    fn undated_records_only_match_all() {
        let now = at(2024, 3, 13, 12, 0);
        for preset in Preset::ALL {
            assert_eq!(preset.window(now).contains(None), preset == Preset::All);
        }
    }

    #[test]
    fn malformed_bounds_are_ignored() {
        let range = DateRange::new(Some("2024-xx-01"), Some("2024-03-31"));
        assert_eq!(range.bounds(), (None, ymd(2024, 3, 31)));

        let times = TimeRange::new(Some("9am"), Some("17:30"));
        assert_eq!(times.bounds(), (None, Some(1050)));
    }

    #[test]
    fn date_range_hidden_for_single_day_presets() {
        assert!(FilterState::new().shows_date_range());
        assert!(!FilterState::new().with_preset(Preset::Today).shows_date_range());
        assert!(!FilterState::new().with_preset(Preset::Tomorrow).shows_date_range());
        assert!(FilterState::new().with_preset(Preset::LastMonth).shows_date_range());
    }

    #[test]
    fn filter_state_serializes_as_plain_value() {
        let state = FilterState::new()
            .with_preset(Preset::ThisWeek)
            .with_search("smith")
            .with_time_range(Some("09:00"), None);

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["active_preset"], "this_week");
        assert_eq!(json["explicit_time_range"]["start"], "09:00");

        let back: FilterState = serde_json::from_value(json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn clearing_ranges_resets_both_bounds() {
        let mut state = FilterState::new()
            .with_date_range(Some("2024-01-01"), Some("2024-01-31"))
            .with_time_range(Some("08:00"), Some("12:00"));
        assert!(!state.is_unfiltered());

        state.clear_date_range();
        state.clear_time_range();
        assert!(state.is_unfiltered());
    }
}
