//! Appointment query engine.
//!
//! `evaluate` is a pure function of (records, filter state, now). Each
//! record is parsed once, run through an ordered list of predicates joined
//! by logical AND, then the survivors are sorted most recent first and
//! summarized.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::debug;

use crate::datetime::{date_millis, parse_record_date, parse_record_time, MinuteOfDay};
use crate::filters::{FilterState, Preset, PresetWindow};
use crate::models::AppointmentRecord;

const MILLIS_PER_MINUTE: i64 = 60_000;

/// Filter state with every bound parsed and the preset resolved against `now`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledFilters {
    pub query: String,
    pub window: PresetWindow,
    pub date_start: Option<NaiveDate>,
    pub date_end: Option<NaiveDate>,
    pub time_start: Option<MinuteOfDay>,
    pub time_end: Option<MinuteOfDay>,
}

impl CompiledFilters {
    pub fn compile(filters: &FilterState, now: NaiveDateTime) -> Self {
        let (date_start, date_end) = filters.explicit_date_range.bounds();
        let (time_start, time_end) = filters.explicit_time_range.bounds();

        CompiledFilters {
            query: filters.normalized_query(),
            window: filters.active_preset.window(now),
            date_start,
            date_end,
            time_start,
            time_end,
        }
    }
}

/// A record alongside its parsed date and time.
#[derive(Debug, Clone, Copy)]
pub struct ParsedRecord<'a> {
    pub record: &'a AppointmentRecord,
    pub date: Option<NaiveDate>,
    pub time: Option<MinuteOfDay>,
}

impl<'a> ParsedRecord<'a> {
    pub fn parse(record: &'a AppointmentRecord) -> Self {
        ParsedRecord {
            record,
            date: record.appointment_date.as_deref().and_then(parse_record_date),
            time: record.appointment_time.as_deref().and_then(parse_record_time),
        }
    }

    /// Descending sort key. Missing dates and times count as zero.
    pub fn sort_key(&self) -> i64 {
        let date = self.date.map(date_millis).unwrap_or(0);
        let minutes = i64::from(self.time.unwrap_or(0));
        date + minutes * MILLIS_PER_MINUTE
    }
}

pub type Predicate = fn(&CompiledFilters, &ParsedRecord<'_>) -> bool;

/// Text search over name, visit type, status and phone.
pub fn matches_search(filters: &CompiledFilters, row: &ParsedRecord<'_>) -> bool {
    if filters.query.is_empty() {
        return true;
    }
    row.record
        .searchable_fields()
        .any(|value| value.to_lowercase().contains(&filters.query))
}

pub fn matches_preset(filters: &CompiledFilters, row: &ParsedRecord<'_>) -> bool {
    filters.window.contains(row.date)
}

/// Inclusive explicit date bounds. An undated record fails any set bound.
pub fn matches_date_range(filters: &CompiledFilters, row: &ParsedRecord<'_>) -> bool {
    within(row.date, filters.date_start, filters.date_end)
}

/// Inclusive explicit time bounds. A record without a time fails any set bound.
pub fn matches_time_range(filters: &CompiledFilters, row: &ParsedRecord<'_>) -> bool {
    within(row.time, filters.time_start, filters.time_end)
}

fn within<T: PartialOrd>(value: Option<T>, start: Option<T>, end: Option<T>) -> bool {
    if start.is_none() && end.is_none() {
        return true;
    }
    let Some(value) = value else {
        return false;
    };
    start.map_or(true, |s| value >= s) && end.map_or(true, |e| value <= e)
}

/// Predicates applied to every record, in order. All must hold.
pub const PREDICATES: [Predicate; 4] = [
    matches_search,
    matches_preset,
    matches_date_range,
    matches_time_range,
];

pub fn matches_all(filters: &CompiledFilters, row: &ParsedRecord<'_>) -> bool {
    PREDICATES.iter().all(|predicate| predicate(filters, row))
}

/// Summary figures over the filtered rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueryStats {
    pub total: usize,
    pub cancelled_count: usize,
    /// Percentage of rows not cancelled, rounded half up; 0 when empty.
    pub completion_rate: u32,
}

impl QueryStats {
    pub fn from_rows(rows: &[&AppointmentRecord]) -> Self {
        let total = rows.len();
        let cancelled_count = rows.iter().filter(|r| r.is_cancelled()).count();

        QueryStats {
            total,
            cancelled_count,
            completion_rate: completion_rate(total, cancelled_count),
        }
    }
}

fn completion_rate(total: usize, cancelled: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let kept = (total - cancelled) as u64;
    let total = total as u64;
    // round(100 * kept / total) with halves going up
    ((200 * kept + total) / (2 * total)) as u32
}

/// Filtered, sorted rows and their statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryView<'a> {
    pub rows: Vec<&'a AppointmentRecord>,
    pub stats: QueryStats,
}

impl QueryView<'_> {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Indices into `records` of the matching rows, most recent first.
///
/// Ties keep their input order.
pub fn matching_indices(
    records: &[AppointmentRecord],
    filters: &FilterState,
    now: NaiveDateTime,
) -> Vec<usize> {
    let compiled = CompiledFilters::compile(filters, now);

    let mut hits: Vec<(usize, i64)> = records
        .iter()
        .enumerate()
        .map(|(index, record)| (index, ParsedRecord::parse(record)))
        .filter(|(_, row)| matches_all(&compiled, row))
        .map(|(index, row)| (index, row.sort_key()))
        .collect();

    hits.sort_by(|a, b| b.1.cmp(&a.1));

    debug!(
        preset = %filters.active_preset,
        searched = !compiled.query.is_empty(),
        matched = hits.len(),
        scanned = records.len(),
        "evaluated appointment filters"
    );

    hits.into_iter().map(|(index, _)| index).collect()
}

/// Filter, sort and summarize `records` for the given filter state.
///
/// `records` is never modified; the view borrows from it.
pub fn evaluate<'a>(
    records: &'a [AppointmentRecord],
    filters: &FilterState,
    now: NaiveDateTime,
) -> QueryView<'a> {
    let rows: Vec<&AppointmentRecord> = matching_indices(records, filters, now)
        .into_iter()
        .map(|index| &records[index])
        .collect();
    let stats = QueryStats::from_rows(&rows);

    QueryView { rows, stats }
}

/// One user's view over a loaded record set.
///
/// The records are fixed for the session; the filter state changes through
/// the setters. The last result is cached against the exact filter value
/// and the calendar day of `now`; every preset window is whole days.
pub struct DashboardSession {
    records: Vec<AppointmentRecord>,
    filters: FilterState,
    cache: Option<CachedView>,
}

struct CachedView {
    filters: FilterState,
    day: NaiveDate,
    indices: Vec<usize>,
}

impl DashboardSession {
    pub fn new(records: Vec<AppointmentRecord>) -> Self {
        DashboardSession {
            records,
            filters: FilterState::default(),
            cache: None,
        }
    }

    pub fn records(&self) -> &[AppointmentRecord] {
        &self.records
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn set_filters(&mut self, filters: FilterState) {
        self.filters = filters;
    }

    pub fn set_preset(&mut self, preset: Preset) {
        self.filters.active_preset = preset;
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.filters.search_query = query.into();
    }

    pub fn set_date_start(&mut self, start: Option<&str>) {
        self.filters.explicit_date_range.start = start.map(str::to_string);
    }

    pub fn set_date_end(&mut self, end: Option<&str>) {
        self.filters.explicit_date_range.end = end.map(str::to_string);
    }

    pub fn set_time_start(&mut self, start: Option<&str>) {
        self.filters.explicit_time_range.start = start.map(str::to_string);
    }

    pub fn set_time_end(&mut self, end: Option<&str>) {
        self.filters.explicit_time_range.end = end.map(str::to_string);
    }

    pub fn clear_date_range(&mut self) {
        self.filters.clear_date_range();
    }

    pub fn clear_time_range(&mut self) {
        self.filters.clear_time_range();
    }

    pub fn reset_filters(&mut self) {
        self.filters = FilterState::default();
    }

    /// Current view, recomputed when the filter state or the day of `now` changes.
    pub fn view(&mut self, now: NaiveDateTime) -> QueryView<'_> {
        let day = now.date();
        let fresh = self
            .cache
            .as_ref()
            .is_some_and(|c| c.day == day && c.filters == self.filters);

        if fresh {
            debug!("reusing cached appointment view");
        } else {
            let indices = matching_indices(&self.records, &self.filters, now);
            self.cache = Some(CachedView {
                filters: self.filters.clone(),
                day,
                indices,
            });
        }

        let indices = self.cache.as_ref().map(|c| c.indices.as_slice()).unwrap_or(&[]);
        let rows: Vec<&AppointmentRecord> = indices.iter().map(|&i| &self.records[i]).collect();
        let stats = QueryStats::from_rows(&rows);

        QueryView { rows, stats }
    }
}
