//! Derived figures for the analytics page.
//!
//! These are small summaries over the dataset: an upcoming-appointments
//! preview, the API status bar series with its axis ticks, and the
//! cancellation-reason breakdown.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::filters::Preset;
use crate::models::{ApiStatusCounts, AppointmentRecord, CancellationReason, MonthlyComparison};
use crate::query::ParsedRecord;

/// Colours assigned to cancellation reasons, in order, repeating.
pub const REASON_PALETTE: [&str; 4] = ["#8884d8", "#82ca9d", "#ffc658", "#ff7c7c"];

const TICK_STEP: u64 = 6;

/// How many rows the preview shows for a preset when not overridden.
pub fn default_preview_limit(preset: Preset) -> usize {
    match preset {
        Preset::ThisWeek => 8,
        _ => 5,
    }
}

/// A short list of appointments for the analytics page.
///
/// `Today`, `Tomorrow` and `ThisWeek` narrow by date; any other preset just
/// takes the first records. Input order is kept.
pub fn upcoming_preview<'a>(
    records: &'a [AppointmentRecord],
    preset: Preset,
    now: NaiveDateTime,
    limit: Option<usize>,
) -> Vec<&'a AppointmentRecord> {
    let limit = limit.unwrap_or_else(|| default_preview_limit(preset));

    match preset {
        Preset::Today | Preset::Tomorrow | Preset::ThisWeek => {
            let window = preset.window(now);
            records
                .iter()
                .filter(|record| window.contains(ParsedRecord::parse(record).date))
                .take(limit)
                .collect()
        }
        _ => records.iter().take(limit).collect(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCountPoint {
    pub key: &'static str,
    pub label: &'static str,
    pub count: u64,
}

pub fn api_status_series(counts: &ApiStatusCounts) -> Vec<StatusCountPoint> {
    vec![
        StatusCountPoint {
            key: "scheduled",
            label: "Scheduled",
            count: counts.scheduled,
        },
        StatusCountPoint {
            key: "rescheduled",
            label: "Rescheduled",
            count: counts.rescheduled,
        },
        StatusCountPoint {
            key: "cancelled",
            label: "Cancelled",
            count: counts.cancelled,
        },
    ]
}

/// Axis ticks `0, 6, 12, ...` up to the last multiple of six within `max + 6`.
pub fn dynamic_ticks(max: u64) -> Vec<u64> {
    (0..=tick_ceiling(max)).step_by(TICK_STEP as usize).collect()
}

/// Highest tick: the last multiple of six not above `max + 6`, saturating.
fn tick_ceiling(max: u64) -> u64 {
    max.saturating_add(TICK_STEP) / TICK_STEP * TICK_STEP
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CancellationSlice {
    pub name: String,
    pub value: u64,
    pub color: &'static str,
    /// Share of all cancellations, in percent.
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CancellationBreakdown {
    pub total: u64,
    pub slices: Vec<CancellationSlice>,
}

pub fn cancellation_breakdown(reasons: &[CancellationReason]) -> CancellationBreakdown {
    let total: u64 = reasons.iter().map(|r| r.count).sum();

    let slices = reasons
        .iter()
        .enumerate()
        .map(|(i, reason)| CancellationSlice {
            name: reason.reason_name.clone(),
            value: reason.count,
            color: REASON_PALETTE[i % REASON_PALETTE.len()],
            share: if total == 0 {
                0.0
            } else {
                reason.count as f64 * 100.0 / total as f64
            },
        })
        .collect();

    CancellationBreakdown { total, slices }
}

/// Reasons reported by the booking feed when the dataset carries none.
pub fn default_cancellation_reasons() -> Vec<CancellationReason> {
    [
        ("CANCELLED FROM API", 37),
        ("TEST CANCELLATION", 1),
        ("PATIENT CANCELED APPOINTMENT", 1),
        ("RESCHEDULED FROM API", 30),
    ]
    .into_iter()
    .map(|(name, count)| CancellationReason {
        reason_name: name.to_string(),
        count,
    })
    .collect()
}

pub fn monthly_summary(comparison: &MonthlyComparison) -> String {
    format!(
        "Current Month: {} | Last Month: {} | Change: {}%",
        comparison.current_month, comparison.last_month, comparison.percentage_change
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dated(date: &str, name: &str) -> AppointmentRecord {
        AppointmentRecord {
            patient_name: Some(name.to_string()),
            appointment_date: Some(date.to_string()),
            ..Default::default()
        }
    }

    fn wednesday() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 13)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    #[test]
    fn ticks_cover_max_plus_one_step() {
        assert_eq!(dynamic_ticks(0), vec![0, 6]);
        assert_eq!(dynamic_ticks(12), vec![0, 6, 12, 18]);
        assert_eq!(dynamic_ticks(37), vec![0, 6, 12, 18, 24, 30, 36, 42]);
    }

    #[test]
    fn tick_ceiling_saturates_at_the_top_of_the_range() {
        assert_eq!(tick_ceiling(0), 6);
        assert_eq!(tick_ceiling(37), 42);
        assert_eq!(tick_ceiling(u64::MAX), u64::MAX / 6 * 6);
        assert_eq!(tick_ceiling(u64::MAX) % 6, 0);
    }

    #[test]
    fn breakdown_cycles_palette_and_totals() {
        let mut reasons = default_cancellation_reasons();
        reasons.push(CancellationReason {
            reason_name: "OTHER".to_string(),
            count: 0,
        });

        let breakdown = cancellation_breakdown(&reasons);
        assert_eq!(breakdown.total, 69);
        assert_eq!(breakdown.slices[0].color, "#8884d8");
        assert_eq!(breakdown.slices[4].color, "#8884d8");
        assert_eq!(breakdown.slices[4].share, 0.0);
        assert!((breakdown.slices[0].share - 53.62).abs() < 0.01);
    }

    #[test]
    fn breakdown_of_nothing_is_zero() {
        let breakdown = cancellation_breakdown(&[]);
        assert_eq!(breakdown.total, 0);
        assert!(breakdown.slices.is_empty());
    }

    #[test]
    fn api_series_order() {
        let series = api_status_series(&ApiStatusCounts {
            scheduled: 40,
            rescheduled: 30,
            cancelled: 39,
        });
        let labels: Vec<&str> = series.iter().map(|p| p.label).collect();
        assert_eq!(labels, vec!["Scheduled", "Rescheduled", "Cancelled"]);
        assert_eq!(series[2].count, 39);
    }

    #[test]
    fn today_preview_keeps_only_today() {
        let records = vec![
            dated("3/12/2024", "yesterday"),
            dated("3/13/2024", "a"),
            dated("13/03/2024", "b"),
            dated("3/14/2024", "tomorrow"),
        ];

        let names: Vec<&str> = upcoming_preview(&records, Preset::Today, wednesday(), None)
            .iter()
            .map(|r| r.display_name())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn week_preview_is_capped_at_eight() {
        let records: Vec<AppointmentRecord> = (10..=16)
            .flat_map(|day| {
                let date = format!("3/{}/2024", day);
                [dated(&date, "x"), dated(&date, "y")]
            })
            .collect();

        assert_eq!(upcoming_preview(&records, Preset::ThisWeek, wednesday(), None).len(), 8);
        assert_eq!(upcoming_preview(&records, Preset::ThisWeek, wednesday(), Some(3)).len(), 3);
    }

    #[test]
    fn other_presets_take_first_records() {
        let records = vec![dated("1/1/2020", "old"), AppointmentRecord::default()];
        let preview = upcoming_preview(&records, Preset::LastMonth, wednesday(), None);
        assert_eq!(preview.len(), 2);
        assert_eq!(preview[0].display_name(), "old");
    }

    #[test]
    fn monthly_summary_text() {
        let comparison = MonthlyComparison {
            current_month: 96,
            last_month: 80,
            percentage_change: 20.0,
            ..Default::default()
        };
        assert_eq!(
            monthly_summary(&comparison),
            "Current Month: 96 | Last Month: 80 | Change: 20%"
        );
    }
}
