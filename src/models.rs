//! Data models for the clinic dashboard.
//!
//! This module defines the records the dashboard reads from its dataset:
//! - AppointmentRecord: one appointment row as exported by the booking feed
//! - StatusKind: coarse classification of free-text appointment statuses
//! - CallLogEntry / CallLogStat: call log rows and their summary cards
//! - Dataset: the whole read-only document

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Placeholder shown for empty cells.
pub const PLACEHOLDER: &str = "—";

/// A single appointment row.
///
/// Every field is optional because the upstream feed omits columns freely.
/// Dates and times are kept as the raw text the feed produced; see
/// [`crate::datetime`] for how they are interpreted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppointmentRecord {
    #[serde(deserialize_with = "lenient_text")]
    pub patient_name: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub appointment_date: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub appointment_time: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub appointment_type: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub appointment_status: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub patient_phone: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub patient_dob: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    pub duration: Option<f64>,
}

/// Accept a string or a number; anything else reads as absent.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => Some(text),
        Some(Value::Number(number)) => Some(number.to_string()),
        _ => None,
    })
}

/// Accept a number or numeric text; anything else reads as absent.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse().ok(),
        _ => None,
    })
}

impl AppointmentRecord {
    /// Fields consulted by the free-text search, skipping absent or empty ones.
    pub fn searchable_fields(&self) -> impl Iterator<Item = &str> {
        [
            self.patient_name.as_deref(),
            self.appointment_type.as_deref(),
            self.appointment_status.as_deref(),
            self.patient_phone.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter(|value| !value.is_empty())
    }

    pub fn status_kind(&self) -> StatusKind {
        StatusKind::classify(self.appointment_status.as_deref())
    }

    pub fn is_cancelled(&self) -> bool {
        self.status_kind() == StatusKind::Cancelled
    }

    pub fn display_name(&self) -> &str {
        non_empty(self.patient_name.as_deref()).unwrap_or("Unknown")
    }

    pub fn visit_type(&self) -> &str {
        non_empty(self.appointment_type.as_deref()).unwrap_or("Follow Up")
    }

    pub fn display_date(&self) -> &str {
        non_empty(self.appointment_date.as_deref()).unwrap_or(PLACEHOLDER)
    }

    /// Time followed by the booked length, e.g. `"9:30 AM (15 min)"`.
    pub fn display_time(&self) -> String {
        match non_empty(self.appointment_time.as_deref()) {
            Some(time) => format!("{} ({} min)", time, self.duration.unwrap_or(0.0)),
            None => PLACEHOLDER.to_string(),
        }
    }

    pub fn display_phone(&self) -> &str {
        non_empty(self.patient_phone.as_deref().map(str::trim)).unwrap_or(PLACEHOLDER)
    }

    pub fn display_dob(&self) -> &str {
        non_empty(self.patient_dob.as_deref().map(str::trim)).unwrap_or(PLACEHOLDER)
    }

    pub fn display_status(&self) -> &str {
        non_empty(self.appointment_status.as_deref()).unwrap_or(PLACEHOLDER)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Coarse appointment status, used for statistics and status badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusKind {
    Cancelled,
    Rescheduled,
    Completed,
    Scheduled,
    Other,
    Missing,
}

impl StatusKind {
    /// Classify a free-text status, ignoring case.
    ///
    /// Both spellings of "cancelled" count as cancelled.
    pub fn classify(status: Option<&str>) -> Self {
        let Some(status) = status.filter(|s| !s.is_empty()) else {
            return StatusKind::Missing;
        };

        match status.to_lowercase().as_str() {
            "cancelled" | "canceled" => StatusKind::Cancelled,
            "rescheduled" => StatusKind::Rescheduled,
            "completed" => StatusKind::Completed,
            "scheduled" => StatusKind::Scheduled,
            _ => StatusKind::Other,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            StatusKind::Cancelled => "CANCELLED",
            StatusKind::Rescheduled => "RESCHEDULED",
            StatusKind::Completed => "COMPLETED",
            StatusKind::Scheduled => "SCHEDULED",
            StatusKind::Other => "OTHER",
            StatusKind::Missing => "NONE",
        }
    }
}

/// One row of the call log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallLogEntry {
    pub from: String,
    pub to: String,
    pub start: String,
    pub duration: String,
    pub status: String,
}

/// A summary card above the call log. Selecting it applies `filter`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallLogStat {
    pub label: String,
    pub value: Value,
    pub filter: String,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallLogs {
    pub stats: Vec<CallLogStat>,
    pub entries: Vec<CallLogEntry>,
}

/// Appointment counts reported by the scheduling API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiStatusCounts {
    pub scheduled: u64,
    pub rescheduled: u64,
    pub cancelled: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancellationReason {
    pub reason_name: String,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonthlyPoint {
    pub month: String,
    pub appointments: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonthlyComparison {
    pub title: String,
    pub current_month: u64,
    pub last_month: u64,
    pub percentage_change: f64,
    pub data: Vec<MonthlyPoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DashboardSections {
    pub monthly_appointment_comparison: MonthlyComparison,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardStat {
    pub id: String,
    pub label: String,
    pub value: Value,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dashboard {
    pub stats: Vec<DashboardStat>,
    pub sections: DashboardSections,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub name: Option<String>,
}

/// The whole dataset document, loaded once per session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dataset {
    pub appointments: Vec<AppointmentRecord>,
    pub user: Option<UserProfile>,
    pub logs: CallLogs,
    pub api_cancellation_count: ApiStatusCounts,
    pub cancellation_reasons: Vec<CancellationReason>,
    pub dashboard: Dashboard,
}

impl Dataset {
    /// Greeting line for the signed-in user.
    pub fn welcome_message(&self) -> String {
        match self.user.as_ref().and_then(|u| non_empty(u.name.as_deref())) {
            Some(name) => format!("Welcome back, {}!", name),
            None => "Welcome back!".to_string(),
        }
    }
}
