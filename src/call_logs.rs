//! Call log filtering.

use std::fmt;

use crate::models::{CallLogEntry, CallLogStat};

/// Which call log entries to show. Status matching is exact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum LogFilter {
    #[default]
    All,
    Status(String),
}

impl LogFilter {
    /// Build a filter from a stat card's `filter` value; `"All"` or empty shows everything.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        if label.is_empty() || label == "All" {
            LogFilter::All
        } else {
            LogFilter::Status(label.to_string())
        }
    }

    pub fn matches(&self, entry: &CallLogEntry) -> bool {
        match self {
            LogFilter::All => true,
            LogFilter::Status(status) => entry.status == *status,
        }
    }

    /// Title above the log table.
    pub fn heading(&self) -> String {
        match self {
            LogFilter::All => "All Call Logs".to_string(),
            LogFilter::Status(status) => format!("{} Call Logs", status),
        }
    }
}

impl fmt::Display for LogFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFilter::All => f.write_str("All"),
            LogFilter::Status(status) => f.write_str(status),
        }
    }
}

pub fn filter_call_logs<'a>(entries: &'a [CallLogEntry], filter: &LogFilter) -> Vec<&'a CallLogEntry> {
    entries.iter().filter(|entry| filter.matches(entry)).collect()
}

/// The stat card whose filter is currently applied, if any.
pub fn active_stat<'a>(stats: &'a [CallLogStat], filter: &LogFilter) -> Option<&'a CallLogStat> {
    stats
        .iter()
        .find(|stat| LogFilter::from_label(&stat.filter) == *filter)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(status: &str) -> CallLogEntry {
        CallLogEntry {
            from: "+1 555 0100".to_string(),
            status: status.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn all_keeps_every_entry() {
        let entries = vec![entry("Successful"), entry("Failed")];
        assert_eq!(filter_call_logs(&entries, &LogFilter::All).len(), 2);
    }

    #[test]
    fn status_match_is_exact() {
        let entries = vec![entry("Successful"), entry("successful"), entry("Cancelled")];
        let filter = LogFilter::from_label("Successful");

        let kept = filter_call_logs(&entries, &filter);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].status, "Successful");
    }

    #[test]
    fn headings() {
        assert_eq!(LogFilter::All.heading(), "All Call Logs");
        assert_eq!(LogFilter::from_label("Rescheduled").heading(), "Rescheduled Call Logs");
        assert_eq!(LogFilter::from_label(" All "), LogFilter::All);
    }

    #[test]
    fn active_stat_follows_filter() {
        let stats = vec![
            CallLogStat {
                label: "Total Calls".to_string(),
                filter: "All".to_string(),
                ..Default::default()
            },
            CallLogStat {
                label: "Failed".to_string(),
                filter: "Failed".to_string(),
                ..Default::default()
            },
        ];

        let failed = LogFilter::from_label("Failed");
        assert_eq!(active_stat(&stats, &failed).map(|s| s.label.as_str()), Some("Failed"));
        assert_eq!(active_stat(&stats, &LogFilter::All).map(|s| s.label.as_str()), Some("Total Calls"));
    }
}
