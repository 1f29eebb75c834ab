//! Clinic operations dashboard: appointment query engine and supporting data.
//!
//! The core is [`query::evaluate`], a pure function from a record set, a
//! [`filters::FilterState`] and the current instant to a sorted, summarized
//! view.

pub mod analytics;
pub mod call_logs;
pub mod config;
pub mod dataset;
pub mod datetime;
pub mod filters;
pub mod models;
pub mod query;

pub use filters::{FilterState, Preset};
pub use models::{AppointmentRecord, Dataset};
pub use query::{evaluate, DashboardSession, QueryStats, QueryView};
