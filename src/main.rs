//! Command-line interface for the clinic dashboard.
//!
//! Loads the dashboard document once, then lets the user narrow the
//! appointment list, browse call logs, and view analytics summaries.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use chrono::{Local, NaiveDateTime};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clinic_dashboard::analytics::{
    api_status_series, cancellation_breakdown, default_cancellation_reasons, dynamic_ticks,
    monthly_summary, upcoming_preview,
};
use clinic_dashboard::call_logs::{filter_call_logs, LogFilter};
use clinic_dashboard::config::{AppConfig, DEFAULT_LOG_FILTER};
use clinic_dashboard::dataset::load_dataset;
use clinic_dashboard::models::{AppointmentRecord, Dataset};
use clinic_dashboard::{DashboardSession, Preset};

const MAX_ROWS: usize = 25;

struct DashboardCLI {
    dataset: Dataset,
    session: DashboardSession,
    config: AppConfig,
    log_filter: LogFilter,
    running: bool,
}

impl DashboardCLI {
    fn new(dataset: Dataset, config: AppConfig) -> Self {
        let session = DashboardSession::new(dataset.appointments.clone());
        DashboardCLI {
            dataset,
            session,
            config,
            log_filter: LogFilter::All,
            running: true,
        }
    }

    fn now() -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn print_header(&self) {
        println!("\n{}", "=".repeat(60));
        println!("       CLINIC OPERATIONS DASHBOARD");
        println!("{}", "=".repeat(60));
        println!("{}", self.dataset.welcome_message());
    }

    fn print_menu(&self) {
        let filters = self.session.filters();
        println!("\n--- Main Menu ---");
        println!("Preset: {} | Search: {:?}", filters.active_preset, filters.search_query);
        println!("1. Choose preset");
        println!("2. Search appointments");
        println!("3. Set date range");
        println!("4. Clear date range");
        println!("5. Set time range");
        println!("6. Clear time range");
        println!("7. View appointments");
        println!("8. View call logs");
        println!("9. View analytics");
        println!("10. Reset filters");
        println!("11. Exit");
        println!("{}", "-".repeat(20));
    }

    /// Read one line; an empty answer takes `default`. End of input stops the loop.
    fn get_input(&mut self, prompt: &str, default: Option<&str>) -> String {
        if let Some(def) = default {
            print!("{} [{}]: ", prompt, def);
        } else {
            print!("{}: ", prompt);
        }
        io::stdout().flush().ok();

        let mut input = String::new();
        match io::stdin().lock().read_line(&mut input) {
            Ok(0) | Err(_) => {
                self.running = false;
                return default.unwrap_or("").to_string();
            }
            Ok(_) => {}
        }
        let input = input.trim();

        if input.is_empty() {
            default.unwrap_or("").to_string()
        } else {
            input.to_string()
        }
    }

    fn get_int_input(&mut self, prompt: &str, default: Option<i32>) -> i32 {
        loop {
            let default_str = default.map(|d| d.to_string());
            let input = self.get_input(prompt, default_str.as_deref());

            if let Ok(value) = input.parse::<i32>() {
                return value;
            }
            if !self.running {
                return default.unwrap_or(0);
            }
            println!("Please enter a valid number");
        }
    }

    fn optional_input(&mut self, prompt: &str) -> Option<String> {
        let value = self.get_input(prompt, None);
        (!value.is_empty()).then_some(value)
    }

    fn choose_preset(&mut self) {
        println!("\n--- Presets ---");
        for (i, preset) in Preset::ALL.iter().enumerate() {
            println!("  {}. {}", i + 1, preset);
        }
        let choice = self.get_int_input("Select preset", Some(1));

        match usize::try_from(choice).ok().and_then(|c| c.checked_sub(1)) {
            Some(index) if index < Preset::ALL.len() => {
                self.session.set_preset(Preset::ALL[index]);
                println!("\nPreset set to {}", Preset::ALL[index]);
            }
            _ => println!("Invalid choice"),
        }
    }

    fn search(&mut self) {
        let query = self.get_input("Search text (empty to clear)", None);
        self.session.set_search(query);
    }

    fn set_date_range(&mut self) {
        if !self.session.filters().shows_date_range() {
            println!(
                "\nDate range is not available with the {} preset",
                self.session.filters().active_preset
            );
            return;
        }
        let start = self.optional_input("Start date (YYYY-MM-DD, empty for none)");
        let end = self.optional_input("End date (YYYY-MM-DD, empty for none)");
        self.session.set_date_start(start.as_deref());
        self.session.set_date_end(end.as_deref());
    }

    fn set_time_range(&mut self) {
        let start = self.optional_input("Start time (HH:MM, empty for none)");
        let end = self.optional_input("End time (HH:MM, empty for none)");
        self.session.set_time_start(start.as_deref());
        self.session.set_time_end(end.as_deref());
    }

    fn print_row(apt: &AppointmentRecord) {
        println!(
            "  {:20} {:12} {:18} {:12} {:22} {:11} {}",
            apt.display_name(),
            apt.display_dob(),
            apt.visit_type(),
            apt.display_date(),
            apt.display_time(),
            apt.display_status(),
            apt.display_phone()
        );
    }

    fn view_appointments(&mut self) {
        let view = self.session.view(Self::now());

        println!("\n--- Appointments ---");
        println!("  Total Appointments: {}", view.stats.total);
        println!("  Cancelled: {}", view.stats.cancelled_count);
        println!("  Completion Rate: {}%", view.stats.completion_rate);

        if view.is_empty() {
            println!("\nNo appointments match your filters.");
            return;
        }

        println!(
            "\n  {:20} {:12} {:18} {:12} {:22} {:11} {}",
            "PATIENT", "DOB", "VISIT TYPE", "DATE", "TIME", "STATUS", "PHONE"
        );
        for apt in view.rows.iter().take(MAX_ROWS) {
            Self::print_row(apt);
        }
        if view.rows.len() > MAX_ROWS {
            println!("\n... and {} more appointments", view.rows.len() - MAX_ROWS);
        }
    }

    fn view_call_logs(&mut self) {
        let stats = &self.dataset.logs.stats;
        println!("\n--- Call Log Filters ---");
        println!("  0. All");
        for (i, stat) in stats.iter().enumerate() {
            println!("  {}. {} ({})", i + 1, stat.label, stat.value);
        }
        let choice = self.get_int_input("Select filter", Some(0));

        self.log_filter = match usize::try_from(choice).ok().and_then(|c| c.checked_sub(1)) {
            Some(index) if index < self.dataset.logs.stats.len() => {
                LogFilter::from_label(&self.dataset.logs.stats[index].filter)
            }
            _ => LogFilter::All,
        };

        let logs = filter_call_logs(&self.dataset.logs.entries, &self.log_filter);
        println!("\n--- {} ({}) ---", self.log_filter.heading(), logs.len());

        if logs.is_empty() {
            println!("No logs found for this category.");
            return;
        }
        for log in logs.iter().take(MAX_ROWS) {
            println!(
                "  {:16} {:16} {:20} {:8} {}",
                log.from, log.to, log.start, log.duration, log.status
            );
        }
    }

    fn view_analytics(&mut self) {
        println!("\n--- Analytics ---");
        for stat in &self.dataset.dashboard.stats {
            println!("  {}: {}", stat.label, stat.value);
        }

        let comparison = &self.dataset.dashboard.sections.monthly_appointment_comparison;
        if !comparison.data.is_empty() {
            println!("\n{}", comparison.title);
            println!("  {}", monthly_summary(comparison));
            for point in &comparison.data {
                println!("  {:10} {}", point.month, point.appointments);
            }
        }

        let series = api_status_series(&self.dataset.api_cancellation_count);
        let max = series.iter().map(|p| p.count).max().unwrap_or(0);
        println!("\nAPI Appointments Counts");
        for point in &series {
            println!("  {:12} {}", point.label, point.count);
        }
        println!("  Axis ticks: {:?}", dynamic_ticks(max));

        let reasons = if self.dataset.cancellation_reasons.is_empty() {
            default_cancellation_reasons()
        } else {
            self.dataset.cancellation_reasons.clone()
        };
        let breakdown = cancellation_breakdown(&reasons);
        println!("\nCancellation Reasons (Total Cancellations: {})", breakdown.total);
        for slice in &breakdown.slices {
            println!("  {:30} {:4} ({:.1}%)", slice.name, slice.value, slice.share);
        }

        let preset = self.session.filters().active_preset;
        let preview = upcoming_preview(
            &self.dataset.appointments,
            preset,
            Self::now(),
            self.config.preview_limit,
        );
        println!("\nAppointments preview ({})", preset);
        for apt in preview {
            Self::print_row(apt);
        }
    }

    fn run(&mut self) {
        self.print_header();

        while self.running {
            self.print_menu();

            let choice = self.get_int_input("Enter choice", Some(7));
            if !self.running {
                break;
            }

            match choice {
                1 => self.choose_preset(),
                2 => self.search(),
                3 => self.set_date_range(),
                4 => self.session.clear_date_range(),
                5 => self.set_time_range(),
                6 => self.session.clear_time_range(),
                7 => self.view_appointments(),
                8 => self.view_call_logs(),
                9 => self.view_analytics(),
                10 => self.session.reset_filters(),
                11 => self.running = false,
                _ => println!("Invalid choice"),
            }
        }
        println!("\nGoodbye!");
    }
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    info!("Starting clinic dashboard");

    let config = AppConfig::from_env();

    let dataset = match load_dataset(&config.data_path) {
        Ok(dataset) => dataset,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error loading dataset: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut cli = DashboardCLI::new(dataset, config);
    cli.run();
    ExitCode::SUCCESS
}
