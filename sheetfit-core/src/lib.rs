//! sheetfit-core: spreadsheet-backed log for a 3-day bodyweight program
//!
//! The week tab is treated as a fixed-layout table: `coords` maps slots to
//! cells, `batch` and `log` turn a day's entries into a cell batch and log
//! rows, `aggregate` reduces log rows for display, and `relay` talks to the
//! backing spreadsheet through its proxy.

pub mod aggregate;
pub mod batch;
pub mod catalog;
pub mod config;
pub mod coords;
pub mod dump;
pub mod error;
pub mod log;
pub mod model;
pub mod relay;

use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::{info, warn};

pub use aggregate::ExerciseSeries;
pub use catalog::{Day, SlotNumber, Variation};
pub use config::SheetfitConfig;
pub use dump::LogRecord;
pub use error::{Error, RelayError, Result, ValidationError};
pub use log::LogOutcome;
pub use model::{DayEntry, DayFile, LogEntry, SlotEntry, WeekStart, WeekSummary, WeightEntry};
pub use relay::{RelayClient, TabDump, TabInfo, Transport};

#[cfg(feature = "http")]
pub use relay::http::HttpTransport;

/// Outcomes of writing a day's cells and logging it, kept apart.
///
/// The two requests are independent; one may succeed while the other fails,
/// and nothing is rolled back.
#[derive(Debug)]
pub struct DaySaveReport {
    pub cells: Result<usize>,
    pub log: Result<LogOutcome>,
}

impl DaySaveReport {
    pub fn is_complete(&self) -> bool {
        self.cells.is_ok() && self.log.is_ok()
    }
}

/// Main tracker interface
pub struct Tracker<T> {
    config: SheetfitConfig,
    relay: RelayClient<T>,
}

#[cfg(feature = "http")]
impl Tracker<HttpTransport> {
    /// Create a tracker talking HTTP to the configured relay
    pub fn from_config(config: SheetfitConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let transport = HttpTransport::new(&config.relay.url, config.relay.timeout())?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: Transport> Tracker<T> {
    pub fn with_transport(config: SheetfitConfig, transport: T) -> Self {
        Self {
            config,
            relay: RelayClient::new(transport),
        }
    }

    pub fn config(&self) -> &SheetfitConfig {
        &self.config
    }

    pub fn relay(&self) -> &RelayClient<T> {
        &self.relay
    }

    /// Create the week tab if it does not exist yet
    pub fn ensure_week(&self, week: WeekStart) -> Result<()> {
        self.relay.ensure_week(week)?;
        info!(week = %week, "week ready");
        Ok(())
    }

    /// Overwrite the day block's cells; returns the number of cells written
    pub fn write_day(&self, week: WeekStart, day: Day, entry: &DayEntry) -> Result<usize> {
        let batch = batch::build_day_write_batch(week, day, entry);
        self.relay.write_cells(&batch)?;
        info!(sheet = %batch.sheet, day = %day, cells = batch.len(), "day written");
        Ok(batch.len())
    }

    /// Append the day's log rows, or report that there is nothing to log
    pub fn log_day(&self, week: WeekStart, day: Day, date: NaiveDate, entry: &DayEntry) -> Result<LogOutcome> {
        let rows = log::build_log_rows(week, day, date, entry);
        if rows.is_empty() {
            return Ok(LogOutcome::NothingToLog);
        }
        self.relay.exercise_batch(&rows)?;
        info!(week = %week, day = %day, rows = rows.len(), "day logged");
        Ok(LogOutcome::Logged(rows.len()))
    }

    /// Write cells, then log rows, reporting each outcome separately
    pub fn save_day(&self, week: WeekStart, day: Day, date: NaiveDate, entry: &DayEntry) -> DaySaveReport {
        let cells = self.write_day(week, day, entry);
        let log = self.log_day(week, day, date, entry);
        if cells.is_ok() != log.is_ok() {
            warn!(week = %week, day = %day, "week cells and exercise log now disagree");
        }
        DaySaveReport { cells, log }
    }

    /// Append a bodyweight entry.
    ///
    /// `user` falls back to the configured user, `day` to today's weekday
    /// label, `date` to today.
    pub fn log_weight(
        &self,
        weight: &str,
        user: Option<&str>,
        day: Option<&str>,
        date: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<WeightEntry> {
        let weight = weight.trim();
        if weight.is_empty() {
            return Err(ValidationError::MissingWeight.into());
        }

        let entry = WeightEntry {
            user: user
                .map(str::trim)
                .unwrap_or(self.config.weight.user.trim())
                .to_string(),
            day: day
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| today.format("%a").to_string()),
            date: date.unwrap_or(today),
            weight: weight.to_string(),
        };
        self.relay.weight(&entry)?;
        info!(date = %entry.date, "weight logged");
        Ok(entry)
    }

    /// Per-week summaries; `None` uses the configured limit
    pub fn overview(&self, limit: Option<u32>) -> Result<Vec<WeekSummary>> {
        let limit = limit.unwrap_or(self.config.overview.limit);
        Ok(self.relay.overview(limit)?)
    }

    /// Week tab names, newest first
    pub fn week_names(&self, limit: Option<u32>) -> Result<Vec<String>> {
        let weeks = self.overview(limit)?;
        Ok(aggregate::weeks_newest_first(&weeks)
            .into_iter()
            .map(|w| w.sheet_name())
            .collect())
    }

    /// Summary of the week holding `today`, else the latest one
    pub fn current_week(&self, limit: Option<u32>, today: NaiveDate) -> Result<Option<WeekSummary>> {
        let weeks = self.overview(limit)?;
        Ok(aggregate::select_current_week(&weeks, today).cloned())
    }

    pub fn tabs(&self) -> Result<Vec<TabInfo>> {
        Ok(self.relay.diag()?)
    }

    /// Look a tab up by name through `diag`
    pub fn resolve_tab(&self, name: &str) -> Result<TabInfo> {
        self.tabs()?
            .into_iter()
            .find(|t| t.name.trim() == name.trim())
            .ok_or_else(|| ValidationError::UnknownTab(name.to_string()).into())
    }

    pub fn dump(&self, gid: &str, range: &str, header_row: bool) -> Result<TabDump> {
        Ok(self.relay.tab_dump(gid, range, header_row)?)
    }

    /// Read a day block back from its week tab
    pub fn load_day(&self, week: WeekStart, day: Day) -> Result<DayEntry> {
        let tab = self.resolve_tab(&week.sheet_name())?;
        let dump = self.dump(&tab.gid, &coords::day_block_range(day), false)?;
        Ok(dump::decode_day_block(&dump.rows))
    }

    /// Every row of the exercise log tab
    pub fn log_records(&self) -> Result<Vec<LogRecord>> {
        let log = &self.config.log;
        let tab = self.resolve_tab(&log.tab)?;
        let dump = self.dump(&tab.gid, &log.range, log.header_row)?;
        let headers = dump.header_names();
        Ok(dump::decode_log_rows(headers.as_deref(), &dump.rows))
    }

    /// Total reps per week start
    pub fn weekly_reps(&self) -> Result<BTreeMap<String, f64>> {
        Ok(aggregate::reps_per_week(&self.log_records()?))
    }

    /// Per-exercise Monday/Wednesday/Friday reps for one week
    pub fn exercise_chart(&self, week: WeekStart) -> Result<Vec<ExerciseSeries>> {
        Ok(aggregate::weekly_exercise_series(&self.log_records()?, week))
    }

    pub fn ping(&self) -> Result<String> {
        Ok(self.relay.ping()?)
    }
}
