//! Log appender: one day's entries as append-only log rows

use crate::catalog::Day;
use crate::model::{DayEntry, LogEntry, WeekStart};
use chrono::NaiveDate;

/// Result of logging a day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutcome {
    /// No rows qualified; no request was sent
    NothingToLog,
    /// This many rows were appended
    Logged(usize),
}

/// Build log rows for one day.
///
/// Same pruning rule as the cell batch: vacuous slots 1-6 are skipped,
/// the pinned slots 7 and 8 are always recorded.
pub fn build_log_rows(week: WeekStart, day: Day, date: NaiveDate, entry: &DayEntry) -> Vec<LogEntry> {
    entry
        .iter()
        .filter(|(slot, values)| !(slot.is_prunable() && values.is_vacuous()))
        .map(|(slot, values)| LogEntry {
            week_start: week,
            day,
            date,
            slot,
            exercise: values.exercise.trim().to_string(),
            variation: values.variation,
            sets: values.sets,
            reps: values.reps.trim().to_string(),
            weight: values.weight.trim().to_string(),
            rpe: values.rpe,
            notes: values.notes.trim().to_string(),
            done: values.done,
        })
        .collect()
}
