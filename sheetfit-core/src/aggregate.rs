//! Read-side reductions over log records and week summaries

use crate::catalog::Day;
use crate::dump::LogRecord;
use crate::model::{WeekStart, WeekSummary};
use chrono::{Duration, NaiveDate};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// X axis of the weekly chart
pub const DAY_AXIS: [Day; 3] = Day::ALL;

/// First decimal number anywhere in the text, or 0.
///
/// `"5x3"` -> 5, `"8"` -> 8, `"2.5 min"` -> 2.5, `""` / `"n/a"` -> 0.
pub fn first_number(text: &str) -> f64 {
    static NUMBER: OnceLock<Regex> = OnceLock::new();
    let re = NUMBER.get_or_init(|| Regex::new(r"\d+(?:\.\d+)?").unwrap());

    re.find(text)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Total reps per week-start key
pub fn reps_per_week(records: &[LogRecord]) -> BTreeMap<String, f64> {
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    for record in records {
        let key = record.week_start.trim();
        if key.is_empty() {
            continue;
        }
        *totals.entry(key.to_string()).or_default() += first_number(&record.reps);
    }
    totals
}

/// Reps of one exercise on Monday, Wednesday and Friday
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseSeries {
    pub exercise: String,
    pub points: [f64; 3],
}

/// One series per exercise logged in `week`, zero-filled on the day axis
pub fn weekly_exercise_series(records: &[LogRecord], week: WeekStart) -> Vec<ExerciseSeries> {
    let key = week.to_string();
    let mut series: BTreeMap<&str, [f64; 3]> = BTreeMap::new();

    for record in records.iter().filter(|r| r.week_start == key) {
        let Some(day) = logged_day(&record.day) else {
            continue;
        };
        let exercise = record.exercise.trim();
        if exercise.is_empty() {
            continue;
        }
        series.entry(exercise).or_insert([0.0; 3])[day.index()] += first_number(&record.reps);
    }

    series
        .into_iter()
        .map(|(exercise, points)| ExerciseSeries {
            exercise: exercise.to_string(),
            points,
        })
        .collect()
}

/// Training day of a log row; only the full names written by the log appender count
fn logged_day(name: &str) -> Option<Day> {
    let name = name.trim();
    Day::ALL.into_iter().find(|d| d.as_str() == name)
}

/// Week whose 7-day span holds `today`, else the latest week
pub fn select_current_week(weeks: &[WeekSummary], today: NaiveDate) -> Option<&WeekSummary> {
    let dated: Vec<(NaiveDate, &WeekSummary)> = weeks
        .iter()
        .filter_map(|w| w.start_date().map(|d| (d, w)))
        .collect();

    dated
        .iter()
        .filter(|(start, _)| today >= *start && today <= *start + Duration::days(6))
        .max_by_key(|(start, _)| *start)
        .or_else(|| dated.iter().max_by_key(|(start, _)| *start))
        .map(|(_, w)| *w)
}

/// Week summaries ordered newest first by start date; unparseable starts go
/// last, ordered by their raw text
pub fn weeks_newest_first(weeks: &[WeekSummary]) -> Vec<&WeekSummary> {
    let mut sorted: Vec<&WeekSummary> = weeks.iter().collect();
    sorted.sort_by(|a, b| {
        b.start_date()
            .cmp(&a.start_date())
            .then_with(|| b.week_start.cmp(&a.week_start))
    });
    sorted
}
