//! Output formatters for the read-side views

use anyhow::Result;
use colored::*;
use serde::Serialize;
use sheetfit_core::model::cell_text;
use sheetfit_core::{ExerciseSeries, TabDump, TabInfo, WeekStart, WeekSummary};
use std::collections::BTreeMap;

/// Width of the longest bar in the reps chart
const BAR_WIDTH: usize = 40;

/// Shown where a week has no weight entries
const NO_VALUE: &str = "—";

/// Print any view as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_overview(weeks: &[&WeekSummary]) {
    if weeks.is_empty() {
        println!("{}", "No weeks logged yet".yellow());
        return;
    }

    println!(
        "{}",
        format!("{:<12} {:>9} {:>8} {:>10}", "Week", "Exercises", "Weighed", "Avg weight")
            .bold()
            .underline()
    );
    for week in weeks {
        println!(
            "{:<12} {:>9} {:>8} {:>10}",
            week.week_start.cyan(),
            week.exercises_logged,
            week.entries_weight,
            avg_weight(week)
        );
    }
}

pub fn print_current(week: Option<&WeekSummary>) {
    let Some(week) = week else {
        println!("{}", "No weeks logged yet".yellow());
        return;
    };

    println!("{} {}", "Current week:".bold(), week.sheet_name().cyan().bold());
    println!("  {} {}", "Exercises logged:".bold(), week.exercises_logged);
    println!("  {} {}", "Weight entries:".bold(), week.entries_weight);
    println!("  {} {}", "Average weight:".bold(), avg_weight(week));
}

/// Total reps per week as a horizontal bar chart
pub fn print_reps(totals: &BTreeMap<String, f64>) {
    if totals.is_empty() {
        println!("{}", "Exercise log is empty".yellow());
        return;
    }

    let max = totals.values().cloned().fold(0.0_f64, f64::max);
    println!("{}", "Total reps per week".bold().underline());
    for (week, total) in totals {
        println!(
            "{:<12} {:>7} {}",
            week.cyan(),
            number(*total),
            bar(*total, max).green()
        );
    }
}

/// Per-exercise reps across the training days of one week
pub fn print_chart(week: WeekStart, series: &[ExerciseSeries]) {
    println!("{} {}", "Reps by exercise:".bold(), week.sheet_name().cyan().bold());
    if series.is_empty() {
        println!("{}", "  nothing logged for this week".yellow());
        return;
    }

    let name_width = series
        .iter()
        .map(|s| s.exercise.chars().count())
        .max()
        .unwrap_or(0)
        .max("Exercise".len());
    println!(
        "{}",
        format!(
            "{:<width$} {:>7} {:>7} {:>7}",
            "Exercise",
            "Mon",
            "Wed",
            "Fri",
            width = name_width
        )
        .bold()
        .underline()
    );
    for s in series {
        println!(
            "{:<width$} {:>7} {:>7} {:>7}",
            s.exercise,
            number(s.points[0]),
            number(s.points[1]),
            number(s.points[2]),
            width = name_width
        );
    }
}

pub fn print_tabs(tabs: &[TabInfo]) {
    if tabs.is_empty() {
        println!("{}", "No tabs reported".yellow());
        return;
    }
    for tab in tabs {
        println!("{:>12}  {}", tab.gid.bright_black(), tab.name);
    }
}

/// Tab-separated dump of a range, header first when present
pub fn print_dump(dump: &TabDump) {
    if let Some(headers) = dump.header_names() {
        println!("{}", headers.join("\t").bold());
    }
    for row in &dump.rows {
        let cells: Vec<String> = row.iter().map(cell_text).collect();
        println!("{}", cells.join("\t"));
    }
    println!("{}", format!("{} rows", dump.rows.len()).bright_black());
}

fn avg_weight(week: &WeekSummary) -> String {
    match week.avg_weight {
        Some(w) => format!("{:.1}", w),
        None => NO_VALUE.to_string(),
    }
}

/// Whole numbers without a fractional part
fn number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

fn bar(value: f64, max: f64) -> String {
    if max <= 0.0 {
        return String::new();
    }
    let len = ((value / max) * BAR_WIDTH as f64).round() as usize;
    "█".repeat(len)
}
