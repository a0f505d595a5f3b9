//! Day-file loading and flag/file precedence

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sheetfit_core::catalog::is_catalog_exercise;
use sheetfit_core::model::parse_iso_date;
use sheetfit_core::{Day, DayEntry, DayFile, ValidationError, WeekStart};
use std::path::Path;

/// Where and when a day file gets written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayTarget {
    pub week: WeekStart,
    pub day: Day,
    pub date: NaiveDate,
}

/// A parsed day file together with its resolved target
pub struct LoadedDay {
    pub target: DayTarget,
    pub entry: DayEntry,
}

/// Flag values given on the command line; each wins over the file
#[derive(Debug, Default)]
pub struct TargetFlags<'a> {
    pub week: Option<&'a str>,
    pub day: Option<&'a str>,
    pub date: Option<&'a str>,
}

pub fn load_day_file(path: &Path, flags: &TargetFlags<'_>, today: NaiveDate) -> Result<LoadedDay> {
    let file = DayFile::from_file(path)
        .with_context(|| format!("Failed to read day file {}", path.display()))?;
    let target = resolve_target(flags, &file, today)?;
    let entry = file
        .to_day_entry()
        .with_context(|| format!("Invalid day file {}", path.display()))?;
    Ok(LoadedDay { target, entry })
}

/// Merge flags over file keys.
///
/// The week is required from one of the two; the date falls back to `today`.
pub fn resolve_target(flags: &TargetFlags<'_>, file: &DayFile, today: NaiveDate) -> Result<DayTarget> {
    let week_text = flags
        .week
        .or(file.week_start.as_deref())
        .map(str::trim)
        .unwrap_or_default();
    let week: WeekStart = week_text.parse()?;

    let day = match flags.day {
        Some(text) => text.parse()?,
        None => file
            .day
            .ok_or_else(|| anyhow::anyhow!("choose a day (use --day or `day` in the file)"))?,
    };

    let date = match flags.date.or(file.date.as_deref()) {
        Some(text) if !text.trim().is_empty() => parse_iso_date(text)?,
        _ => today,
    };

    Ok(DayTarget { week, day, date })
}

/// Exercise names outside the catalog, with their slot numbers
pub fn uncatalogued(entry: &DayEntry) -> Vec<(u8, String)> {
    entry
        .iter()
        .filter(|(slot, _)| slot.pinned_exercise().is_none())
        .filter(|(_, e)| !e.exercise.trim().is_empty() && !is_catalog_exercise(&e.exercise))
        .map(|(slot, e)| (slot.get(), e.exercise.trim().to_string()))
        .collect()
}

/// `--week` for ensure-week: the given Monday, else the current week
pub fn week_or_current(week: Option<&str>, today: NaiveDate) -> Result<WeekStart, ValidationError> {
    match week {
        Some(text) => text.parse(),
        None => Ok(WeekStart::containing(today)),
    }
}
