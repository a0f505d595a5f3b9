//! Decoding of `tab_dump` rows back into log records and day blocks

use crate::catalog::{SLOTS_PER_DAY, SlotNumber};
use crate::coords::Field;
use crate::model::{DayEntry, SlotEntry, cell_bool, cell_text, parse_iso_date};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

/// Column order of `exercise_batch` rows in the log tab
pub const LOG_COLUMNS: [&str; 12] = [
    "week_start",
    "day",
    "date",
    "slot",
    "exercise",
    "variation",
    "sets",
    "reps",
    "weight",
    "rpe",
    "notes",
    "done",
];

/// One raw row of the exercise log, every cell normalized to text
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LogRecord {
    pub week_start: String,
    pub day: String,
    pub date: String,
    pub slot: String,
    pub exercise: String,
    pub variation: String,
    pub sets: String,
    pub reps: String,
    pub weight: String,
    pub rpe: String,
    pub notes: String,
    pub done: bool,
}

impl LogRecord {
    fn set(&mut self, column: &str, value: &Value) {
        let text = cell_text(value);
        match column {
            "week_start" => self.week_start = iso_or_raw(text),
            "day" => self.day = text,
            "date" => self.date = iso_or_raw(text),
            "slot" => self.slot = text,
            "exercise" => self.exercise = text,
            "variation" => self.variation = text,
            "sets" => self.sets = text,
            "reps" => self.reps = text,
            "weight" => self.weight = text,
            "rpe" => self.rpe = text,
            "notes" => self.notes = text,
            "done" => self.done = cell_bool(value),
            _ => {}
        }
    }
}

/// Decode log tab rows.
///
/// With headers (returned by the relay, or found as the first row) cells are
/// matched by column name; otherwise the `LOG_COLUMNS` order is assumed.
/// Blank rows are dropped.
pub fn decode_log_rows(headers: Option<&[String]>, rows: &[Vec<Value>]) -> Vec<LogRecord> {
    let (columns, body): (Vec<String>, &[Vec<Value>]) = match headers {
        Some(h) if !h.is_empty() => (h.iter().map(|s| normalize_header(s)).collect(), rows),
        _ => match rows.split_first() {
            Some((first, rest)) if looks_like_header(first) => {
                (first.iter().map(|v| normalize_header(&cell_text(v))).collect(), rest)
            }
            _ => (LOG_COLUMNS.iter().map(|s| s.to_string()).collect(), rows),
        },
    };

    body.iter()
        .filter(|row| row.iter().any(|v| !cell_text(v).is_empty()))
        .map(|row| {
            let mut record = LogRecord::default();
            for (column, value) in columns.iter().zip(row.iter()) {
                record.set(column, value);
            }
            record
        })
        .collect()
}

/// Decode a dumped day block (columns B..I, one row per slot) into a day
pub fn decode_day_block(rows: &[Vec<Value>]) -> DayEntry {
    let mut day = DayEntry::new();

    for (slot, row) in SlotNumber::all().zip(rows.iter().take(usize::from(SLOTS_PER_DAY))) {
        let cell = |field: Field| row.get(field_offset(field)).unwrap_or(&Value::Null);

        let variation_text = cell_text(cell(Field::Variation));
        let variation = if variation_text.is_empty() {
            None
        } else {
            match variation_text.parse() {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!(slot = slot.get(), value = %variation_text, "ignoring unknown variation");
                    None
                }
            }
        };

        day.set(
            slot,
            SlotEntry {
                exercise: cell_text(cell(Field::Exercise)),
                variation,
                sets: count_cell(slot, "sets", cell(Field::Sets)),
                reps: cell_text(cell(Field::Reps)),
                weight: cell_text(cell(Field::Weight)),
                rpe: count_cell(slot, "rpe", cell(Field::Rpe)),
                notes: cell_text(cell(Field::Notes)),
                done: cell_bool(cell(Field::Done)),
            },
        );
    }

    day
}

/// Position of a field inside a block row that starts at the exercise column
fn field_offset(field: Field) -> usize {
    (field.column_number() - Field::Exercise.column_number()) as usize
}

fn count_cell(slot: SlotNumber, name: &str, value: &Value) -> Option<u32> {
    let text = cell_text(value);
    if text.is_empty() {
        return None;
    }
    match text.parse::<u32>() {
        Ok(n) => Some(n),
        Err(_) => {
            warn!(slot = slot.get(), field = name, value = %text, "ignoring non-integer cell");
            None
        }
    }
}

fn iso_or_raw(text: String) -> String {
    match parse_iso_date(&text) {
        Ok(date) => date.to_string(),
        Err(_) => text,
    }
}

/// "Week Start" -> "week_start"
fn normalize_header(header: &str) -> String {
    header
        .trim()
        .to_ascii_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

fn looks_like_header(row: &[Value]) -> bool {
    row.iter()
        .any(|v| normalize_header(&cell_text(v)) == LOG_COLUMNS[0])
}
