//! Coordinate mapping from (day, slot, field) to A1 cell addresses
//!
//! The week tab has no schema of its own; this fixed offset arithmetic is what
//! stands in for one. Every day block spans columns B..I and 8 rows starting
//! at the day's start row.

use crate::catalog::{Day, SLOTS_PER_DAY, SlotNumber};
use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Semantic column of a slot row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Exercise,
    Variation,
    Sets,
    Reps,
    Weight,
    Rpe,
    Notes,
    Done,
}

impl Field {
    /// Write order inside a slot
    pub const ALL: [Field; 8] = [
        Field::Exercise,
        Field::Variation,
        Field::Sets,
        Field::Reps,
        Field::Weight,
        Field::Rpe,
        Field::Notes,
        Field::Done,
    ];

    /// Column letter, identical for all days
    pub fn column(&self) -> char {
        match self {
            Field::Exercise => 'B',
            Field::Variation => 'C',
            Field::Sets => 'D',
            Field::Reps => 'E',
            Field::Weight => 'F',
            Field::Rpe => 'G',
            Field::Notes => 'H',
            Field::Done => 'I',
        }
    }

    /// 1-based column number (A = 1)
    pub fn column_number(&self) -> u32 {
        self.column() as u32 - 'A' as u32 + 1
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Exercise => "exercise",
            Field::Variation => "variation",
            Field::Sets => "sets",
            Field::Reps => "reps",
            Field::Weight => "weight",
            Field::Rpe => "rpe",
            Field::Notes => "notes",
            Field::Done => "done",
        }
    }
}

/// Cell address in A1 notation terms (both coordinates 1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellAddress {
    pub row: u32,
    pub col: u32,
}

impl CellAddress {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Convert to A1 reference (e.g., "D7")
    pub fn to_a1(&self) -> String {
        format!("{}{}", col_to_letters(self.col), self.row)
    }
}

impl PartialOrd for CellAddress {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellAddress {
    fn cmp(&self, other: &Self) -> Ordering {
        self.row.cmp(&other.row).then_with(|| self.col.cmp(&other.col))
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1())
    }
}

impl FromStr for CellAddress {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_a1(s).ok_or_else(|| ValidationError::InvalidCellAddress(s.to_string()))
    }
}

/// Address of one field of one slot in a day block
pub fn cell_address(day: Day, slot: SlotNumber, field: Field) -> CellAddress {
    let row = day.start_row() + u32::from(slot.get()) - 1;
    CellAddress::new(row, field.column_number())
}

/// A1 range covering a whole day block, e.g. Monday -> "B7:I14"
pub fn day_block_range(day: Day) -> String {
    let first = day.start_row();
    let last = first + u32::from(SLOTS_PER_DAY) - 1;
    format!(
        "{}{}:{}{}",
        Field::Exercise.column(),
        first,
        Field::Done.column(),
        last
    )
}

/// Convert a 1-based column number to letters (1 -> A, 27 -> AA)
fn col_to_letters(col: u32) -> String {
    let mut result = String::new();
    let mut n = col;
    while n > 0 {
        let rem = (n - 1) % 26;
        result.insert(0, (b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    result
}

/// Parse "D7" into a 1-based address. Letters must precede digits.
fn parse_a1(a1: &str) -> Option<CellAddress> {
    let a1 = a1.trim();
    let split = a1.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = a1.split_at(split);
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    let mut col = 0u32;
    for ch in letters.chars() {
        col = col
            .checked_mul(26)?
            .checked_add(ch.to_ascii_uppercase() as u32 - 'A' as u32 + 1)?;
    }

    let row = digits.parse::<u32>().ok()?;
    if row == 0 {
        return None;
    }

    Some(CellAddress::new(row, col))
}
