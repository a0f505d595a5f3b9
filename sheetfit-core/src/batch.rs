//! Cell-batch writer: one day's entries as an ordered list of cell writes

use crate::catalog::Day;
use crate::coords::{Field, cell_address};
use crate::model::{CellValue, DayEntry, SlotEntry, WeekStart};
use serde::Serialize;

/// One cell assignment in A1 notation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellWrite {
    pub a1: String,
    pub value: CellValue,
}

/// Cell writes targeting one week tab
#[derive(Debug, Clone, PartialEq)]
pub struct WriteBatch {
    pub sheet: String,
    pub cells: Vec<CellWrite>,
}

impl WriteBatch {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Build the writes for one day block.
///
/// Vacuous slots 1-6 are left out so their stored values stay untouched.
/// Slots 7 and 8, and every non-vacuous slot, are written in full, blanks
/// included, so a slot edited down to nothing clears its old values.
pub fn build_day_write_batch(week: WeekStart, day: Day, entry: &DayEntry) -> WriteBatch {
    let mut cells = Vec::new();

    for (slot, values) in entry.iter() {
        if slot.is_prunable() && values.is_vacuous() {
            continue;
        }

        for field in Field::ALL {
            cells.push(CellWrite {
                a1: cell_address(day, slot, field).to_a1(),
                value: field_value(values, field),
            });
        }
    }

    WriteBatch {
        sheet: week.sheet_name(),
        cells,
    }
}

fn field_value(values: &SlotEntry, field: Field) -> CellValue {
    match field {
        Field::Exercise => values.exercise.trim().into(),
        Field::Variation => values.variation.map(|v| v.as_str()).unwrap_or("").into(),
        Field::Sets => CellValue::from_count(values.sets),
        Field::Reps => values.reps.trim().into(),
        Field::Weight => values.weight.trim().into(),
        Field::Rpe => CellValue::from_count(values.rpe),
        Field::Notes => values.notes.trim().into(),
        Field::Done => CellValue::Bool(values.done),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{SlotNumber, Variation};

    fn week() -> WeekStart {
        "2025-01-06".parse().unwrap()
    }

    fn slot(n: u8) -> SlotNumber {
        SlotNumber::new(n).unwrap()
    }

    #[test]
    fn test_empty_day_writes_pinned_slots_only() {
        let batch = build_day_write_batch(week(), Day::Monday, &DayEntry::new());

        assert_eq!(batch.sheet, "Week 2025-01-06");
        assert_eq!(batch.len(), 16);
        assert_eq!(batch.cells[0].a1, "B13");
        assert_eq!(batch.cells[0].value, CellValue::Text("Deadhangs".into()));
        assert_eq!(batch.cells[8].a1, "B14");
        assert_eq!(batch.cells[8].value, CellValue::Text("Burpees".into()));
        assert_eq!(batch.cells[15].a1, "I14");
        assert_eq!(batch.cells[15].value, CellValue::Bool(false));
    }

    #[test]
    fn test_partially_filled_slot_writes_all_fields() {
        let mut day = DayEntry::new();
        day.set(
            slot(3),
            SlotEntry {
                notes: "felt heavy".into(),
                ..Default::default()
            },
        );

        let batch = build_day_write_batch(week(), Day::Wednesday, &day);
        assert_eq!(batch.len(), 24);

        let addrs: Vec<&str> = batch.cells[..8].iter().map(|c| c.a1.as_str()).collect();
        assert_eq!(addrs, vec!["B20", "C20", "D20", "E20", "F20", "G20", "H20", "I20"]);
        assert_eq!(batch.cells[0].value, CellValue::Text(String::new()));
        assert_eq!(batch.cells[2].value, CellValue::Text(String::new()));
        assert_eq!(batch.cells[6].value, CellValue::Text("felt heavy".into()));
        assert_eq!(batch.cells[7].value, CellValue::Bool(false));
    }

    #[test]
    fn test_typed_values() {
        let mut day = DayEntry::new();
        day.set(
            slot(1),
            SlotEntry {
                exercise: "Pullup".into(),
                variation: Some(Variation::Bands),
                sets: Some(4),
                reps: "5x3".into(),
                weight: "10kg".into(),
                rpe: Some(8),
                notes: String::new(),
                done: true,
            },
        );

        let batch = build_day_write_batch(week(), Day::Friday, &day);
        let values: Vec<&CellValue> = batch.cells[..8].iter().map(|c| &c.value).collect();
        assert_eq!(
            values,
            vec![
                &CellValue::Text("Pullup".into()),
                &CellValue::Text("Bands".into()),
                &CellValue::Number(4),
                &CellValue::Text("5x3".into()),
                &CellValue::Text("10kg".into()),
                &CellValue::Number(8),
                &CellValue::Text(String::new()),
                &CellValue::Bool(true),
            ]
        );
        assert_eq!(batch.cells[0].a1, "B29");
    }

    #[test]
    fn test_slot_ascending_order() {
        let mut day = DayEntry::new();
        for n in [5, 2] {
            day.set(
                slot(n),
                SlotEntry {
                    done: true,
                    ..Default::default()
                },
            );
        }

        let batch = build_day_write_batch(week(), Day::Monday, &day);
        let rows: Vec<&str> = batch.cells.iter().step_by(8).map(|c| c.a1.as_str()).collect();
        assert_eq!(rows, vec!["B8", "B11", "B13", "B14"]);
    }

    #[test]
    fn test_wire_shape() {
        let write = CellWrite {
            a1: "I7".into(),
            value: CellValue::Bool(true),
        };
        assert_eq!(
            serde_json::to_string(&write).unwrap(),
            r#"{"a1":"I7","value":true}"#
        );
    }
}
