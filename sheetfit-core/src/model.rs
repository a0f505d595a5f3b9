//! Week, slot and log record types, plus the value conventions of the wire

use crate::catalog::{Day, SLOTS_PER_DAY, SlotNumber, Variation};
use crate::error::ValidationError;
use chrono::{DateTime, Datelike, Duration, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const WEEK_TAB_PREFIX: &str = "Week ";

/// Parse an ISO date, tolerating a trailing time part.
///
/// Date cells come back from the sheet as UTC instants of local midnight, so
/// a full RFC 3339 timestamp is rounded to the nearest calendar day:
/// "2025-01-06T05:00:00Z" and "2025-01-05T23:00:00Z" both give 2025-01-06.
pub fn parse_iso_date(s: &str) -> Result<NaiveDate, ValidationError> {
    let s = s.trim();
    if s.len() > 10 {
        if let Ok(instant) = DateTime::parse_from_rfc3339(s) {
            return Ok((instant.naive_utc() + Duration::hours(12)).date());
        }
    }
    let head = s.get(..10).unwrap_or(s);
    NaiveDate::parse_from_str(head, "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(s.to_string()))
}

/// Monday that keys a week tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WeekStart(NaiveDate);

impl WeekStart {
    pub fn new(date: NaiveDate) -> Result<Self, ValidationError> {
        if date.weekday() == chrono::Weekday::Mon {
            Ok(Self(date))
        } else {
            Err(ValidationError::NotMonday(date))
        }
    }

    /// Monday on or before `date`
    pub fn containing(date: NaiveDate) -> Self {
        let back = i64::from(date.weekday().num_days_from_monday());
        Self(date - Duration::days(back))
    }

    /// Parse a tab name of the form "Week 2025-01-06"
    pub fn from_sheet_name(name: &str) -> Result<Self, ValidationError> {
        name.trim()
            .strip_prefix(WEEK_TAB_PREFIX)
            .unwrap_or(name)
            .parse()
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn sheet_name(&self) -> String {
        format!("{}{}", WEEK_TAB_PREFIX, self.0)
    }

    /// Calendar date of a training day in this week
    pub fn date_of(&self, day: Day) -> NaiveDate {
        self.0 + Duration::days(day.offset_days())
    }

    /// Whether `date` falls in [start, start + 6]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.0 && date <= self.0 + Duration::days(6)
    }
}

impl fmt::Display for WeekStart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for WeekStart {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(ValidationError::MissingWeek);
        }
        WeekStart::new(parse_iso_date(s)?)
    }
}

impl Serialize for WeekStart {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for WeekStart {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Values entered for one slot.
///
/// Reps and weight stay text so composite notations like "5x3" survive
/// storage untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlotEntry {
    #[serde(default)]
    pub exercise: String,
    #[serde(default, with = "blank_variation")]
    pub variation: Option<Variation>,
    #[serde(default, with = "blank_int")]
    pub sets: Option<u32>,
    #[serde(default)]
    pub reps: String,
    #[serde(default)]
    pub weight: String,
    #[serde(default, with = "blank_int")]
    pub rpe: Option<u32>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub done: bool,
}

impl SlotEntry {
    /// Every field empty or false
    pub fn is_vacuous(&self) -> bool {
        self.exercise.trim().is_empty()
            && self.variation.is_none()
            && self.sets.is_none()
            && self.reps.trim().is_empty()
            && self.weight.trim().is_empty()
            && self.rpe.is_none()
            && self.notes.trim().is_empty()
            && !self.done
    }
}

/// The eight slots of one day, in slot order
#[derive(Debug, Clone, PartialEq)]
pub struct DayEntry {
    slots: [SlotEntry; SLOTS_PER_DAY as usize],
}

impl DayEntry {
    /// Empty day with the pinned exercises pre-filled
    pub fn new() -> Self {
        let mut day = Self {
            slots: Default::default(),
        };
        for slot in SlotNumber::all() {
            day.set(slot, SlotEntry::default());
        }
        day
    }

    pub fn slot(&self, slot: SlotNumber) -> &SlotEntry {
        &self.slots[slot.index()]
    }

    /// Store an entry; pinned slots keep their structural exercise name
    pub fn set(&mut self, slot: SlotNumber, mut entry: SlotEntry) {
        entry.exercise = match slot.pinned_exercise() {
            Some(name) => name.to_string(),
            None => entry.exercise.trim().to_string(),
        };
        self.slots[slot.index()] = entry;
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlotNumber, &SlotEntry)> {
        SlotNumber::all().zip(self.slots.iter())
    }
}

impl Default for DayEntry {
    fn default() -> Self {
        Self::new()
    }
}

/// One slot as listed in a day file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotInput {
    pub slot: i64,
    #[serde(flatten)]
    pub entry: SlotEntry,
}

/// TOML day file: any subset of slots plus optional week/day/date defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DayFile {
    #[serde(default)]
    pub week_start: Option<String>,
    #[serde(default)]
    pub day: Option<Day>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, rename = "slot")]
    pub slots: Vec<SlotInput>,
}

impl DayFile {
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Build the full eight-slot day; unlisted slots stay empty
    pub fn to_day_entry(&self) -> Result<DayEntry, ValidationError> {
        let mut day = DayEntry::new();
        let mut seen = [false; SLOTS_PER_DAY as usize];

        for input in &self.slots {
            let n = u8::try_from(input.slot)
                .map_err(|_| ValidationError::SlotOutOfRange(input.slot))?;
            let slot = SlotNumber::new(n)?;
            if std::mem::replace(&mut seen[slot.index()], true) {
                return Err(ValidationError::DuplicateSlot(n));
            }
            day.set(slot, input.entry.clone());
        }

        Ok(day)
    }

    /// Blank day file with the exercise catalog listed as comments
    pub fn template(day: Day) -> String {
        let mut out = String::new();
        out.push_str(&format!("day = \"{}\"\n", day));
        out.push_str("# week_start = \"YYYY-MM-DD\"  (a Monday)\n");
        out.push_str("# date = \"YYYY-MM-DD\"\n");
        out.push_str("#\n# exercises: ");
        out.push_str(&crate::catalog::EXERCISES.join(", "));
        out.push_str("\n# variations: ");
        let variations: Vec<&str> = Variation::ALL.iter().map(|v| v.as_str()).collect();
        out.push_str(&variations.join(", "));
        out.push('\n');

        for slot in SlotNumber::all() {
            out.push_str("\n[[slot]]\n");
            out.push_str(&format!("slot = {}\n", slot));
            match slot.pinned_exercise() {
                Some(name) => out.push_str(&format!("# exercise = \"{}\"  (fixed)\n", name)),
                None => out.push_str("exercise = \"\"\n"),
            }
            out.push_str("variation = \"\"\nsets = \"\"\nreps = \"\"\nweight = \"\"\n");
            out.push_str("rpe = \"\"\nnotes = \"\"\ndone = false\n");
        }
        out
    }
}

/// Append-only exercise log record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub week_start: WeekStart,
    pub day: Day,
    pub date: NaiveDate,
    pub slot: SlotNumber,
    pub exercise: String,
    #[serde(with = "blank_variation")]
    pub variation: Option<Variation>,
    #[serde(with = "blank_int")]
    pub sets: Option<u32>,
    pub reps: String,
    pub weight: String,
    #[serde(with = "blank_int")]
    pub rpe: Option<u32>,
    pub notes: String,
    pub done: bool,
}

/// Append-only bodyweight record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightEntry {
    pub user: String,
    pub day: String,
    pub date: NaiveDate,
    pub weight: String,
}

/// Per-week aggregate computed by the backing store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekSummary {
    pub week_start: String,
    #[serde(default)]
    pub exercises_logged: u64,
    #[serde(default)]
    pub entries_weight: u64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub avg_weight: Option<f64>,
}

impl WeekSummary {
    pub fn start_date(&self) -> Option<NaiveDate> {
        parse_iso_date(&self.week_start).ok()
    }

    pub fn sheet_name(&self) -> String {
        match self.start_date() {
            Some(date) => format!("{}{}", WEEK_TAB_PREFIX, date),
            None => format!("{}{}", WEEK_TAB_PREFIX, self.week_start.trim()),
        }
    }
}

/// Value of one cell in a `write_cells` batch
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Number(i64),
    Bool(bool),
}

impl CellValue {
    /// Text cell, number cell, or "" for an empty optional number
    pub fn from_count(value: Option<u32>) -> Self {
        match value {
            Some(n) => CellValue::Number(i64::from(n)),
            None => CellValue::Text(String::new()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

/// Render a cell from a range dump as text; whole numbers drop the ".0"
pub fn cell_text(value: &serde_json::Value) -> String {
    use serde_json::Value;

    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

/// Coerce a dumped checkbox cell to a boolean
pub fn cell_bool(value: &serde_json::Value) -> bool {
    use serde_json::Value;

    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "yes" | "1" | "x"),
        _ => false,
    }
}

/// Optional integer that travels as a number or as "" when empty
pub(crate) mod blank_int {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<u32>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(n) => serializer.serialize_u32(*n),
            None => serializer.serialize_str(""),
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(u64),
        Float(f64),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
        let raw: Option<Raw> = Option::deserialize(deserializer)?;
        let value = match raw {
            None => None,
            Some(Raw::Int(n)) => Some(n),
            Some(Raw::Float(f)) if f >= 0.0 && f.fract() == 0.0 => Some(f as u64),
            Some(Raw::Float(f)) => {
                return Err(serde::de::Error::custom(format!("expected a whole number, got {}", f)));
            }
            Some(Raw::Text(s)) if s.trim().is_empty() => None,
            Some(Raw::Text(s)) => Some(s.trim().parse::<u64>().map_err(|_| {
                serde::de::Error::custom(format!("expected a whole number, got '{}'", s))
            })?),
        };
        value
            .map(|n| u32::try_from(n).map_err(serde::de::Error::custom))
            .transpose()
    }
}

/// Optional variation that travels as its name or as "" when empty
pub(crate) mod blank_variation {
    use crate::catalog::Variation;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<Variation>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value.map(|v| v.as_str()).unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Variation>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            Some(s) if !s.trim().is_empty() => s.parse().map(Some).map_err(serde::de::Error::custom),
            _ => Ok(None),
        }
    }
}

/// Number, numeric string, "" or null
fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}
