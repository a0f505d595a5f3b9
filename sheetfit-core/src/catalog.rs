//! Weekly template catalog: training days, selectable exercises and pinned slots

use crate::error::ValidationError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Number of slots in every day block (6 free + 2 pinned)
pub const SLOTS_PER_DAY: u8 = 8;

/// Highest slot number that accepts a free exercise choice
pub const LAST_FREE_SLOT: u8 = 6;

/// Exercise pinned to slot 7
pub const FIXED_SLOT7: &str = "Deadhangs";

/// Exercise pinned to slot 8
pub const FIXED_SLOT8: &str = "Burpees";

/// Exercises offered for slots 1-6
pub const EXERCISES: &[&str] = &[
    "Pushup",
    "Dip",
    "Pike Pushup",
    "Elevated Pike",
    "Wall HSPU",
    "Pullup",
    "Chinup",
    "Back Row",
    "Back Row Elevated",
    "Tuck Lever",
    "Front Lever",
    "Squat",
    "Assisted Pistol",
    "Pistol Squat",
    "Ab Wheel",
    "Knee Raises",
    "L Raises",
];

/// Whether an exercise name is one of the selectable catalog entries.
///
/// The write path never rejects out-of-catalog names; this is only a hint for
/// input surfaces.
pub fn is_catalog_exercise(name: &str) -> bool {
    EXERCISES.iter().any(|e| e.eq_ignore_ascii_case(name.trim()))
}

/// Training day of the 3-day program
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Day {
    Monday,
    Wednesday,
    Friday,
}

impl Day {
    /// All training days in week order
    pub const ALL: [Day; 3] = [Day::Monday, Day::Wednesday, Day::Friday];

    pub fn as_str(&self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Wednesday => "Wednesday",
            Day::Friday => "Friday",
        }
    }

    /// Sheet row of slot 1 in this day's block
    pub fn start_row(&self) -> u32 {
        match self {
            Day::Monday => 7,
            Day::Wednesday => 18,
            Day::Friday => 29,
        }
    }

    /// Days after the week's Monday
    pub fn offset_days(&self) -> i64 {
        match self {
            Day::Monday => 0,
            Day::Wednesday => 2,
            Day::Friday => 4,
        }
    }

    /// Position on the fixed Monday/Wednesday/Friday axis
    pub fn index(&self) -> usize {
        match self {
            Day::Monday => 0,
            Day::Wednesday => 1,
            Day::Friday => 2,
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Day {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monday" | "mon" => Ok(Day::Monday),
            "wednesday" | "wed" => Ok(Day::Wednesday),
            "friday" | "fri" => Ok(Day::Friday),
            _ => Err(ValidationError::UnknownDay(s.to_string())),
        }
    }
}

impl Serialize for Day {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Day {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Exercise variation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variation {
    Normal,
    Bands,
    Elevated,
    Assisted,
}

impl Variation {
    pub const ALL: [Variation; 4] = [
        Variation::Normal,
        Variation::Bands,
        Variation::Elevated,
        Variation::Assisted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Variation::Normal => "Normal",
            Variation::Bands => "Bands",
            Variation::Elevated => "Elevated",
            Variation::Assisted => "Assisted",
        }
    }
}

impl fmt::Display for Variation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variation {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Variation::ALL
            .iter()
            .copied()
            .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::UnknownVariation(s.to_string()))
    }
}

impl Serialize for Variation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Variation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Slot position within a day block (1..=8)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct SlotNumber(u8);

impl SlotNumber {
    pub fn new(n: u8) -> Result<Self, ValidationError> {
        if (1..=SLOTS_PER_DAY).contains(&n) {
            Ok(Self(n))
        } else {
            Err(ValidationError::SlotOutOfRange(n.into()))
        }
    }

    /// All slot numbers in ascending order
    pub fn all() -> impl Iterator<Item = SlotNumber> {
        (1..=SLOTS_PER_DAY).map(SlotNumber)
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    /// 0-based position, for indexing a day's slot array
    pub fn index(&self) -> usize {
        usize::from(self.0 - 1)
    }

    /// Exercise name structurally fixed to this slot, if any
    pub fn pinned_exercise(&self) -> Option<&'static str> {
        match self.0 {
            7 => Some(FIXED_SLOT7),
            8 => Some(FIXED_SLOT8),
            _ => None,
        }
    }

    /// Slots 1-6 are dropped from batches when vacuous; 7 and 8 never are
    pub fn is_prunable(&self) -> bool {
        self.0 <= LAST_FREE_SLOT
    }
}

impl fmt::Display for SlotNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for SlotNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let n = i64::deserialize(deserializer)?;
        u8::try_from(n)
            .map_err(|_| ValidationError::SlotOutOfRange(n))
            .and_then(SlotNumber::new)
            .map_err(serde::de::Error::custom)
    }
}
