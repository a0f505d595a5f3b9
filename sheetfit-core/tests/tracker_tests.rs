use chrono::NaiveDate;
use serde_json::{Value, json};
use sheetfit_core::coords::CellAddress;
use sheetfit_core::dump::LOG_COLUMNS;
use sheetfit_core::relay::RawResponse;
use sheetfit_core::{
    Day, DayEntry, DayFile, Error, LogOutcome, RelayError, SheetfitConfig, SlotEntry, SlotNumber,
    Tracker, Transport, ValidationError, Variation, WeekStart,
};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

const LOG_GID: &str = "log";

/// In-memory stand-in for the spreadsheet behind the relay
#[derive(Default)]
struct FakeSheet {
    tabs: RefCell<BTreeMap<String, HashMap<(u32, u32), Value>>>,
    log: RefCell<Vec<Vec<Value>>>,
    weights: RefCell<Vec<Value>>,
    failures: RefCell<HashMap<String, String>>,
    requests: RefCell<Vec<String>>,
}

impl FakeSheet {
    fn fail(&self, op: &str, message: &str) {
        self.failures
            .borrow_mut()
            .insert(op.to_string(), message.to_string());
    }

    fn ok(body: Value) -> Result<RawResponse, RelayError> {
        Ok(RawResponse::json(body.to_string()))
    }

    fn error(message: &str) -> Result<RawResponse, RelayError> {
        Self::ok(json!({"ok": false, "error": message}))
    }

    /// Sheets turns numeric text into numbers
    fn coerce(value: &Value) -> Value {
        match value {
            Value::String(s) => match s.parse::<f64>() {
                Ok(n) => json!(n),
                Err(_) => value.clone(),
            },
            other => other.clone(),
        }
    }

    fn gid_of(name: &str, tabs: &BTreeMap<String, HashMap<(u32, u32), Value>>) -> String {
        let idx = tabs.keys().position(|k| k == name).unwrap_or(0);
        format!("{}", 1000 + idx)
    }

    fn dump_week(&self, gid: &str, range: &str) -> Result<RawResponse, RelayError> {
        let tabs = self.tabs.borrow();
        let Some(name) = tabs.keys().find(|k| Self::gid_of(k, &tabs) == gid) else {
            return Self::error("unknown gid");
        };
        let cells = &tabs[name];

        let (start, end) = range.split_once(':').expect("range");
        let start: CellAddress = start.parse().expect("start");
        let end: CellAddress = end.parse().expect("end");

        let rows: Vec<Vec<Value>> = (start.row..=end.row)
            .map(|row| {
                (start.col..=end.col)
                    .map(|col| cells.get(&(row, col)).cloned().unwrap_or(json!("")))
                    .collect()
            })
            .collect();
        Self::ok(json!({"ok": true, "rows": rows}))
    }

    fn overview(&self) -> Value {
        let tabs = self.tabs.borrow();
        let log = self.log.borrow();
        let weeks: Vec<Value> = tabs
            .keys()
            .map(|name| {
                let start = name.trim_start_matches("Week ");
                let mut exercises: Vec<&Value> = log
                    .iter()
                    .filter(|row| row[0] == json!(start))
                    .map(|row| &row[4])
                    .collect();
                exercises.sort_by_key(|v| v.to_string());
                exercises.dedup();
                json!({
                    "week_start": start,
                    "exercises_logged": exercises.len(),
                    "entries_weight": 0,
                    "avg_weight": null,
                })
            })
            .collect();
        json!({"ok": true, "weeks": weeks})
    }
}

impl Transport for FakeSheet {
    fn get(&self, query: &[(&str, String)]) -> Result<RawResponse, RelayError> {
        let params: HashMap<&str, &str> = query.iter().map(|(k, v)| (*k, v.as_str())).collect();
        let op = params.get("fn").copied().unwrap_or("ping");
        self.requests.borrow_mut().push(op.to_string());
        if let Some(message) = self.failures.borrow().get(op) {
            return Self::error(message);
        }

        match op {
            "ping" => Self::ok(json!({"ok": true, "proxy": "ready"})),
            "overview" => Self::ok(self.overview()),
            "diag" => {
                let tabs = self.tabs.borrow();
                let mut list: Vec<Value> = tabs
                    .keys()
                    .map(|name| {
                        let gid: u64 = Self::gid_of(name, &tabs).parse().unwrap();
                        json!({"name": name, "gid": gid})
                    })
                    .collect();
                list.push(json!({"name": "Exercise Log", "gid": LOG_GID}));
                Self::ok(json!({"ok": true, "tabs": list}))
            }
            "tab_dump" => {
                let gid = params["gid"];
                if gid == LOG_GID {
                    let rows = self.log.borrow().clone();
                    if params.contains_key("headerRow") {
                        Self::ok(json!({"ok": true, "rows": rows, "headers": LOG_COLUMNS}))
                    } else {
                        Self::ok(json!({"ok": true, "rows": rows}))
                    }
                } else {
                    self.dump_week(gid, params["rangeA1"])
                }
            }
            other => Self::error(&format!("unknown fn {}", other)),
        }
    }

    fn post_json(&self, body: &Value) -> Result<RawResponse, RelayError> {
        let op = body["type"].as_str().unwrap_or_default().to_string();
        self.requests.borrow_mut().push(op.clone());
        if let Some(message) = self.failures.borrow().get(&op) {
            return Self::error(message);
        }

        match op.as_str() {
            "ensure_week" => {
                let name = format!("Week {}", body["week_start"].as_str().unwrap());
                self.tabs.borrow_mut().entry(name).or_default();
                Self::ok(json!({"ok": true}))
            }
            "write_cells" => {
                let sheet = body["sheet"].as_str().unwrap();
                let mut tabs = self.tabs.borrow_mut();
                let Some(cells) = tabs.get_mut(sheet) else {
                    return Self::error(&format!("Sheet not found: {}", sheet));
                };
                for cell in body["cells"].as_array().unwrap() {
                    let addr: CellAddress = cell["a1"].as_str().unwrap().parse().unwrap();
                    cells.insert((addr.row, addr.col), Self::coerce(&cell["value"]));
                }
                Self::ok(json!({"ok": true}))
            }
            "exercise_batch" => {
                for row in body["rows"].as_array().unwrap() {
                    let cells = LOG_COLUMNS.iter().map(|c| Self::coerce(&row[*c])).collect();
                    self.log.borrow_mut().push(cells);
                }
                Self::ok(json!({"ok": true}))
            }
            "weight" => {
                self.weights.borrow_mut().push(body.clone());
                Self::ok(json!({"ok": true}))
            }
            other => Self::error(&format!("unknown type {}", other)),
        }
    }
}

fn tracker(sheet: &FakeSheet) -> Tracker<&FakeSheet> {
    let mut config = SheetfitConfig::default();
    config.relay.url = "https://relay.example/exec".into();
    config.weight.user = "cam".into();
    Tracker::with_transport(config, sheet)
}

fn week() -> WeekStart {
    "2025-01-06".parse().unwrap()
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn slot(n: u8) -> SlotNumber {
    SlotNumber::new(n).unwrap()
}

fn sample_day() -> DayEntry {
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
            notes: "slow negatives".into(),
            done: true,
        },
    );
    day.set(
        slot(2),
        SlotEntry {
            exercise: "Dip".into(),
            reps: "8".into(),
            ..Default::default()
        },
    );
    day.set(
        slot(7),
        SlotEntry {
            reps: "45".into(),
            ..Default::default()
        },
    );
    day
}

#[test]
fn test_write_then_read_back_round_trip() -> anyhow::Result<()> {
    let sheet = FakeSheet::default();
    let tracker = tracker(&sheet);

    tracker.ensure_week(week())?;
    let written = tracker.write_day(week(), Day::Wednesday, &sample_day())?;
    assert_eq!(written, 32);

    let loaded = tracker.load_day(week(), Day::Wednesday)?;
    assert_eq!(loaded, sample_day());

    // Monday's block was never touched
    let monday = tracker.load_day(week(), Day::Monday)?;
    assert!(monday.iter().take(6).all(|(_, e)| e.is_vacuous()));
    Ok(())
}

#[test]
fn test_sparse_write_keeps_untouched_slots() -> anyhow::Result<()> {
    let sheet = FakeSheet::default();
    let tracker = tracker(&sheet);
    tracker.ensure_week(week())?;
    tracker.write_day(week(), Day::Friday, &sample_day())?;

    // Second pass only fills slot 3; slots 1 and 2 keep their values
    let mut partial = DayEntry::new();
    partial.set(
        slot(3),
        SlotEntry {
            exercise: "Squat".into(),
            ..Default::default()
        },
    );
    tracker.write_day(week(), Day::Friday, &partial)?;

    let loaded = tracker.load_day(week(), Day::Friday)?;
    assert_eq!(loaded.slot(slot(1)).exercise, "Pullup");
    assert_eq!(loaded.slot(slot(2)).reps, "8");
    assert_eq!(loaded.slot(slot(3)).exercise, "Squat");
    // Pinned slots are always rewritten in full
    assert_eq!(loaded.slot(slot(7)).reps, "");
    Ok(())
}

#[test]
fn test_write_before_ensure_fails_upstream() {
    let sheet = FakeSheet::default();
    let tracker = tracker(&sheet);

    let err = tracker
        .write_day(week(), Day::Monday, &DayEntry::new())
        .unwrap_err();
    assert!(matches!(err, Error::Relay(RelayError::Upstream(_))));
    assert_eq!(err.to_string(), "Sheet not found: Week 2025-01-06");
}

#[test]
fn test_ensure_week_is_idempotent() -> anyhow::Result<()> {
    let sheet = FakeSheet::default();
    let tracker = tracker(&sheet);

    tracker.ensure_week(week())?;
    tracker.write_day(week(), Day::Monday, &sample_day())?;
    tracker.ensure_week(week())?;

    assert_eq!(tracker.week_names(None)?, vec!["Week 2025-01-06".to_string()]);
    assert_eq!(tracker.load_day(week(), Day::Monday)?, sample_day());
    Ok(())
}

#[test]
fn test_log_day_appends_and_duplicates() -> anyhow::Result<()> {
    let sheet = FakeSheet::default();
    let tracker = tracker(&sheet);

    let outcome = tracker.log_day(week(), Day::Monday, date("2025-01-06"), &sample_day())?;
    assert_eq!(outcome, LogOutcome::Logged(4));
    tracker.log_day(week(), Day::Monday, date("2025-01-06"), &sample_day())?;
    assert_eq!(sheet.log.borrow().len(), 8);
    Ok(())
}

#[test]
fn test_save_day_reports_partial_failure() {
    let sheet = FakeSheet::default();
    let tracker = tracker(&sheet);
    tracker.ensure_week(week()).unwrap();
    sheet.fail("exercise_batch", "Exception: Service Spreadsheets timed out");

    let report = tracker.save_day(week(), Day::Monday, date("2025-01-06"), &sample_day());
    assert!(!report.is_complete());
    assert_eq!(report.cells.as_ref().ok(), Some(&32));
    let log_err = report.log.unwrap_err();
    assert_eq!(log_err.to_string(), "Exception: Service Spreadsheets timed out");

    // The cells stay written; nothing is rolled back
    assert_eq!(tracker.load_day(week(), Day::Monday).unwrap(), sample_day());
    assert!(sheet.log.borrow().is_empty());
}

#[test]
fn test_weight_validation_happens_before_network() {
    let sheet = FakeSheet::default();
    let tracker = tracker(&sheet);

    let err = tracker
        .log_weight("  ", None, None, None, date("2025-01-07"))
        .unwrap_err();
    assert!(matches!(err, Error::Validation(ValidationError::MissingWeight)));
    assert!(sheet.requests.borrow().is_empty());
}

#[test]
fn test_weight_defaults() -> anyhow::Result<()> {
    let sheet = FakeSheet::default();
    let tracker = tracker(&sheet);

    let entry = tracker.log_weight("81.4", None, None, None, date("2025-01-07"))?;
    assert_eq!(entry.user, "cam");
    assert_eq!(entry.day, "Tue");
    assert_eq!(entry.date, date("2025-01-07"));

    let sent = &sheet.weights.borrow()[0];
    assert_eq!(
        sent,
        &json!({"type": "weight", "user": "cam", "day": "Tue", "date": "2025-01-07", "weight": "81.4"})
    );
    Ok(())
}

#[test]
fn test_weekly_reps_and_chart_from_log() -> anyhow::Result<()> {
    let sheet = FakeSheet::default();
    let tracker = tracker(&sheet);
    let next: WeekStart = "2025-01-13".parse()?;

    tracker.log_day(week(), Day::Monday, date("2025-01-06"), &sample_day())?;
    tracker.log_day(week(), Day::Friday, date("2025-01-10"), &sample_day())?;

    let mut light = DayEntry::new();
    light.set(
        slot(1),
        SlotEntry {
            exercise: "Pushup".into(),
            reps: "10".into(),
            ..Default::default()
        },
    );
    tracker.log_day(next, Day::Wednesday, date("2025-01-15"), &light)?;

    let totals = tracker.weekly_reps()?;
    // Monday and Friday each: Pullup 5 + Dip 8 + Deadhangs 45 + Burpees 0
    assert_eq!(totals["2025-01-06"], 116.0);
    assert_eq!(totals["2025-01-13"], 10.0);

    let chart = tracker.exercise_chart(week())?;
    let names: Vec<&str> = chart.iter().map(|s| s.exercise.as_str()).collect();
    assert_eq!(names, vec!["Burpees", "Deadhangs", "Dip", "Pullup"]);
    let dip = chart.iter().find(|s| s.exercise == "Dip").unwrap();
    assert_eq!(dip.points, [8.0, 0.0, 8.0]);
    Ok(())
}

#[test]
fn test_current_week_from_overview() -> anyhow::Result<()> {
    let sheet = FakeSheet::default();
    let tracker = tracker(&sheet);
    tracker.ensure_week(week())?;
    tracker.ensure_week("2025-01-13".parse()?)?;

    let current = tracker.current_week(None, date("2025-01-15"))?.unwrap();
    assert_eq!(current.week_start, "2025-01-13");

    let current = tracker.current_week(None, date("2025-02-01"))?.unwrap();
    assert_eq!(current.week_start, "2025-01-13");

    assert_eq!(
        tracker.week_names(None)?,
        vec!["Week 2025-01-13".to_string(), "Week 2025-01-06".to_string()]
    );
    Ok(())
}

#[test]
fn test_unknown_tab() {
    let sheet = FakeSheet::default();
    let tracker = tracker(&sheet);

    let err = tracker.load_day(week(), Day::Monday).unwrap_err();
    assert!(matches!(err, Error::Validation(ValidationError::UnknownTab(_))));
}

#[test]
fn test_day_file_drives_write() -> anyhow::Result<()> {
    let sheet = FakeSheet::default();
    let tracker = tracker(&sheet);
    tracker.ensure_week(week())?;

    let file = DayFile::from_toml_str(
        r#"
week_start = "2025-01-06"
day = "Fri"

[[slot]]
slot = 4
exercise = "L Raises"
sets = 3
reps = "10"
done = true
"#,
    )?;
    let day = file.day.unwrap();
    let entry = file.to_day_entry()?;
    let written = tracker.write_day(file.week_start.as_deref().unwrap().parse()?, day, &entry)?;
    assert_eq!(written, 24);

    let cells = &sheet.tabs.borrow()["Week 2025-01-06"];
    // Friday slot 4 -> row 32
    assert_eq!(cells[&(32, 2)], json!("L Raises"));
    assert_eq!(cells[&(32, 4)], json!(3));
    assert_eq!(cells[&(32, 9)], json!(true));
    Ok(())
}

#[test]
fn test_ping() -> anyhow::Result<()> {
    let sheet = FakeSheet::default();
    assert_eq!(tracker(&sheet).ping()?, "ready");
    Ok(())
}
