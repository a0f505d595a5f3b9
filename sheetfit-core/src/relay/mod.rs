//! Relay client: JSON requests to the spreadsheet backend through the proxy
//!
//! Every call is independent; nothing here makes two calls atomic. Any
//! non-2xx status, non-JSON body, missing `ok` flag or `ok: false` reply is
//! surfaced as a `RelayError`, never swallowed.

#[cfg(feature = "http")]
pub mod http;

use crate::batch::{CellWrite, WriteBatch};
use crate::error::RelayError;
use crate::model::{LogEntry, WeekStart, WeekSummary, WeightEntry, cell_text};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

/// Longest slice of an error body quoted back to the user
const BODY_SNIPPET: usize = 200;

/// Raw HTTP reply, before any interpretation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl RawResponse {
    /// 200 reply with a JSON body
    pub fn json(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            content_type: Some("application/json; charset=utf-8".to_string()),
            body: body.into(),
        }
    }
}

/// Trait for the HTTP leg of the relay
pub trait Transport {
    /// GET the endpoint with the given query pairs
    fn get(&self, query: &[(&str, String)]) -> Result<RawResponse, RelayError>;

    /// POST a JSON body to the endpoint
    fn post_json(&self, body: &Value) -> Result<RawResponse, RelayError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, query: &[(&str, String)]) -> Result<RawResponse, RelayError> {
        (**self).get(query)
    }

    fn post_json(&self, body: &Value) -> Result<RawResponse, RelayError> {
        (**self).post_json(body)
    }
}

/// Write requests, tagged by `type` on the wire
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WriteRequest<'a> {
    EnsureWeek {
        week_start: WeekStart,
    },
    WriteCells {
        sheet: &'a str,
        cells: &'a [CellWrite],
    },
    ExerciseBatch {
        rows: &'a [LogEntry],
    },
    Weight {
        user: &'a str,
        day: &'a str,
        date: NaiveDate,
        weight: &'a str,
    },
}

impl WriteRequest<'_> {
    fn name(&self) -> &'static str {
        match self {
            WriteRequest::EnsureWeek { .. } => "ensure_week",
            WriteRequest::WriteCells { .. } => "write_cells",
            WriteRequest::ExerciseBatch { .. } => "exercise_batch",
            WriteRequest::Weight { .. } => "weight",
        }
    }
}

/// Known tab of the backing spreadsheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabInfo {
    pub name: String,
    #[serde(alias = "id", deserialize_with = "id_text")]
    pub gid: String,
}

/// Rows returned by `tab_dump`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TabDump {
    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
    #[serde(default)]
    pub headers: Option<Vec<Value>>,
}

impl TabDump {
    /// Header cells as text, if the relay sent any
    pub fn header_names(&self) -> Option<Vec<String>> {
        self.headers
            .as_ref()
            .map(|h| h.iter().map(cell_text).collect())
    }
}

#[derive(Deserialize)]
struct Envelope {
    ok: Option<bool>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Deserialize)]
struct Ack {}

#[derive(Deserialize)]
struct Overview {
    #[serde(default)]
    weeks: Vec<WeekSummary>,
}

#[derive(Deserialize)]
struct Diag {
    #[serde(default, alias = "sheets")]
    tabs: Vec<TabInfo>,
}

#[derive(Deserialize)]
struct Ping {
    #[serde(default)]
    proxy: Option<String>,
}

/// Client for the relay endpoint
pub struct RelayClient<T> {
    transport: T,
}

impl<T: Transport> RelayClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Create the week tab if missing; safe to repeat
    pub fn ensure_week(&self, week: WeekStart) -> Result<(), RelayError> {
        self.post(&WriteRequest::EnsureWeek { week_start: week })
    }

    /// Overwrite the cells of one batch in a single request
    pub fn write_cells(&self, batch: &WriteBatch) -> Result<(), RelayError> {
        self.post(&WriteRequest::WriteCells {
            sheet: &batch.sheet,
            cells: &batch.cells,
        })
    }

    /// Append rows to the exercise log
    pub fn exercise_batch(&self, rows: &[LogEntry]) -> Result<(), RelayError> {
        self.post(&WriteRequest::ExerciseBatch { rows })
    }

    /// Append one bodyweight entry
    pub fn weight(&self, entry: &WeightEntry) -> Result<(), RelayError> {
        self.post(&WriteRequest::Weight {
            user: &entry.user,
            day: &entry.day,
            date: entry.date,
            weight: &entry.weight,
        })
    }

    /// Per-week summaries computed by the backend
    pub fn overview(&self, limit: u32) -> Result<Vec<WeekSummary>, RelayError> {
        let query = [("fn", "overview".to_string()), ("limit", limit.to_string())];
        let overview: Overview = self.fetch("overview", &query)?;
        Ok(overview.weeks)
    }

    /// Cells of an A1 range in the tab with id `gid`
    pub fn tab_dump(&self, gid: &str, range: &str, header_row: bool) -> Result<TabDump, RelayError> {
        let mut query = vec![
            ("fn", "tab_dump".to_string()),
            ("gid", gid.to_string()),
            ("rangeA1", range.to_string()),
        ];
        if header_row {
            query.push(("headerRow", "1".to_string()));
        }
        self.fetch("tab_dump", &query)
    }

    /// Names and ids of all tabs
    pub fn diag(&self) -> Result<Vec<TabInfo>, RelayError> {
        let diag: Diag = self.fetch("diag", &[("fn", "diag".to_string())])?;
        Ok(diag.tabs)
    }

    /// Proxy health check
    pub fn ping(&self) -> Result<String, RelayError> {
        let ping: Ping = self.fetch("ping", &[("ping", "1".to_string())])?;
        Ok(ping.proxy.unwrap_or_else(|| "ok".to_string()))
    }

    fn post(&self, request: &WriteRequest<'_>) -> Result<(), RelayError> {
        let body = serde_json::to_value(request).map_err(|e| RelayError::Malformed(e.to_string()))?;
        debug!(op = request.name(), "relay POST");
        let raw = self.transport.post_json(&body)?;
        let _: Ack = decode(request.name(), raw)?;
        Ok(())
    }

    fn fetch<R: DeserializeOwned>(&self, op: &str, query: &[(&str, String)]) -> Result<R, RelayError> {
        debug!(op, "relay GET");
        let raw = self.transport.get(query)?;
        decode(op, raw)
    }
}

/// Interpret a raw reply: status, content type, JSON, then the `ok` flag
pub fn decode<R: DeserializeOwned>(op: &str, raw: RawResponse) -> Result<R, RelayError> {
    debug!(op, status = raw.status, bytes = raw.body.len(), "relay response");

    if !(200..300).contains(&raw.status) {
        return Err(RelayError::Status {
            status: raw.status,
            body: snippet(&raw.body),
        });
    }

    if let Some(ct) = &raw.content_type {
        if !ct.to_ascii_lowercase().contains("json") {
            return Err(RelayError::NotJson {
                content_type: ct.clone(),
            });
        }
    }

    let value: Value = serde_json::from_str(&raw.body).map_err(|_| RelayError::NotJson {
        content_type: raw
            .content_type
            .clone()
            .unwrap_or_else(|| "unknown".to_string()),
    })?;

    let envelope: Envelope = serde_json::from_value(value.clone())
        .map_err(|e| RelayError::Malformed(format!("{}: {}", op, e)))?;
    match envelope.ok {
        Some(true) => {}
        Some(false) => {
            let message = envelope
                .error
                .as_ref()
                .map(cell_text)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| format!("{} failed", op));
            return Err(RelayError::Upstream(message));
        }
        None => {
            return Err(RelayError::Malformed(format!("{}: reply has no 'ok' flag", op)));
        }
    }

    serde_json::from_value(value).map_err(|e| RelayError::Malformed(format!("{}: {}", op, e)))
}

fn snippet(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(BODY_SNIPPET) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

/// Tab ids come back as numbers or strings
fn id_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(cell_text(&value))
}
