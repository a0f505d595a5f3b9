//! Error taxonomy: input validation vs. relay transport failures

use chrono::NaiveDate;
use thiserror::Error;

/// Input rejected before any request is issued
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("set week")]
    MissingWeek,
    #[error("week start {0} is not a Monday")]
    NotMonday(NaiveDate),
    #[error("invalid date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),
    #[error("bad day '{0}' (expected Monday, Wednesday or Friday)")]
    UnknownDay(String),
    #[error("slot {0} out of range (expected 1-8)")]
    SlotOutOfRange(i64),
    #[error("slot {0} listed more than once")]
    DuplicateSlot(u8),
    #[error("unknown variation '{0}' (expected Normal, Bands, Elevated or Assisted)")]
    UnknownVariation(String),
    #[error("invalid cell address '{0}'")]
    InvalidCellAddress(String),
    #[error("enter a weight")]
    MissingWeight,
    #[error("no tab named '{0}'")]
    UnknownTab(String),
}

/// Failure talking to the relay or reported by the backing store
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("network error: {0}")]
    Network(String),
    #[error("relay returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("non-JSON response (content-type: {content_type})")]
    NotJson { content_type: String },
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("{0}")]
    Upstream(String),
}

/// Any failure of a tracker operation
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Relay(#[from] RelayError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
