/// Timed entries
///
/// An entry is one immutable timed observation (a single sprint or
/// block-start run). Entries are created once by their owning account
/// and never mutated or deleted.

mod store;

pub use store::EntryStore;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two supported run kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Sprint,
    Block,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Sprint => "sprint",
            EntryKind::Block => "block",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "sprint" => Some(EntryKind::Sprint),
            "block" => Some(EntryKind::Block),
            _ => None,
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored timed observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: String,
    pub account_id: String,
    pub kind: EntryKind,
    /// Strictly positive, finite
    pub duration_secs: f64,
    /// Calendar date of the run, no time component
    pub date: NaiveDate,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating an entry
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub account_id: String,
    pub kind: EntryKind,
    pub duration_secs: f64,
    pub date: NaiveDate,
    pub location: Option<String>,
    pub notes: Option<String>,
}
