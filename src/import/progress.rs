//! Import run state: mode, phase, running progress and the final result.

use rocket_okapi::okapi::schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How an import treats data that is already in the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ImportMode {
    /// Skip rows whose natural key is already stored; never delete.
    #[default]
    Append,
    /// Delete every lead table first, then import.
    Replace,
}

impl ImportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportMode::Append => "append",
            ImportMode::Replace => "replace",
        }
    }
}

impl fmt::Display for ImportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImportMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "append" => Ok(ImportMode::Append),
            "replace" => Ok(ImportMode::Replace),
            other => Err(format!(
                "unsupported import mode '{other}'. Use 'append' or 'replace'."
            )),
        }
    }
}

/// Phase of an import run.
///
/// Runs move `Checking -> [Clearing] -> Importing -> Done`. `Error` is only
/// reachable from `Clearing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ImportPhase {
    Checking,
    Clearing,
    Importing,
    Done,
    Error,
}

impl ImportPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ImportPhase::Done | ImportPhase::Error)
    }
}

/// Snapshot handed to the progress callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportProgress {
    pub phase: ImportPhase,
    pub current: usize,
    pub total: usize,
    pub properties_imported: usize,
    pub contacts_created: usize,
    pub phones_created: usize,
    pub emails_created: usize,
    pub duplicates_skipped: usize,
    pub errors: usize,
    pub error_messages: Vec<String>,
}

impl ImportProgress {
    pub fn new(total: usize) -> Self {
        Self {
            phase: ImportPhase::Checking,
            current: 0,
            total,
            properties_imported: 0,
            contacts_created: 0,
            phones_created: 0,
            emails_created: 0,
            duplicates_skipped: 0,
            errors: 0,
            error_messages: Vec::new(),
        }
    }

    /// Count `count` failed rows and keep `message` if there is room.
    ///
    /// Identical messages are stored once; at most `max_messages` are kept.
    pub fn record_errors(&mut self, count: usize, message: String, max_messages: usize) {
        self.errors += count;
        if self.error_messages.len() < max_messages && !self.error_messages.contains(&message) {
            self.error_messages.push(message);
        }
    }
}

/// Outcome of one import run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    /// True iff the run finished with zero errors. Duplicates do not count.
    pub success: bool,
    pub mode: ImportMode,
    pub total_rows: usize,
    pub properties_imported: usize,
    pub contacts_created: usize,
    pub phones_created: usize,
    pub emails_created: usize,
    pub callable_phones: usize,
    pub dnc_phones: usize,
    pub duplicates_skipped: usize,
    pub errors: usize,
    pub error_messages: Vec<String>,
    pub batch_id: String,
}
