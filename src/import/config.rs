use crate::import::parser::DEFAULT_DNC_SENTINEL;
use std::env;

/// Rows persisted per batch.
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Error messages retained per run.
pub const DEFAULT_MAX_ERROR_MESSAGES: usize = 5;

pub const DEFAULT_SOURCE: &str = "vortex";

pub const DEFAULT_MAX_UPLOAD_MB: u64 = 50;

fn env_usize(key: &str, default: usize) -> usize {
    env::var(key)
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_string(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Runtime configuration for lead imports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportConfig {
    pub batch_size: usize,
    pub max_error_messages: usize,
    /// Provenance tag stored on every property and import log.
    pub source: String,
    pub dnc_sentinel: String,
    pub max_upload_mb: u64,
}

impl ImportConfig {
    pub fn from_env() -> Self {
        Self {
            batch_size: env_usize("LEADS_IMPORT_BATCH_SIZE", DEFAULT_BATCH_SIZE).max(1),
            max_error_messages: env_usize(
                "LEADS_IMPORT_MAX_ERROR_MESSAGES",
                DEFAULT_MAX_ERROR_MESSAGES,
            ),
            source: env_string("LEADS_IMPORT_SOURCE", DEFAULT_SOURCE),
            dnc_sentinel: env_string("LEADS_IMPORT_DNC_SENTINEL", DEFAULT_DNC_SENTINEL),
            max_upload_mb: env_u64("LEADS_IMPORT_MAX_UPLOAD_MB", DEFAULT_MAX_UPLOAD_MB).max(1),
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }
}

/// Fixed defaults, independent of the environment.
impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            max_error_messages: DEFAULT_MAX_ERROR_MESSAGES,
            source: DEFAULT_SOURCE.to_string(),
            dnc_sentinel: DEFAULT_DNC_SENTINEL.to_string(),
            max_upload_mb: DEFAULT_MAX_UPLOAD_MB,
        }
    }
}
