use chrono::{DateTime, Utc};
use rocket_db_pools::sqlx::FromRow;
use rocket_okapi::okapi::schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ===== Response Envelope =====

/// Envelope used by every JSON endpoint that returns data.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DataResponse<T> {
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

// ===== Import Audit =====

/// One row of the import audit log.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportLog {
    pub id: i64,
    pub source: String,
    pub mode: String,
    pub batch_id: String,
    pub total_records: i32,
    pub imported: i32,
    pub duplicates: i32,
    pub errors: i32,
    pub created_at: DateTime<Utc>,
}

// ===== Lead Statistics =====

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadStats {
    pub total_properties: i64,
    pub total_contacts: i64,
    pub absentee_owners: i64,
    pub total_phones: i64,
    pub callable_phones: i64,
    pub dnc_phones: i64,
    pub total_emails: i64,
    pub last_import_at: Option<DateTime<Utc>>,
}
