//! Upload, preview and monitor lead imports.

use crate::error::ApiError;
use crate::import::{
    ImportConfig, ImportMode, ImportProgress, ImportResult, ImportTracker, LeadImporter,
    PgLeadStore, PreviewSummary, RawRow, read_csv,
};
use crate::import::preview::preview_rows_with_sentinel;
use crate::models::{DataResponse, ImportLog};
use rocket::data::{Data, ToByteUnit};
use rocket::serde::json::Json;
use rocket::{State, get, post};
use rocket_db_pools::sqlx;
use rocket_okapi::openapi;

const DEFAULT_LOG_LIMIT: i64 = 20;
const MAX_LOG_LIMIT: i64 = 200;

/// Read a CSV upload within the configured size limit.
async fn read_upload(body: Data<'_>, config: &ImportConfig) -> Result<Vec<RawRow>, ApiError> {
    let limit = config.max_upload_mb.mebibytes();
    let upload = body
        .open(limit)
        .into_bytes()
        .await
        .map_err(|e| ApiError::BadRequest(format!("failed to read upload: {e}")))?;

    if !upload.is_complete() {
        return Err(ApiError::PayloadTooLarge(format!(
            "upload exceeds {} MB",
            config.max_upload_mb
        )));
    }

    let rows = read_csv(&upload.into_inner(), b',')?;
    log::debug!("decoded {} rows from upload", rows.len());
    Ok(rows)
}

fn parse_mode(mode: Option<&str>) -> Result<ImportMode, ApiError> {
    match mode {
        None => Ok(ImportMode::default()),
        Some(value) => value.parse().map_err(ApiError::BadRequest),
    }
}

/// Summarize an export without persisting anything.
#[openapi(tag = "Imports")]
#[post("/imports/preview", data = "<body>")]
pub async fn preview_import(
    body: Data<'_>,
    config: &State<ImportConfig>,
) -> Result<Json<DataResponse<PreviewSummary>>, ApiError> {
    let rows = read_upload(body, config).await?;
    let summary = preview_rows_with_sentinel(&rows, &config.dnc_sentinel);
    Ok(Json(DataResponse::new(summary)))
}

/// Import an export in `append` (default) or `replace` mode.
///
/// Runs to completion before responding. Only one import may run at a time.
#[openapi(tag = "Imports")]
#[post("/imports?<mode>", data = "<body>")]
pub async fn run_import(
    mode: Option<String>,
    body: Data<'_>,
    pool: &State<sqlx::PgPool>,
    config: &State<ImportConfig>,
    tracker: &State<ImportTracker>,
) -> Result<Json<DataResponse<ImportResult>>, ApiError> {
    let mode = parse_mode(mode.as_deref())?;

    let rows = read_upload(body, config).await?;

    let run = tracker
        .try_begin(rows.len())
        .ok_or_else(|| ApiError::Conflict("an import is already running".to_string()))?;

    let store = PgLeadStore::new(pool.inner().clone());
    let importer = LeadImporter::new(store, config.inner().clone());
    let result = importer
        .import(&rows, mode, |progress| run.report(progress))
        .await;

    Ok(Json(DataResponse::new(result)))
}

/// Progress of the running import, or of the last one when idle.
#[openapi(tag = "Imports")]
#[get("/imports/progress")]
pub fn import_progress(
    tracker: &State<ImportTracker>,
) -> Json<DataResponse<Option<ImportProgress>>> {
    Json(DataResponse::new(tracker.latest()))
}

/// Recent import audit records, newest first.
#[openapi(tag = "Imports")]
#[get("/imports/logs?<limit>")]
pub async fn list_import_logs(
    limit: Option<i64>,
    pool: &State<sqlx::PgPool>,
) -> Result<Json<DataResponse<Vec<ImportLog>>>, ApiError> {
    let limit = limit.unwrap_or(DEFAULT_LOG_LIMIT).clamp(1, MAX_LOG_LIMIT);

    let logs = sqlx::query_as::<_, ImportLog>(
        r#"SELECT id, source, mode, batch_id, total_records, imported, duplicates, errors, created_at
           FROM import_logs
           ORDER BY created_at DESC, id DESC
           LIMIT $1"#,
    )
    .bind(limit)
    .fetch_all(pool.inner())
    .await?;

    Ok(Json(DataResponse::new(logs)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_mode_defaults_to_append() {
        assert_eq!(parse_mode(None).expect("default"), ImportMode::Append);
        assert_eq!(
            parse_mode(Some("Replace")).expect("replace"),
            ImportMode::Replace
        );
    }

    #[test]
    fn unknown_mode_is_rejected() {
        match parse_mode(Some("merge")) {
            Err(ApiError::BadRequest(message)) => assert!(message.contains("merge")),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
