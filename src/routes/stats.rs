use crate::error::ApiError;
use crate::models::{DataResponse, LeadStats};
use rocket::serde::json::Json;
use rocket::{State, get};
use rocket_db_pools::sqlx;
use rocket_okapi::openapi;

/// Counts across the imported lead tables.
#[openapi(tag = "Leads")]
#[get("/leads/stats")]
pub async fn get_lead_stats(
    pool: &State<sqlx::PgPool>,
) -> Result<Json<DataResponse<LeadStats>>, ApiError> {
    let stats = sqlx::query_as::<_, LeadStats>(
        r#"
        SELECT
            CAST((SELECT COUNT(*) FROM properties) AS BIGINT) as total_properties,
            CAST((SELECT COUNT(*) FROM contacts) AS BIGINT) as total_contacts,
            CAST((SELECT COUNT(*) FROM contacts WHERE is_absentee) AS BIGINT) as absentee_owners,
            CAST((SELECT COUNT(*) FROM phones) AS BIGINT) as total_phones,
            CAST((SELECT COUNT(*) FROM phones WHERE NOT is_dnc) AS BIGINT) as callable_phones,
            CAST((SELECT COUNT(*) FROM phones WHERE is_dnc) AS BIGINT) as dnc_phones,
            CAST((SELECT COUNT(*) FROM emails) AS BIGINT) as total_emails,
            (SELECT MAX(created_at) FROM import_logs) as last_import_at
        "#,
    )
    .fetch_one(pool.inner())
    .await?;

    Ok(Json(DataResponse::new(stats)))
}
