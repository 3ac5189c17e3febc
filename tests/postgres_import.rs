use lead_import::import::{ImportConfig, ImportMode, LeadImporter, PgLeadStore, read_csv};
use lead_import::models::{DataResponse, ImportLog, LeadStats};
use lead_import::routes::imports::list_import_logs;
use lead_import::routes::stats::get_lead_stats;
use lead_import::test_support::{TestDatabase, TestDatabaseError, TestRocketBuilder};
use rocket::http::Status;
use rocket::routes;

const EXPORT: &str = "Vortex ID,Property Address,Property City,Property State,Name,Name 2,Mailing Street,Phone,Phone Status,Email,List Date,Insights - Equity\n\
                      V1,12 Oak Ln,Reno,NV,Jane Doe,John Doe,500 Market St,775-555-0100,DNC,Jane@X.com,3/15/2024,High\n\
                      V2,9 Elm St,Sparks,NV,Ann Lee,,,775-555-0200,,,,\n\
                      V3,4 Pine Ct,Reno,NV,,,,,,,,\n";

async fn provision(test_name: &str) -> Option<TestDatabase> {
    match TestDatabase::new_from_env().await {
        Ok(db) => Some(db),
        Err(TestDatabaseError::MissingUrl) => {
            eprintln!("skipping {test_name}: TEST_DATABASE_URL not set");
            None
        }
        Err(err) => panic!("failed to provision test database: {err:?}"),
    }
}

#[tokio::test]
async fn imports_export_into_postgres() {
    let Some(test_db) = provision("postgres import test").await else {
        return;
    };
    let pool = test_db.pool_clone();
    let rows = read_csv(EXPORT.as_bytes(), b',').expect("valid csv");
    let importer = LeadImporter::new(PgLeadStore::new(pool.clone()), ImportConfig::default());

    let result = importer.import(&rows, ImportMode::Append, |_| {}).await;

    assert!(result.success, "errors: {:?}", result.error_messages);
    assert_eq!(result.properties_imported, 3);
    assert_eq!(result.contacts_created, 3);
    assert_eq!(result.phones_created, 2);
    assert_eq!(result.dnc_phones, 1);
    assert_eq!(result.emails_created, 1);

    let (full_address, equity): (String, Option<String>) = sqlx::query_as(
        "SELECT full_address, insights->>'Equity' FROM properties WHERE vortex_id = 'V1'",
    )
    .fetch_one(&pool)
    .await
    .expect("property row");
    assert_eq!(full_address, "12 oak ln, reno, nv");
    assert_eq!(equity.as_deref(), Some("High"));

    let (name, is_absentee): (String, bool) = sqlx::query_as(
        "SELECT c.name, c.is_absentee FROM contacts c JOIN properties p ON p.id = c.property_id
         WHERE p.vortex_id = 'V1' AND c.is_decision_maker",
    )
    .fetch_one(&pool)
    .await
    .expect("decision maker");
    assert_eq!(name, "Jane Doe");
    assert!(is_absentee);

    let email: String = sqlx::query_scalar("SELECT email FROM emails")
        .fetch_one(&pool)
        .await
        .expect("email row");
    assert_eq!(email, "jane@x.com");

    let rerun = importer.import(&rows, ImportMode::Append, |_| {}).await;
    assert_eq!(rerun.properties_imported, 0);
    assert_eq!(rerun.duplicates_skipped, 3);

    test_db.close().await.expect("failed to drop test database");
}

#[tokio::test]
async fn replace_mode_clears_crm_rows_first() {
    let Some(test_db) = provision("replace mode test").await else {
        return;
    };
    let pool = test_db.pool_clone();
    let rows = read_csv(EXPORT.as_bytes(), b',').expect("valid csv");
    let importer = LeadImporter::new(PgLeadStore::new(pool.clone()), ImportConfig::default());

    importer.import(&rows, ImportMode::Append, |_| {}).await;

    let lead_id: i64 = sqlx::query_scalar(
        "INSERT INTO crm_leads (property_id) SELECT id FROM properties WHERE vortex_id = 'V1' RETURNING id",
    )
    .fetch_one(&pool)
    .await
    .expect("crm lead");
    sqlx::query("INSERT INTO lead_activities (crm_lead_id, activity) VALUES ($1, 'called')")
        .bind(lead_id)
        .execute(&pool)
        .await
        .expect("activity");
    sqlx::query("INSERT INTO call_queue (phone_id) SELECT id FROM phones")
        .execute(&pool)
        .await
        .expect("queue rows");

    let result = importer
        .import(&rows[..2], ImportMode::Replace, |_| {})
        .await;
    assert!(result.success, "errors: {:?}", result.error_messages);
    assert_eq!(result.properties_imported, 2);

    let properties: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM properties")
        .fetch_one(&pool)
        .await
        .expect("count");
    let leads: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM crm_leads")
        .fetch_one(&pool)
        .await
        .expect("count");
    assert_eq!(properties, 2);
    assert_eq!(leads, 0);

    test_db.close().await.expect("failed to drop test database");
}

#[tokio::test]
async fn stats_and_logs_routes_report_imports() {
    let Some(test_db) = provision("stats route test").await else {
        return;
    };
    let pool = test_db.pool_clone();
    let rows = read_csv(EXPORT.as_bytes(), b',').expect("valid csv");
    let importer = LeadImporter::new(PgLeadStore::new(pool.clone()), ImportConfig::default());
    importer.import(&rows, ImportMode::Append, |_| {}).await;

    let client = TestRocketBuilder::new()
        .mount_api_routes(routes![get_lead_stats, list_import_logs])
        .manage_pg_pool(pool)
        .async_client()
        .await;

    let response = client.get("/api/v1/leads/stats").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let stats: DataResponse<LeadStats> = response.into_json().await.expect("stats");
    assert_eq!(stats.data.total_properties, 3);
    assert_eq!(stats.data.total_contacts, 3);
    assert_eq!(stats.data.absentee_owners, 1);
    assert_eq!(stats.data.callable_phones, 1);
    assert_eq!(stats.data.dnc_phones, 1);
    assert!(stats.data.last_import_at.is_some());

    let response = client.get("/api/v1/imports/logs?limit=5").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let logs: DataResponse<Vec<ImportLog>> = response.into_json().await.expect("logs");
    assert_eq!(logs.data.len(), 1);
    assert_eq!(logs.data[0].imported, 3);
    assert_eq!(logs.data[0].mode, "append");

    drop(client);
    test_db.close().await.expect("failed to drop test database");
}
