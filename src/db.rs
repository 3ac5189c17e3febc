use rocket_db_pools::{Database, sqlx};

#[derive(Database)]
#[database("leads_db")]
pub struct LeadsDb(sqlx::PgPool);

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Apply pending schema migrations.
///
/// `run` creates the migrations table when missing, verifies checksums of
/// applied migrations, then applies the rest in order.
pub async fn run_migrations(pool: &sqlx::PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    log::info!("checking database migration state");
    MIGRATOR.run(pool).await?;
    log::info!("database migrations up to date");
    Ok(())
}
