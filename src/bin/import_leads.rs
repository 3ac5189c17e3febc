use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use sqlx::postgres::PgPoolOptions;

use lead_import::db::run_migrations;
use lead_import::import::preview::preview_rows_with_sentinel;
use lead_import::import::{ImportConfig, ImportMode, LeadImporter, PgLeadStore, read_csv_file};

#[derive(Parser, Debug)]
#[command(name = "import_leads", about = "Import or preview a lead export file")]
struct Args {
    /// Path to the exported CSV file.
    #[arg(long)]
    file: PathBuf,

    /// Import mode (`append` or `replace`).
    #[arg(long, default_value = "append")]
    mode: String,

    /// Print a summary of the file without touching the database.
    #[arg(long)]
    preview: bool,

    /// Single-byte field delimiter.
    #[arg(long, default_value = ",")]
    delimiter: char,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let args = Args::parse();

    if !args.delimiter.is_ascii() {
        writeln!(io::stderr(), "error: delimiter must be a single ASCII character")?;
        std::process::exit(1);
    }

    let mode: ImportMode = match args.mode.parse() {
        Ok(mode) => mode,
        Err(message) => {
            writeln!(io::stderr(), "error: {message}")?;
            std::process::exit(1);
        }
    };

    let config = ImportConfig::from_env();
    let rows = read_csv_file(&args.file, args.delimiter as u8)?;
    log::info!("read {} rows from {}", rows.len(), args.file.display());

    if args.preview {
        let summary = preview_rows_with_sentinel(&rows, &config.dnc_sentinel);
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let database_url = std::env::var("DATABASE_URL")?;
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    run_migrations(&pool).await?;

    let importer = LeadImporter::new(PgLeadStore::new(pool.clone()), config);
    let result = importer
        .import(&rows, mode, |progress| {
            log::info!(
                "{:?}: {}/{} rows, {} properties, {} errors",
                progress.phase,
                progress.current,
                progress.total,
                progress.properties_imported,
                progress.errors
            );
        })
        .await;

    pool.close().await;

    println!("{}", serde_json::to_string_pretty(&result)?);

    if !result.success {
        std::process::exit(1);
    }

    Ok(())
}
