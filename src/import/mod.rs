//! Lead export import pipeline.
//!
//! Turns wide vendor export rows into properties, contacts, phones and emails:
//!
//! 1. **Reading** (`reader`) - Decodes CSV bytes into raw column/value rows
//! 2. **Normalization** (`sanitize`, `coerce`, `parser`) - Cleans cells and
//!    splits each row into its entities
//! 3. **Preview** (`preview`) - Summarizes an export without touching storage
//! 4. **Data Preparation** (`data_builder`) - Builds columnar payloads and
//!    stitches generated ids between tables
//! 5. **Coordination** (`coordinator`) - Runs append/replace imports batch by
//!    batch with per-row fallback
//! 6. **Storage** (`store`, `database_operations`) - The store seam and its
//!    PostgreSQL implementation using UNNEST bulk inserts
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use lead_import::import::{ImportConfig, ImportMode, LeadImporter, PgLeadStore, read_csv};
//!
//! let rows = read_csv(&bytes, b',')?;
//! let importer = LeadImporter::new(PgLeadStore::new(pool), ImportConfig::from_env());
//! let result = importer
//!     .import(&rows, ImportMode::Append, |progress| {
//!         log::info!("{}/{}", progress.current, progress.total)
//!     })
//!     .await;
//!
//! println!("Imported {} properties", result.properties_imported);
//! ```

pub mod coerce;
pub mod columns;
pub mod config;
pub mod coordinator;
pub mod data_builder;
pub mod data_structures;
pub mod database_operations;
pub mod parser;
pub mod preview;
pub mod progress;
pub mod reader;
pub mod sanitize;
pub mod store;
pub mod tracker;

// Re-export main types
pub use config::ImportConfig;
pub use coordinator::LeadImporter;
pub use database_operations::PgLeadStore;
pub use parser::{ContactRole, ParsedRow, normalize_row};
pub use preview::{PreviewSummary, preview_rows};
pub use progress::{ImportMode, ImportPhase, ImportProgress, ImportResult};
pub use reader::{RawRow, ReadError, read_csv, read_csv_file};
pub use sanitize::sanitize_text;
pub use store::{LeadStore, LeadTable, StoreError};
pub use tracker::ImportTracker;
