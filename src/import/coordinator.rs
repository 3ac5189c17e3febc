//! Import coordination for lead exports.
//!
//! The `LeadImporter` drives one run through its phases:
//! 1. Checking: normalize rows, drop rejected ones, skip known natural keys
//!    (append mode)
//! 2. Clearing (replace mode): delete the existing lead tables, dependents
//!    first
//! 3. Importing: persist candidates batch by batch, properties first, then
//!    contacts, then phones and emails
//! 4. Done: write the import log and return the summary
//!
//! Batches run strictly one after another and every store call is awaited
//! before the next is issued.

use crate::import::config::ImportConfig;
use crate::import::data_builder;
use crate::import::data_structures::{ImportLogEntry, InsertedProperty};
use crate::import::parser::{ParsedRow, normalize_row_with_sentinel};
use crate::import::progress::{ImportMode, ImportPhase, ImportProgress, ImportResult};
use crate::import::reader::RawRow;
use crate::import::store::{LeadStore, LeadTable};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use uuid::Uuid;

/// Tables cleared before the CRM lead activities are removed.
const CLEAR_BEFORE_ACTIVITIES: [LeadTable; 2] =
    [LeadTable::CallQueue, LeadTable::PropertyActivityLog];

/// Tables cleared after the activities, ending with the root table.
const CLEAR_AFTER_ACTIVITIES: [LeadTable; 6] = [
    LeadTable::CrmLeads,
    LeadTable::CallLogs,
    LeadTable::Emails,
    LeadTable::Phones,
    LeadTable::Contacts,
    LeadTable::Properties,
];

/// Phone totals of one batch.
#[derive(Debug, Default, Clone, Copy)]
struct BatchPhones {
    callable: usize,
    dnc: usize,
}

/// Coordinates lead imports against a [`LeadStore`].
pub struct LeadImporter<S> {
    store: S,
    config: ImportConfig,
}

impl<S: LeadStore> LeadImporter<S> {
    pub fn new(store: S, config: ImportConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Import raw export rows.
    ///
    /// `on_progress` is called synchronously after every phase transition and
    /// after every batch. Failures never escape this call: row and batch
    /// failures are counted in the result, and a failed clear ends the run in
    /// the `Error` phase with nothing imported.
    pub async fn import<F>(
        &self,
        rows: &[RawRow],
        mode: ImportMode,
        mut on_progress: F,
    ) -> ImportResult
    where
        F: FnMut(&ImportProgress) + Send,
    {
        let batch_id = Uuid::new_v4().to_string();
        let imported_at = Utc::now();
        let mut progress = ImportProgress::new(rows.len());
        let mut phones = BatchPhones::default();

        log::info!(
            "import {}: {} rows from '{}' in {} mode",
            batch_id,
            rows.len(),
            self.config.source,
            mode
        );
        on_progress(&progress);

        if mode == ImportMode::Replace {
            progress.phase = ImportPhase::Clearing;
            on_progress(&progress);

            if let Err(message) = self.clear_existing().await {
                log::error!("import {}: aborting, {}", batch_id, message);
                progress.phase = ImportPhase::Error;
                progress.record_errors(1, message, self.config.max_error_messages);
                on_progress(&progress);
                return self.build_result(mode, rows.len(), &progress, phones, batch_id);
            }
        }

        let parsed: Vec<ParsedRow> = rows
            .iter()
            .filter_map(|row| {
                normalize_row_with_sentinel(row, &batch_id, &self.config.dnc_sentinel)
            })
            .collect();

        let rejected = rows.len() - parsed.len();
        if rejected > 0 {
            log::info!(
                "import {}: {} rows without address or city excluded",
                batch_id,
                rejected
            );
        }

        let candidates = match mode {
            ImportMode::Append => self.skip_existing(parsed, &mut progress).await,
            ImportMode::Replace => parsed,
        };

        progress.phase = ImportPhase::Importing;
        progress.total = candidates.len();
        progress.current = 0;
        on_progress(&progress);

        let batch_size = self.config.batch_size.max(1);
        for (index, batch) in candidates.chunks(batch_size).enumerate() {
            let batch_phones = self.import_batch(batch, imported_at, &mut progress).await;
            phones.callable += batch_phones.callable;
            phones.dnc += batch_phones.dnc;

            progress.current += batch.len();
            log::debug!(
                "import {}: batch {} done ({}/{} rows, {} properties, {} errors)",
                batch_id,
                index + 1,
                progress.current,
                progress.total,
                progress.properties_imported,
                progress.errors
            );
            on_progress(&progress);
        }

        self.write_import_log(mode, rows.len(), &progress, &batch_id).await;

        progress.phase = ImportPhase::Done;
        on_progress(&progress);

        log::info!(
            "import {}: done - {} properties, {} contacts, {} phones, {} emails, {} duplicates, {} errors",
            batch_id,
            progress.properties_imported,
            progress.contacts_created,
            progress.phones_created,
            progress.emails_created,
            progress.duplicates_skipped,
            progress.errors
        );

        self.build_result(mode, rows.len(), &progress, phones, batch_id)
    }

    /// Delete every lead table in reverse dependency order.
    async fn clear_existing(&self) -> Result<(), String> {
        for table in CLEAR_BEFORE_ACTIVITIES {
            self.clear_table(table).await?;
        }

        let lead_ids = self
            .store
            .crm_lead_ids()
            .await
            .map_err(|e| format!("failed to load crm lead ids: {}", e))?;

        if !lead_ids.is_empty() {
            let removed = self
                .store
                .delete_lead_activities(&lead_ids)
                .await
                .map_err(|e| format!("failed to clear lead_activities: {}", e))?;
            log::debug!("cleared {} rows from lead_activities", removed);
        }

        for table in CLEAR_AFTER_ACTIVITIES {
            self.clear_table(table).await?;
        }

        Ok(())
    }

    async fn clear_table(&self, table: LeadTable) -> Result<(), String> {
        let removed = self
            .store
            .delete_all(table)
            .await
            .map_err(|e| format!("failed to clear {}: {}", table.table_name(), e))?;
        log::debug!("cleared {} rows from {}", removed, table.table_name());
        Ok(())
    }

    /// Drop rows whose natural key is already stored.
    async fn skip_existing(
        &self,
        parsed: Vec<ParsedRow>,
        progress: &mut ImportProgress,
    ) -> Vec<ParsedRow> {
        let existing = match self.store.existing_vortex_ids().await {
            Ok(keys) => keys,
            Err(err) => {
                log::warn!(
                    "failed to load existing natural keys, duplicates will surface as row errors: {}",
                    err
                );
                HashSet::new()
            }
        };

        let (duplicates, fresh): (Vec<ParsedRow>, Vec<ParsedRow>) = parsed
            .into_iter()
            .partition(|row| existing.contains(row.vortex_id()));

        progress.duplicates_skipped += duplicates.len();
        if !duplicates.is_empty() {
            log::info!("skipping {} rows already imported", duplicates.len());
        }

        fresh
    }

    /// Persist one batch and its dependents.
    async fn import_batch(
        &self,
        batch: &[ParsedRow],
        imported_at: DateTime<Utc>,
        progress: &mut ImportProgress,
    ) -> BatchPhones {
        let max_messages = self.config.max_error_messages;
        let mut phones = BatchPhones::default();

        // Phase 1: properties, falling back to row-by-row inserts
        let properties =
            data_builder::build_property_batch_data(batch, &self.config.source, imported_at);

        let inserted = match self.store.insert_properties(&properties).await {
            Ok(inserted) => inserted,
            Err(err) => {
                log::warn!(
                    "bulk property insert of {} rows failed, retrying individually: {}",
                    batch.len(),
                    err
                );
                self.insert_properties_individually(batch, imported_at, progress)
                    .await
            }
        };

        progress.properties_imported += inserted.len();
        if inserted.is_empty() {
            return phones;
        }

        let property_ids = data_builder::property_id_map(&inserted);

        // Phase 2: contacts of persisted properties
        let contacts = data_builder::build_contact_batch_data(batch, &property_ids);
        let inserted_contacts = if contacts.is_empty() {
            Vec::new()
        } else {
            match self.store.insert_contacts(&contacts).await {
                Ok(inserted) => inserted,
                Err(err) => {
                    log::warn!("contact insert of {} rows failed: {}", contacts.len(), err);
                    progress.record_errors(
                        contacts.len(),
                        format!("contact insert failed: {}", err),
                        max_messages,
                    );
                    Vec::new()
                }
            }
        };
        progress.contacts_created += inserted_contacts.len();

        // Phase 3: phones and emails hang off the decision-maker only
        let decision_makers = data_builder::decision_maker_map(&property_ids, &inserted_contacts);
        if decision_makers.is_empty() {
            return phones;
        }

        let phone_data = data_builder::build_phone_batch_data(batch, &decision_makers);
        if !phone_data.is_empty() {
            match self.store.insert_phones(&phone_data).await {
                Ok(count) => {
                    let dnc = phone_data.dnc_count();
                    progress.phones_created += count;
                    phones.dnc += dnc;
                    phones.callable += phone_data.len() - dnc;
                }
                Err(err) => {
                    log::warn!("phone insert of {} rows failed: {}", phone_data.len(), err);
                    progress.record_errors(
                        phone_data.len(),
                        format!("phone insert failed: {}", err),
                        max_messages,
                    );
                }
            }
        }

        let email_data = data_builder::build_email_batch_data(batch, &decision_makers);
        if !email_data.is_empty() {
            match self.store.insert_emails(&email_data).await {
                Ok(count) => progress.emails_created += count,
                Err(err) => {
                    log::warn!("email insert of {} rows failed: {}", email_data.len(), err);
                    progress.record_errors(
                        email_data.len(),
                        format!("email insert failed: {}", err),
                        max_messages,
                    );
                }
            }
        }

        phones
    }

    async fn insert_properties_individually(
        &self,
        batch: &[ParsedRow],
        imported_at: DateTime<Utc>,
        progress: &mut ImportProgress,
    ) -> Vec<InsertedProperty> {
        let mut inserted = Vec::with_capacity(batch.len());

        for row in batch {
            let single = data_builder::build_property_batch_data(
                std::slice::from_ref(row),
                &self.config.source,
                imported_at,
            );

            match self.store.insert_properties(&single).await {
                Ok(rows) => inserted.extend(rows),
                Err(err) => {
                    log::debug!("property {} failed: {}", row.vortex_id(), err);
                    progress.record_errors(
                        1,
                        format!("property {}: {}", row.vortex_id(), err),
                        self.config.max_error_messages,
                    );
                }
            }
        }

        inserted
    }

    async fn write_import_log(
        &self,
        mode: ImportMode,
        total_rows: usize,
        progress: &ImportProgress,
        batch_id: &str,
    ) {
        let entry = ImportLogEntry {
            source: self.config.source.clone(),
            mode: mode.as_str().to_string(),
            batch_id: batch_id.to_string(),
            total_records: clamp_count(total_rows),
            imported: clamp_count(progress.properties_imported),
            duplicates: clamp_count(progress.duplicates_skipped),
            errors: clamp_count(progress.errors),
        };

        if let Err(err) = self.store.insert_import_log(&entry).await {
            log::warn!("import {}: failed to write import log: {}", batch_id, err);
        }
    }

    fn build_result(
        &self,
        mode: ImportMode,
        total_rows: usize,
        progress: &ImportProgress,
        phones: BatchPhones,
        batch_id: String,
    ) -> ImportResult {
        ImportResult {
            success: progress.errors == 0,
            mode,
            total_rows,
            properties_imported: progress.properties_imported,
            contacts_created: progress.contacts_created,
            phones_created: progress.phones_created,
            emails_created: progress.emails_created,
            callable_phones: phones.callable,
            dnc_phones: phones.dnc,
            duplicates_skipped: progress.duplicates_skipped,
            errors: progress.errors,
            error_messages: progress.error_messages.clone(),
            batch_id,
        }
    }
}

fn clamp_count(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
