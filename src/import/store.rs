//! Storage seam used by the importer.
//!
//! The importer only needs best-effort bulk inserts that return generated ids,
//! whole-table deletes, and a lookup of natural keys already stored. Nothing
//! here is transactional across calls: a failed call leaves earlier calls in
//! place, and the importer decides how to recover.

use crate::import::data_structures::{
    ContactsData, EmailsData, ImportLogEntry, InsertedContact, InsertedProperty, PhonesData,
    PropertiesData,
};
use rocket_db_pools::sqlx;
use std::collections::HashSet;
use thiserror::Error;

/// Errors surfaced by a [`LeadStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{0}")]
    Rejected(String),
}

/// Tables removed wholesale by a replace-mode import, besides the activity
/// rows that are removed by CRM lead id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeadTable {
    CallQueue,
    PropertyActivityLog,
    CrmLeads,
    CallLogs,
    Emails,
    Phones,
    Contacts,
    Properties,
}

impl LeadTable {
    pub fn table_name(&self) -> &'static str {
        match self {
            LeadTable::CallQueue => "call_queue",
            LeadTable::PropertyActivityLog => "property_activity_log",
            LeadTable::CrmLeads => "crm_leads",
            LeadTable::CallLogs => "call_logs",
            LeadTable::Emails => "emails",
            LeadTable::Phones => "phones",
            LeadTable::Contacts => "contacts",
            LeadTable::Properties => "properties",
        }
    }
}

#[rocket::async_trait]
pub trait LeadStore: Send + Sync {
    /// Natural keys of every stored property.
    async fn existing_vortex_ids(&self) -> Result<HashSet<String>, StoreError>;

    /// Ids of every CRM lead; needed before their activities can be removed.
    async fn crm_lead_ids(&self) -> Result<Vec<i64>, StoreError>;

    /// Delete the activity rows belonging to the given CRM leads.
    async fn delete_lead_activities(&self, crm_lead_ids: &[i64]) -> Result<u64, StoreError>;

    /// Delete every row of a table.
    async fn delete_all(&self, table: LeadTable) -> Result<u64, StoreError>;

    /// Insert properties in one statement. Either every row is stored or the
    /// call fails.
    async fn insert_properties(
        &self,
        data: &PropertiesData,
    ) -> Result<Vec<InsertedProperty>, StoreError>;

    async fn insert_contacts(&self, data: &ContactsData)
    -> Result<Vec<InsertedContact>, StoreError>;

    async fn insert_phones(&self, data: &PhonesData) -> Result<usize, StoreError>;

    async fn insert_emails(&self, data: &EmailsData) -> Result<usize, StoreError>;

    async fn insert_import_log(&self, entry: &ImportLogEntry) -> Result<(), StoreError>;
}
