//! In-memory [`LeadStore`] for exercising the importer without PostgreSQL.
//!
//! Mirrors the relational store closely enough for import tests: ids are
//! generated from one sequence, property natural keys are unique, and every
//! bulk insert is all-or-nothing. Failures can be injected per operation.

use crate::import::data_structures::{
    ContactsData, EmailsData, ImportLogEntry, InsertedContact, InsertedProperty, PhonesData,
    PropertiesData,
};
use crate::import::store::{LeadStore, LeadTable, StoreError};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq)]
pub struct StoredProperty {
    pub id: i64,
    pub vortex_id: String,
    pub street: String,
    pub city: String,
    pub full_address: String,
    pub status: Option<String>,
    pub list_price: Option<f64>,
    pub remarks: Option<String>,
    pub insights: Value,
    pub source: String,
    pub batch_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredContact {
    pub id: i64,
    pub property_id: i64,
    pub name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: String,
    pub is_decision_maker: bool,
    pub priority: i32,
    pub mailing_street: Option<String>,
    pub is_absentee: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPhone {
    pub id: i64,
    pub contact_id: i64,
    pub raw_number: String,
    pub number: String,
    pub is_dnc: bool,
    pub phone_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEmail {
    pub id: i64,
    pub contact_id: i64,
    pub email: String,
}

#[derive(Debug, Default)]
struct Failures {
    bulk_properties: bool,
    property_calls: HashSet<usize>,
    property_keys: HashSet<String>,
    clear_tables: HashSet<LeadTable>,
    existing_keys: bool,
    contacts: bool,
    phones: bool,
    emails: bool,
    import_log: bool,
}

#[derive(Debug, Default)]
struct MemoryState {
    next_id: i64,
    properties: Vec<StoredProperty>,
    contacts: Vec<StoredContact>,
    phones: Vec<StoredPhone>,
    emails: Vec<StoredEmail>,
    import_logs: Vec<ImportLogEntry>,
    crm_lead_ids: Vec<i64>,
    lead_activities: Vec<i64>,
    other_rows: HashMap<LeadTable, u64>,
    property_insert_calls: usize,
    operations: Vec<String>,
    failures: Failures,
}

impl MemoryState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== Failure injection =====

    /// Fail every property insert carrying more than one row.
    pub fn fail_bulk_property_inserts(&self) {
        self.state.lock().failures.bulk_properties = true;
    }

    /// Fail the `call`-th property insert (1-based), whatever its size.
    pub fn fail_property_insert_call(&self, call: usize) {
        self.state.lock().failures.property_calls.insert(call);
    }

    /// Fail any property insert that contains this natural key.
    pub fn fail_property(&self, vortex_id: &str) {
        self.state
            .lock()
            .failures
            .property_keys
            .insert(vortex_id.to_string());
    }

    pub fn fail_clear(&self, table: LeadTable) {
        self.state.lock().failures.clear_tables.insert(table);
    }

    pub fn fail_existing_keys(&self) {
        self.state.lock().failures.existing_keys = true;
    }

    pub fn fail_contacts(&self) {
        self.state.lock().failures.contacts = true;
    }

    pub fn fail_phones(&self) {
        self.state.lock().failures.phones = true;
    }

    pub fn fail_emails(&self) {
        self.state.lock().failures.emails = true;
    }

    pub fn fail_import_log(&self) {
        self.state.lock().failures.import_log = true;
    }

    // ===== Seeding =====

    /// Pretend a table owned by the hosting application holds `rows` rows.
    pub fn seed_rows(&self, table: LeadTable, rows: u64) {
        self.state.lock().other_rows.insert(table, rows);
    }

    /// Add a CRM lead with `activities` activity rows.
    pub fn seed_crm_lead(&self, activities: usize) -> i64 {
        let mut state = self.state.lock();
        let id = state.next_id();
        state.crm_lead_ids.push(id);
        state
            .lead_activities
            .extend(std::iter::repeat_n(id, activities));
        id
    }

    // ===== Inspection =====

    pub fn properties(&self) -> Vec<StoredProperty> {
        self.state.lock().properties.clone()
    }

    pub fn contacts(&self) -> Vec<StoredContact> {
        self.state.lock().contacts.clone()
    }

    pub fn phones(&self) -> Vec<StoredPhone> {
        self.state.lock().phones.clone()
    }

    pub fn emails(&self) -> Vec<StoredEmail> {
        self.state.lock().emails.clone()
    }

    pub fn import_logs(&self) -> Vec<ImportLogEntry> {
        self.state.lock().import_logs.clone()
    }

    pub fn rows_in(&self, table: LeadTable) -> u64 {
        let state = self.state.lock();
        match table {
            LeadTable::Properties => state.properties.len() as u64,
            LeadTable::Contacts => state.contacts.len() as u64,
            LeadTable::Phones => state.phones.len() as u64,
            LeadTable::Emails => state.emails.len() as u64,
            LeadTable::CrmLeads => state.crm_lead_ids.len() as u64,
            other => state.other_rows.get(&other).copied().unwrap_or(0),
        }
    }

    pub fn lead_activity_count(&self) -> usize {
        self.state.lock().lead_activities.len()
    }

    /// Number of `insert_properties` calls, successful or not.
    pub fn property_insert_calls(&self) -> usize {
        self.state.lock().property_insert_calls
    }

    /// Destructive operations in the order they were issued.
    pub fn operations(&self) -> Vec<String> {
        self.state.lock().operations.clone()
    }
}

fn rejected(message: impl Into<String>) -> StoreError {
    StoreError::Rejected(message.into())
}

#[rocket::async_trait]
impl LeadStore for MemoryStore {
    async fn existing_vortex_ids(&self) -> Result<HashSet<String>, StoreError> {
        let state = self.state.lock();
        if state.failures.existing_keys {
            return Err(rejected("natural key lookup unavailable"));
        }
        Ok(state
            .properties
            .iter()
            .map(|property| property.vortex_id.clone())
            .collect())
    }

    async fn crm_lead_ids(&self) -> Result<Vec<i64>, StoreError> {
        Ok(self.state.lock().crm_lead_ids.clone())
    }

    async fn delete_lead_activities(&self, crm_lead_ids: &[i64]) -> Result<u64, StoreError> {
        let mut state = self.state.lock();
        state.operations.push("delete lead_activities".to_string());

        let before = state.lead_activities.len();
        state
            .lead_activities
            .retain(|lead_id| !crm_lead_ids.contains(lead_id));
        Ok((before - state.lead_activities.len()) as u64)
    }

    async fn delete_all(&self, table: LeadTable) -> Result<u64, StoreError> {
        let mut state = self.state.lock();
        if state.failures.clear_tables.contains(&table) {
            return Err(rejected(format!("permission denied for table {}", table.table_name())));
        }
        state
            .operations
            .push(format!("delete {}", table.table_name()));

        let removed = match table {
            LeadTable::Properties => state.properties.drain(..).count(),
            LeadTable::Contacts => state.contacts.drain(..).count(),
            LeadTable::Phones => state.phones.drain(..).count(),
            LeadTable::Emails => state.emails.drain(..).count(),
            LeadTable::CrmLeads => state.crm_lead_ids.drain(..).count(),
            other => state.other_rows.remove(&other).unwrap_or(0) as usize,
        };
        Ok(removed as u64)
    }

    async fn insert_properties(
        &self,
        data: &PropertiesData,
    ) -> Result<Vec<InsertedProperty>, StoreError> {
        let mut state = self.state.lock();
        state.property_insert_calls += 1;

        if data.len() > 1 && state.failures.bulk_properties {
            return Err(rejected("bulk insert rejected"));
        }
        if state.failures.property_calls.contains(&state.property_insert_calls) {
            return Err(rejected("connection reset during bulk insert"));
        }

        let mut seen: HashSet<&str> = state
            .properties
            .iter()
            .map(|property| property.vortex_id.as_str())
            .collect();
        for key in &data.vortex_ids {
            if state.failures.property_keys.contains(key) {
                return Err(rejected(format!("value too long for property {}", key)));
            }
            if !seen.insert(key.as_str()) {
                return Err(rejected(format!(
                    "duplicate key value violates unique constraint \"properties_vortex_id_key\": {}",
                    key
                )));
            }
        }

        let mut inserted = Vec::with_capacity(data.len());
        for idx in 0..data.len() {
            let id = state.next_id();
            state.properties.push(StoredProperty {
                id,
                vortex_id: data.vortex_ids[idx].clone(),
                street: data.streets[idx].clone(),
                city: data.cities[idx].clone(),
                full_address: data.full_addresses[idx].clone(),
                status: data.statuses[idx].clone(),
                list_price: data.list_prices[idx],
                remarks: data.remarks[idx].clone(),
                insights: data.insights[idx].clone(),
                source: data.sources[idx].clone(),
                batch_id: data.batch_ids[idx].clone(),
            });
            inserted.push(InsertedProperty {
                id,
                vortex_id: data.vortex_ids[idx].clone(),
            });
        }

        Ok(inserted)
    }

    async fn insert_contacts(
        &self,
        data: &ContactsData,
    ) -> Result<Vec<InsertedContact>, StoreError> {
        let mut state = self.state.lock();
        if state.failures.contacts {
            return Err(rejected("contacts insert rejected"));
        }

        let mut inserted = Vec::with_capacity(data.len());
        for idx in 0..data.len() {
            let id = state.next_id();
            state.contacts.push(StoredContact {
                id,
                property_id: data.property_ids[idx],
                name: data.names[idx].clone(),
                first_name: data.first_names[idx].clone(),
                last_name: data.last_names[idx].clone(),
                role: data.roles[idx].clone(),
                is_decision_maker: data.is_decision_makers[idx],
                priority: data.priorities[idx],
                mailing_street: data.mailing_streets[idx].clone(),
                is_absentee: data.is_absentees[idx],
            });
            inserted.push(InsertedContact {
                id,
                property_id: data.property_ids[idx],
                is_decision_maker: data.is_decision_makers[idx],
            });
        }

        Ok(inserted)
    }

    async fn insert_phones(&self, data: &PhonesData) -> Result<usize, StoreError> {
        let mut state = self.state.lock();
        if state.failures.phones {
            return Err(rejected("phones insert rejected"));
        }

        for idx in 0..data.len() {
            let id = state.next_id();
            state.phones.push(StoredPhone {
                id,
                contact_id: data.contact_ids[idx],
                raw_number: data.raw_numbers[idx].clone(),
                number: data.numbers[idx].clone(),
                is_dnc: data.is_dncs[idx],
                phone_type: data.phone_types[idx].clone(),
            });
        }

        Ok(data.len())
    }

    async fn insert_emails(&self, data: &EmailsData) -> Result<usize, StoreError> {
        let mut state = self.state.lock();
        if state.failures.emails {
            return Err(rejected("emails insert rejected"));
        }

        for idx in 0..data.len() {
            let id = state.next_id();
            state.emails.push(StoredEmail {
                id,
                contact_id: data.contact_ids[idx],
                email: data.emails[idx].clone(),
            });
        }

        Ok(data.len())
    }

    async fn insert_import_log(&self, entry: &ImportLogEntry) -> Result<(), StoreError> {
        let mut state = self.state.lock();
        if state.failures.import_log {
            return Err(rejected("import log unavailable"));
        }
        state.import_logs.push(entry.clone());
        Ok(())
    }
}
