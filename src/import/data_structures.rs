//! Prepared payloads for bulk store operations.
//!
//! Rows are held in parallel vectors (columnar format) so the PostgreSQL store
//! can bind each column as one array and insert the batch with a single
//! `UNNEST` statement. Every vector of a payload has the same length.

use crate::import::parser::ParsedRow;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

/// Property rows ready for insertion.
#[derive(Debug, Default, Clone)]
pub struct PropertiesData {
    pub vortex_ids: Vec<String>,
    pub streets: Vec<String>,
    pub cities: Vec<String>,
    pub states: Vec<Option<String>>,
    pub zips: Vec<Option<String>>,
    pub full_addresses: Vec<String>,
    pub statuses: Vec<Option<String>>,
    pub property_types: Vec<Option<String>>,
    pub mls_numbers: Vec<Option<String>>,
    pub list_prices: Vec<Option<f64>>,
    pub beds: Vec<Option<i32>>,
    pub baths: Vec<Option<f64>>,
    pub square_footages: Vec<Option<i32>>,
    pub years_built: Vec<Option<i32>>,
    pub lot_sizes: Vec<Option<f64>>,
    pub days_on_market: Vec<Option<i32>>,
    pub last_sold_prices: Vec<Option<f64>>,
    pub list_dates: Vec<Option<NaiveDate>>,
    pub expired_dates: Vec<Option<NaiveDate>>,
    pub withdrawn_dates: Vec<Option<NaiveDate>>,
    pub auction_dates: Vec<Option<NaiveDate>>,
    pub lead_dates: Vec<Option<NaiveDate>>,
    pub status_dates: Vec<Option<NaiveDate>>,
    pub last_sold_dates: Vec<Option<NaiveDate>>,
    pub remarks: Vec<Option<String>>,
    pub agent_remarks: Vec<Option<String>>,
    pub listing_agents: Vec<Option<String>>,
    pub listing_offices: Vec<Option<String>>,
    pub insights: Vec<Value>,
    pub sources: Vec<String>,
    pub imported_ats: Vec<DateTime<Utc>>,
    pub batch_ids: Vec<String>,
}

impl PropertiesData {
    pub fn len(&self) -> usize {
        self.vortex_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vortex_ids.is_empty()
    }

    /// Append the property of one parsed row.
    pub fn push(&mut self, row: &ParsedRow, source: &str, imported_at: DateTime<Utc>) {
        let p = &row.property;

        self.vortex_ids.push(p.vortex_id.clone());
        self.streets.push(p.street.clone());
        self.cities.push(p.city.clone());
        self.states.push(p.state.clone());
        self.zips.push(p.zip.clone());
        self.full_addresses.push(p.full_address.clone());
        self.statuses.push(p.status.clone());
        self.property_types.push(p.property_type.clone());
        self.mls_numbers.push(p.mls_number.clone());
        self.list_prices.push(p.list_price);
        self.beds.push(p.beds);
        self.baths.push(p.baths);
        self.square_footages.push(p.square_footage);
        self.years_built.push(p.year_built);
        self.lot_sizes.push(p.lot_size);
        self.days_on_market.push(p.days_on_market);
        self.last_sold_prices.push(p.last_sold_price);
        self.list_dates.push(p.list_date);
        self.expired_dates.push(p.expired_date);
        self.withdrawn_dates.push(p.withdrawn_date);
        self.auction_dates.push(p.auction_date);
        self.lead_dates.push(p.lead_date);
        self.status_dates.push(p.status_date);
        self.last_sold_dates.push(p.last_sold_date);
        self.remarks.push(p.remarks.clone());
        self.agent_remarks.push(p.agent_remarks.clone());
        self.listing_agents.push(p.listing_agent.clone());
        self.listing_offices.push(p.listing_office.clone());
        self.insights.push(
            serde_json::to_value(&p.insights).unwrap_or_else(|_| Value::Object(Default::default())),
        );
        self.sources.push(source.to_string());
        self.imported_ats.push(imported_at);
        self.batch_ids.push(p.batch_id.clone());
    }
}

/// A property the store accepted, with its generated id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertedProperty {
    pub id: i64,
    pub vortex_id: String,
}

/// Contact rows ready for insertion.
#[derive(Debug, Default, Clone)]
pub struct ContactsData {
    pub property_ids: Vec<i64>,
    pub names: Vec<String>,
    pub first_names: Vec<Option<String>>,
    pub last_names: Vec<Option<String>>,
    pub roles: Vec<String>,
    pub is_decision_makers: Vec<bool>,
    pub priorities: Vec<i32>,
    pub mailing_streets: Vec<Option<String>>,
    pub mailing_cities: Vec<Option<String>>,
    pub mailing_states: Vec<Option<String>>,
    pub mailing_zips: Vec<Option<String>>,
    pub is_absentees: Vec<bool>,
}

impl ContactsData {
    pub fn len(&self) -> usize {
        self.property_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.property_ids.is_empty()
    }
}

/// A contact the store accepted.
///
/// Carries its property id and decision-maker flag so the importer can find
/// the decision-maker of each row without relying on insert order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertedContact {
    pub id: i64,
    pub property_id: i64,
    pub is_decision_maker: bool,
}

/// Phone rows ready for insertion.
#[derive(Debug, Default, Clone)]
pub struct PhonesData {
    pub contact_ids: Vec<i64>,
    pub raw_numbers: Vec<String>,
    pub numbers: Vec<String>,
    pub is_dncs: Vec<bool>,
    pub phone_types: Vec<String>,
}

impl PhonesData {
    pub fn len(&self) -> usize {
        self.contact_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contact_ids.is_empty()
    }

    pub fn dnc_count(&self) -> usize {
        self.is_dncs.iter().filter(|dnc| **dnc).count()
    }
}

/// Email rows ready for insertion.
#[derive(Debug, Default, Clone)]
pub struct EmailsData {
    pub contact_ids: Vec<i64>,
    pub emails: Vec<String>,
}

impl EmailsData {
    pub fn len(&self) -> usize {
        self.contact_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contact_ids.is_empty()
    }
}

/// Audit record written once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportLogEntry {
    pub source: String,
    pub mode: String,
    pub batch_id: String,
    pub total_records: i32,
    pub imported: i32,
    pub duplicates: i32,
    pub errors: i32,
}
