//! Pre-import statistics over an unvalidated export.
//!
//! The preview runs before the operator picks an import mode, so it works on
//! raw rows and never rejects anything: a row without an address still counts
//! its phones and owners.

use crate::import::coerce::{coerce_decimal, coerce_string, normalize_phone};
use crate::import::columns::{self, is_dnc_status};
use crate::import::parser::DEFAULT_DNC_SENTINEL;
use crate::import::reader::RawRow;
use rocket_okapi::okapi::schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number of sample addresses kept for display.
pub const SAMPLE_ADDRESS_LIMIT: usize = 5;

/// Summary shown to the operator before confirming an import.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreviewSummary {
    pub total_rows: usize,
    /// Rows per property city.
    pub cities: BTreeMap<String, usize>,
    pub total_phones: usize,
    pub callable_phones: usize,
    pub dnc_phones: usize,
    pub total_emails: usize,
    /// Every non-empty owner or MLS name cell.
    pub total_contacts: usize,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// Up to five `address, city` strings in file order. Rows missing either
    /// value are not sampled.
    pub sample_addresses: Vec<String>,
}

/// Summarize raw rows using the default DNC sentinel.
pub fn preview_rows(rows: &[RawRow]) -> PreviewSummary {
    preview_rows_with_sentinel(rows, DEFAULT_DNC_SENTINEL)
}

/// Summarize raw rows in a single pass.
pub fn preview_rows_with_sentinel(rows: &[RawRow], dnc_sentinel: &str) -> PreviewSummary {
    let mut summary = PreviewSummary {
        total_rows: rows.len(),
        ..Default::default()
    };

    for row in rows {
        let address = coerce_string(row.get(columns::PROPERTY_ADDRESS));
        let city = coerce_string(row.get(columns::PROPERTY_CITY));

        if let Some(city) = &city {
            *summary.cities.entry(city.clone()).or_insert(0) += 1;
        }

        if summary.sample_addresses.len() < SAMPLE_ADDRESS_LIMIT {
            if let (Some(address), Some(city)) = (&address, &city) {
                summary.sample_addresses.push(format!("{}, {}", address, city));
            }
        }

        for (phone_column, status_column) in columns::PHONE_COLUMNS {
            if normalize_phone(row.get(phone_column)).is_none() {
                continue;
            }
            summary.total_phones += 1;
            if is_dnc_status(row.get(status_column), dnc_sentinel) {
                summary.dnc_phones += 1;
            } else {
                summary.callable_phones += 1;
            }
        }

        summary.total_emails += columns::EMAIL_COLUMNS
            .iter()
            .filter(|column| row.get(column).is_some_and(|cell| cell.contains('@')))
            .count();

        summary.total_contacts += columns::OWNER_NAME_COLUMNS
            .iter()
            .chain(columns::MLS_NAME_COLUMNS.iter())
            .filter(|column| coerce_string(row.get(column)).is_some())
            .count();

        if let Some(price) = coerce_decimal(row.get(columns::LIST_PRICE)).filter(|p| *p > 0.0) {
            summary.min_price = Some(summary.min_price.map_or(price, |min| min.min(price)));
            summary.max_price = Some(summary.max_price.map_or(price, |max| max.max(price)));
        }
    }

    summary
}
