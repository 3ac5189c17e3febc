//! Row normalization for lead exports.
//!
//! Turns one [`RawRow`] into a [`ParsedRow`]: the property plus every contact,
//! phone and email found on the row, each tagged with the row's natural key so
//! the importer can re-link them once database ids exist.
//!
//! # Rules
//!
//! - **Required fields**: street address and city. Rows without them are
//!   rejected (`None`), not reported as errors.
//! - **Natural key**: the vendor `Vortex ID`, or `gen_<address>_<city>` when
//!   the export omits it.
//! - **Contacts**: one per non-empty owner name (up to 11), then one per
//!   non-empty MLS name (up to 4), in column order. Only the first owner is
//!   the decision-maker, and only it carries the mailing address, first/last
//!   name and the absentee-owner flag.
//! - **Phones**: one per number with at least seven digits (up to 15), DNC when
//!   the paired status column holds the sentinel.
//! - **Emails**: one per cell containing `@` (up to 12), lowercased.

use crate::import::coerce::{
    coerce_date, coerce_decimal, coerce_int, coerce_string, normalize_phone,
};
use crate::import::columns::{self, is_dnc_status};
use crate::import::reader::RawRow;
use crate::import::sanitize::sanitize_text;
use chrono::NaiveDate;
use rocket_okapi::okapi::schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sentinel in a phone status column marking the number do-not-call.
pub const DEFAULT_DNC_SENTINEL: &str = "DNC";

/// Phone type assigned when the export does not say.
pub const UNKNOWN_PHONE_TYPE: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ContactRole {
    Owner,
    MlsContact,
}

impl ContactRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactRole::Owner => "owner",
            ContactRole::MlsContact => "mls_contact",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedProperty {
    pub vortex_id: String,
    pub street: String,
    pub city: String,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub full_address: String,
    pub status: Option<String>,
    pub property_type: Option<String>,
    pub mls_number: Option<String>,
    pub list_price: Option<f64>,
    pub beds: Option<i32>,
    pub baths: Option<f64>,
    pub square_footage: Option<i32>,
    pub year_built: Option<i32>,
    pub lot_size: Option<f64>,
    pub days_on_market: Option<i32>,
    pub last_sold_price: Option<f64>,
    pub list_date: Option<NaiveDate>,
    pub expired_date: Option<NaiveDate>,
    pub withdrawn_date: Option<NaiveDate>,
    pub auction_date: Option<NaiveDate>,
    pub lead_date: Option<NaiveDate>,
    pub status_date: Option<NaiveDate>,
    pub last_sold_date: Option<NaiveDate>,
    pub remarks: Option<String>,
    pub agent_remarks: Option<String>,
    pub listing_agent: Option<String>,
    pub listing_office: Option<String>,
    pub insights: BTreeMap<String, String>,
    pub batch_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedContact {
    pub vortex_id: String,
    pub name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: ContactRole,
    pub is_decision_maker: bool,
    pub priority: i32,
    pub mailing_street: Option<String>,
    pub mailing_city: Option<String>,
    pub mailing_state: Option<String>,
    pub mailing_zip: Option<String>,
    pub is_absentee: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedPhone {
    pub vortex_id: String,
    pub raw_number: String,
    pub number: String,
    pub is_dnc: bool,
    pub phone_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedEmail {
    pub vortex_id: String,
    pub email: String,
}

/// Everything extracted from one export row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedRow {
    pub property: ParsedProperty,
    pub contacts: Vec<ParsedContact>,
    pub phones: Vec<ParsedPhone>,
    pub emails: Vec<ParsedEmail>,
}

impl ParsedRow {
    /// Natural key shared by the property and all its dependents.
    pub fn vortex_id(&self) -> &str {
        &self.property.vortex_id
    }

    pub fn decision_maker(&self) -> Option<&ParsedContact> {
        self.contacts.iter().find(|contact| contact.is_decision_maker)
    }
}

/// Lowercased `street, city, state zip`, omitting the trailing part when
/// neither state nor zip is known.
pub fn build_full_address(
    street: &str,
    city: &str,
    state: Option<&str>,
    zip: Option<&str>,
) -> String {
    let region = [state, zip]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");

    let full = if region.is_empty() {
        format!("{}, {}", street, city)
    } else {
        format!("{}, {}, {}", street, city, region)
    };

    full.to_lowercase()
}

/// Fallback natural key for rows exported without a vendor id.
pub fn generated_vortex_id(street: &str, city: &str) -> String {
    format!("gen_{}_{}", street, city)
}

/// Normalize a row using the default DNC sentinel.
pub fn normalize_row(raw: &RawRow, batch_id: &str) -> Option<ParsedRow> {
    normalize_row_with_sentinel(raw, batch_id, DEFAULT_DNC_SENTINEL)
}

/// Normalize one export row.
///
/// Returns `None` when the street address or city is missing.
pub fn normalize_row_with_sentinel(
    raw: &RawRow,
    batch_id: &str,
    dnc_sentinel: &str,
) -> Option<ParsedRow> {
    let text = |column: &str| coerce_string(raw.get(column));

    let street = text(columns::PROPERTY_ADDRESS)?;
    let city = text(columns::PROPERTY_CITY)?;
    let state = text(columns::PROPERTY_STATE);
    let zip = text(columns::PROPERTY_ZIP);

    let full_address = build_full_address(&street, &city, state.as_deref(), zip.as_deref());
    let vortex_id = text(columns::VORTEX_ID).unwrap_or_else(|| generated_vortex_id(&street, &city));

    let property = ParsedProperty {
        vortex_id: vortex_id.clone(),
        full_address,
        status: text(columns::STATUS),
        property_type: text(columns::PROPERTY_TYPE),
        mls_number: text(columns::MLS_NUMBER),
        list_price: coerce_decimal(raw.get(columns::LIST_PRICE)),
        beds: coerce_int(raw.get(columns::BEDS)),
        baths: coerce_decimal(raw.get(columns::BATHS)),
        square_footage: coerce_int(raw.get(columns::SQUARE_FOOTAGE)),
        year_built: coerce_int(raw.get(columns::YEAR_BUILT)),
        lot_size: coerce_decimal(raw.get(columns::LOT_SIZE)),
        days_on_market: coerce_int(raw.get(columns::DAYS_ON_MARKET)),
        last_sold_price: coerce_decimal(raw.get(columns::LAST_SOLD_PRICE)),
        list_date: coerce_date(raw.get(columns::LIST_DATE)),
        expired_date: coerce_date(raw.get(columns::EXPIRED_DATE)),
        withdrawn_date: coerce_date(raw.get(columns::WITHDRAWN_DATE)),
        auction_date: coerce_date(raw.get(columns::AUCTION_DATE)),
        lead_date: coerce_date(raw.get(columns::LEAD_DATE)),
        status_date: coerce_date(raw.get(columns::STATUS_DATE)),
        last_sold_date: coerce_date(raw.get(columns::LAST_SOLD_DATE)),
        remarks: text(columns::REMARKS),
        agent_remarks: text(columns::AGENT_REMARKS),
        listing_agent: text(columns::LISTING_AGENT),
        listing_office: text(columns::LISTING_OFFICE),
        insights: extract_insights(raw),
        batch_id: batch_id.to_string(),
        street,
        city,
        state,
        zip,
    };

    let contacts = extract_contacts(raw, &property);
    let phones = extract_phones(raw, &vortex_id, dnc_sentinel);
    let emails = extract_emails(raw, &vortex_id);

    log::trace!(
        "normalized {}: {} contacts, {} phones, {} emails",
        vortex_id,
        contacts.len(),
        phones.len(),
        emails.len()
    );

    Some(ParsedRow {
        property,
        contacts,
        phones,
        emails,
    })
}

fn extract_insights(raw: &RawRow) -> BTreeMap<String, String> {
    let mut insights = BTreeMap::new();

    for (column, value) in raw.columns() {
        let Some(label) = column.strip_prefix(columns::INSIGHTS_PREFIX) else {
            continue;
        };

        let label = sanitize_text(label.trim());
        if label.is_empty() {
            continue;
        }

        if let Some(value) = coerce_string(Some(value)) {
            insights.insert(label, value);
        }
    }

    insights
}

fn extract_contacts(raw: &RawRow, property: &ParsedProperty) -> Vec<ParsedContact> {
    let mut contacts = Vec::new();

    for column in columns::OWNER_NAME_COLUMNS {
        let Some(name) = coerce_string(raw.get(column)) else {
            continue;
        };

        let is_decision_maker = contacts.is_empty();
        let priority = contacts.len() as i32 + 1;

        let contact = if is_decision_maker {
            let mailing_street = coerce_string(raw.get(columns::MAILING_STREET));
            let is_absentee = mailing_street
                .as_deref()
                .map(|mailing| !mailing.eq_ignore_ascii_case(&property.street))
                .unwrap_or(false);

            ParsedContact {
                vortex_id: property.vortex_id.clone(),
                name,
                first_name: coerce_string(raw.get(columns::FIRST_NAME)),
                last_name: coerce_string(raw.get(columns::LAST_NAME)),
                role: ContactRole::Owner,
                is_decision_maker: true,
                priority,
                mailing_street,
                mailing_city: coerce_string(raw.get(columns::MAILING_CITY)),
                mailing_state: coerce_string(raw.get(columns::MAILING_STATE)),
                mailing_zip: coerce_string(raw.get(columns::MAILING_ZIP)),
                is_absentee,
            }
        } else {
            plain_contact(&property.vortex_id, name, ContactRole::Owner, priority)
        };

        contacts.push(contact);
    }

    for column in columns::MLS_NAME_COLUMNS {
        if let Some(name) = coerce_string(raw.get(column)) {
            let priority = contacts.len() as i32 + 1;
            contacts.push(plain_contact(
                &property.vortex_id,
                name,
                ContactRole::MlsContact,
                priority,
            ));
        }
    }

    contacts
}

fn plain_contact(vortex_id: &str, name: String, role: ContactRole, priority: i32) -> ParsedContact {
    ParsedContact {
        vortex_id: vortex_id.to_string(),
        name,
        first_name: None,
        last_name: None,
        role,
        is_decision_maker: false,
        priority,
        mailing_street: None,
        mailing_city: None,
        mailing_state: None,
        mailing_zip: None,
        is_absentee: false,
    }
}

fn extract_phones(raw: &RawRow, vortex_id: &str, dnc_sentinel: &str) -> Vec<ParsedPhone> {
    columns::PHONE_COLUMNS
        .iter()
        .filter_map(|(phone_column, status_column)| {
            let raw_number = coerce_string(raw.get(phone_column))?;
            let number = normalize_phone(Some(raw_number.as_str()))?;

            Some(ParsedPhone {
                vortex_id: vortex_id.to_string(),
                raw_number,
                number,
                is_dnc: is_dnc_status(raw.get(status_column), dnc_sentinel),
                phone_type: UNKNOWN_PHONE_TYPE.to_string(),
            })
        })
        .collect()
}

fn extract_emails(raw: &RawRow, vortex_id: &str) -> Vec<ParsedEmail> {
    columns::EMAIL_COLUMNS
        .iter()
        .filter_map(|column| {
            let email = coerce_string(raw.get(column))?.to_lowercase();
            if !email.contains('@') {
                return None;
            }

            Some(ParsedEmail {
                vortex_id: vortex_id.to_string(),
                email,
            })
        })
        .collect()
}
