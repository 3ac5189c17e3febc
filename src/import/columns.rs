//! Column names of the vendor lead export.
//!
//! Repeated groups (owner names, phones, emails) are spelled out as ordered
//! lists so that encounter order, and therefore contact priority and the
//! decision-maker choice, never depends on map iteration order.

pub const VORTEX_ID: &str = "Vortex ID";

pub const PROPERTY_ADDRESS: &str = "Property Address";
pub const PROPERTY_CITY: &str = "Property City";
pub const PROPERTY_STATE: &str = "Property State";
pub const PROPERTY_ZIP: &str = "Property Zip";

pub const STATUS: &str = "Status";
pub const PROPERTY_TYPE: &str = "Property Type";
pub const MLS_NUMBER: &str = "MLS Number";
pub const LIST_PRICE: &str = "List Price";
pub const BEDS: &str = "Beds";
pub const BATHS: &str = "Baths";
pub const SQUARE_FOOTAGE: &str = "Square Footage";
pub const YEAR_BUILT: &str = "Year Built";
pub const LOT_SIZE: &str = "Lot Size";
pub const DAYS_ON_MARKET: &str = "Days On Market";
pub const LAST_SOLD_PRICE: &str = "Last Sold Price";

pub const LIST_DATE: &str = "List Date";
pub const EXPIRED_DATE: &str = "Expired Date";
pub const WITHDRAWN_DATE: &str = "Withdrawn Date";
pub const AUCTION_DATE: &str = "Auction Date";
pub const LEAD_DATE: &str = "Lead Date";
pub const STATUS_DATE: &str = "Status Date";
pub const LAST_SOLD_DATE: &str = "Last Sold Date";

pub const REMARKS: &str = "Remarks";
pub const AGENT_REMARKS: &str = "Agent Remarks";
pub const LISTING_AGENT: &str = "Listing Agent";
pub const LISTING_OFFICE: &str = "Listing Office";

// Decision-maker only
pub const FIRST_NAME: &str = "First Name";
pub const LAST_NAME: &str = "Last Name";
pub const MAILING_STREET: &str = "Mailing Street";
pub const MAILING_CITY: &str = "Mailing City";
pub const MAILING_STATE: &str = "Mailing State";
pub const MAILING_ZIP: &str = "Mailing Zip";

/// Prefix of the dynamically named insight columns (`Insights - Equity`).
pub const INSIGHTS_PREFIX: &str = "Insights - ";

/// Owner name columns in encounter order. The first non-empty one is the
/// decision-maker.
pub const OWNER_NAME_COLUMNS: [&str; 11] = [
    "Name", "Name 2", "Name 3", "Name 4", "Name 5", "Name 6", "Name 7", "Name 8", "Name 9",
    "Name 10", "Name 11",
];

pub const MLS_NAME_COLUMNS: [&str; 4] = ["MLS Name", "MLS Name 2", "MLS Name 3", "MLS Name 4"];

/// Phone number column paired with its status column.
///
/// The vendor only emits status columns up to `Phone 13 Status`; the last two
/// pairs therefore never carry a DNC marker in practice.
pub const PHONE_COLUMNS: [(&str, &str); 15] = [
    ("Phone", "Phone Status"),
    ("Phone 2", "Phone 2 Status"),
    ("Phone 3", "Phone 3 Status"),
    ("Phone 4", "Phone 4 Status"),
    ("Phone 5", "Phone 5 Status"),
    ("Phone 6", "Phone 6 Status"),
    ("Phone 7", "Phone 7 Status"),
    ("Phone 8", "Phone 8 Status"),
    ("Phone 9", "Phone 9 Status"),
    ("Phone 10", "Phone 10 Status"),
    ("Phone 11", "Phone 11 Status"),
    ("Phone 12", "Phone 12 Status"),
    ("Phone 13", "Phone 13 Status"),
    ("Phone 14", "Phone 14 Status"),
    ("Phone 15", "Phone 15 Status"),
];

pub const EMAIL_COLUMNS: [&str; 12] = [
    "Email", "Email 2", "Email 3", "Email 4", "Email 5", "Email 6", "Email 7", "Email 8",
    "Email 9", "Email 10", "Email 11", "Email 12",
];

/// Whether a phone status cell carries the do-not-call sentinel.
pub fn is_dnc_status(status: Option<&str>, sentinel: &str) -> bool {
    status
        .map(|value| value.trim().eq_ignore_ascii_case(sentinel))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_pairs_follow_the_numbering() {
        for (idx, (phone, status)) in PHONE_COLUMNS.iter().enumerate().skip(1) {
            assert_eq!(*phone, format!("Phone {}", idx + 1));
            assert_eq!(*status, format!("{} Status", phone));
        }
    }

    #[test]
    fn dnc_status_is_case_insensitive() {
        assert!(is_dnc_status(Some(" dnc "), "DNC"));
        assert!(!is_dnc_status(Some("Wireless"), "DNC"));
        assert!(!is_dnc_status(None, "DNC"));
    }
}
