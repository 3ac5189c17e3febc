//! Payload preparation and id stitching for one import batch.
//!
//! Properties are inserted first; the ids they receive are keyed by natural
//! key and used to build the contact payload. The decision-maker contact ids
//! are keyed the same way and used for phones and emails. Both maps live for a
//! single batch only.

use crate::import::data_structures::{
    ContactsData, EmailsData, InsertedContact, InsertedProperty, PhonesData, PropertiesData,
};
use crate::import::parser::ParsedRow;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Build the property payload for a slice of parsed rows.
pub fn build_property_batch_data(
    rows: &[ParsedRow],
    source: &str,
    imported_at: DateTime<Utc>,
) -> PropertiesData {
    let mut data = PropertiesData::default();
    for row in rows {
        data.push(row, source, imported_at);
    }
    data
}

/// Map natural key to persisted property id.
pub fn property_id_map(inserted: &[InsertedProperty]) -> HashMap<String, i64> {
    inserted
        .iter()
        .map(|property| (property.vortex_id.clone(), property.id))
        .collect()
}

/// Build the contact payload for every row whose property was persisted.
///
/// Rows without a property id are skipped silently; their failure has
/// already been counted against the property.
pub fn build_contact_batch_data(
    rows: &[ParsedRow],
    property_ids: &HashMap<String, i64>,
) -> ContactsData {
    let mut data = ContactsData::default();

    for row in rows {
        let Some(&property_id) = property_ids.get(row.vortex_id()) else {
            continue;
        };

        for contact in &row.contacts {
            data.property_ids.push(property_id);
            data.names.push(contact.name.clone());
            data.first_names.push(contact.first_name.clone());
            data.last_names.push(contact.last_name.clone());
            data.roles.push(contact.role.as_str().to_string());
            data.is_decision_makers.push(contact.is_decision_maker);
            data.priorities.push(contact.priority);
            data.mailing_streets.push(contact.mailing_street.clone());
            data.mailing_cities.push(contact.mailing_city.clone());
            data.mailing_states.push(contact.mailing_state.clone());
            data.mailing_zips.push(contact.mailing_zip.clone());
            data.is_absentees.push(contact.is_absentee);
        }
    }

    data
}

/// Map natural key to the persisted id of that row's decision-maker.
pub fn decision_maker_map(
    property_ids: &HashMap<String, i64>,
    inserted: &[InsertedContact],
) -> HashMap<String, i64> {
    let key_by_property: HashMap<i64, &str> = property_ids
        .iter()
        .map(|(key, id)| (*id, key.as_str()))
        .collect();

    inserted
        .iter()
        .filter(|contact| contact.is_decision_maker)
        .filter_map(|contact| {
            key_by_property
                .get(&contact.property_id)
                .map(|key| (key.to_string(), contact.id))
        })
        .collect()
}

/// Build the phone payload; phones attach to the row's decision-maker only.
pub fn build_phone_batch_data(
    rows: &[ParsedRow],
    decision_makers: &HashMap<String, i64>,
) -> PhonesData {
    let mut data = PhonesData::default();

    for row in rows {
        let Some(&contact_id) = decision_makers.get(row.vortex_id()) else {
            continue;
        };

        for phone in &row.phones {
            data.contact_ids.push(contact_id);
            data.raw_numbers.push(phone.raw_number.clone());
            data.numbers.push(phone.number.clone());
            data.is_dncs.push(phone.is_dnc);
            data.phone_types.push(phone.phone_type.clone());
        }
    }

    data
}

/// Build the email payload; emails attach to the row's decision-maker only.
pub fn build_email_batch_data(
    rows: &[ParsedRow],
    decision_makers: &HashMap<String, i64>,
) -> EmailsData {
    let mut data = EmailsData::default();

    for row in rows {
        let Some(&contact_id) = decision_makers.get(row.vortex_id()) else {
            continue;
        };

        for email in &row.emails {
            data.contact_ids.push(contact_id);
            data.emails.push(email.email.clone());
        }
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::parser::normalize_row;
    use crate::import::reader::RawRow;

    fn parsed(vortex_id: &str, names: &[&str], phones: &[&str]) -> ParsedRow {
        let mut raw: RawRow = [
            ("Vortex ID", vortex_id),
            ("Property Address", "1 Main St"),
            ("Property City", "Elko"),
        ]
        .into_iter()
        .collect();

        for (idx, name) in names.iter().enumerate() {
            let column = if idx == 0 { "Name".to_string() } else { format!("Name {}", idx + 1) };
            raw.insert(column, *name);
        }
        for (idx, phone) in phones.iter().enumerate() {
            let column = if idx == 0 { "Phone".to_string() } else { format!("Phone {}", idx + 1) };
            raw.insert(column, *phone);
        }

        normalize_row(&raw, "batch").expect("valid row")
    }

    #[test]
    fn contacts_only_for_persisted_properties() {
        let rows = vec![
            parsed("A", &["Ann", "Al"], &[]),
            parsed("B", &["Bea"], &[]),
        ];
        let property_ids = property_id_map(&[InsertedProperty {
            id: 10,
            vortex_id: "A".to_string(),
        }]);

        let data = build_contact_batch_data(&rows, &property_ids);

        assert_eq!(data.len(), 2);
        assert_eq!(data.property_ids, vec![10, 10]);
        assert_eq!(data.is_decision_makers, vec![true, false]);
        assert_eq!(data.roles, vec!["owner", "owner"]);
    }

    #[test]
    fn phones_attach_to_decision_maker() {
        let rows = vec![
            parsed("A", &["Ann", "Al"], &["7755550100", "7755550101"]),
            parsed("B", &[], &["7755550102"]),
        ];
        let property_ids: HashMap<String, i64> =
            [("A".to_string(), 10), ("B".to_string(), 11)].into_iter().collect();
        let contacts = vec![
            InsertedContact {
                id: 100,
                property_id: 10,
                is_decision_maker: true,
            },
            InsertedContact {
                id: 101,
                property_id: 10,
                is_decision_maker: false,
            },
        ];

        let decision_makers = decision_maker_map(&property_ids, &contacts);
        assert_eq!(decision_makers.len(), 1);
        assert_eq!(decision_makers.get("A"), Some(&100));

        let phones = build_phone_batch_data(&rows, &decision_makers);
        assert_eq!(phones.contact_ids, vec![100, 100]);
        assert_eq!(phones.numbers, vec!["7755550100", "7755550101"]);

        let emails = build_email_batch_data(&rows, &decision_makers);
        assert!(emails.is_empty());
    }

    #[test]
    fn property_payload_keeps_row_order() {
        let rows = vec![parsed("A", &[], &[]), parsed("B", &[], &[])];
        let data = build_property_batch_data(&rows, "vortex", Utc::now());

        assert_eq!(data.vortex_ids, vec!["A", "B"]);
        assert_eq!(data.sources, vec!["vortex", "vortex"]);
        assert_eq!(data.full_addresses[0], "1 main st, elko");
    }
}
