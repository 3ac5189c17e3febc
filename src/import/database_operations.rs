//! PostgreSQL implementation of [`LeadStore`].
//!
//! Bulk inserts bind each payload column as one array and expand them with
//! `UNNEST`, so a batch is a single statement.

use crate::import::data_structures::{
    ContactsData, EmailsData, ImportLogEntry, InsertedContact, InsertedProperty, PhonesData,
    PropertiesData,
};
use crate::import::store::{LeadStore, LeadTable, StoreError};
use rocket_db_pools::sqlx::{self, PgPool};
use std::collections::HashSet;

/// Lead store backed by a PostgreSQL pool.
#[derive(Clone)]
pub struct PgLeadStore {
    pool: PgPool,
}

impl PgLeadStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[rocket::async_trait]
impl LeadStore for PgLeadStore {
    async fn existing_vortex_ids(&self) -> Result<HashSet<String>, StoreError> {
        let keys: Vec<(String,)> = sqlx::query_as("SELECT vortex_id FROM properties")
            .fetch_all(&self.pool)
            .await?;

        log::trace!("loaded {} existing natural keys", keys.len());
        Ok(keys.into_iter().map(|(key,)| key).collect())
    }

    async fn crm_lead_ids(&self) -> Result<Vec<i64>, StoreError> {
        let ids: Vec<(i64,)> = sqlx::query_as("SELECT id FROM crm_leads")
            .fetch_all(&self.pool)
            .await?;

        Ok(ids.into_iter().map(|(id,)| id).collect())
    }

    async fn delete_lead_activities(&self, crm_lead_ids: &[i64]) -> Result<u64, StoreError> {
        if crm_lead_ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query("DELETE FROM lead_activities WHERE crm_lead_id = ANY($1)")
            .bind(crm_lead_ids)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn delete_all(&self, table: LeadTable) -> Result<u64, StoreError> {
        // table names come from a closed enum, never from input
        let statement = format!("DELETE FROM {}", table.table_name());
        let result = sqlx::query(&statement).execute(&self.pool).await?;

        log::trace!(
            "deleted {} rows from {}",
            result.rows_affected(),
            table.table_name()
        );
        Ok(result.rows_affected())
    }

    async fn insert_properties(
        &self,
        data: &PropertiesData,
    ) -> Result<Vec<InsertedProperty>, StoreError> {
        if data.is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<(i64, String)> = sqlx::query_as(
            r#"INSERT INTO properties (
                vortex_id, street, city, state, zip, full_address,
                status, property_type, mls_number, list_price, beds, baths,
                square_footage, year_built, lot_size, days_on_market, last_sold_price,
                list_date, expired_date, withdrawn_date, auction_date, lead_date,
                status_date, last_sold_date, remarks, agent_remarks,
                listing_agent, listing_office, insights, source, imported_at, batch_id
               )
               SELECT * FROM UNNEST(
                   $1::text[],
                   $2::text[],
                   $3::text[],
                   $4::text[],
                   $5::text[],
                   $6::text[],
                   $7::text[],
                   $8::text[],
                   $9::text[],
                   $10::float8[],
                   $11::int[],
                   $12::float8[],
                   $13::int[],
                   $14::int[],
                   $15::float8[],
                   $16::int[],
                   $17::float8[],
                   $18::date[],
                   $19::date[],
                   $20::date[],
                   $21::date[],
                   $22::date[],
                   $23::date[],
                   $24::date[],
                   $25::text[],
                   $26::text[],
                   $27::text[],
                   $28::text[],
                   $29::jsonb[],
                   $30::text[],
                   $31::timestamptz[],
                   $32::text[]
               )
               RETURNING id, vortex_id"#,
        )
        .bind(&data.vortex_ids)
        .bind(&data.streets)
        .bind(&data.cities)
        .bind(&data.states)
        .bind(&data.zips)
        .bind(&data.full_addresses)
        .bind(&data.statuses)
        .bind(&data.property_types)
        .bind(&data.mls_numbers)
        .bind(&data.list_prices)
        .bind(&data.beds)
        .bind(&data.baths)
        .bind(&data.square_footages)
        .bind(&data.years_built)
        .bind(&data.lot_sizes)
        .bind(&data.days_on_market)
        .bind(&data.last_sold_prices)
        .bind(&data.list_dates)
        .bind(&data.expired_dates)
        .bind(&data.withdrawn_dates)
        .bind(&data.auction_dates)
        .bind(&data.lead_dates)
        .bind(&data.status_dates)
        .bind(&data.last_sold_dates)
        .bind(&data.remarks)
        .bind(&data.agent_remarks)
        .bind(&data.listing_agents)
        .bind(&data.listing_offices)
        .bind(&data.insights)
        .bind(&data.sources)
        .bind(&data.imported_ats)
        .bind(&data.batch_ids)
        .fetch_all(&self.pool)
        .await?;

        log::trace!("bulk inserted {} properties", rows.len());
        Ok(rows
            .into_iter()
            .map(|(id, vortex_id)| InsertedProperty { id, vortex_id })
            .collect())
    }

    async fn insert_contacts(
        &self,
        data: &ContactsData,
    ) -> Result<Vec<InsertedContact>, StoreError> {
        if data.is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<(i64, i64, bool)> = sqlx::query_as(
            r#"INSERT INTO contacts (
                property_id, name, first_name, last_name, role, is_decision_maker,
                priority, mailing_street, mailing_city, mailing_state, mailing_zip,
                is_absentee
               )
               SELECT * FROM UNNEST(
                   $1::bigint[],
                   $2::text[],
                   $3::text[],
                   $4::text[],
                   $5::text[],
                   $6::bool[],
                   $7::int[],
                   $8::text[],
                   $9::text[],
                   $10::text[],
                   $11::text[],
                   $12::bool[]
               )
               RETURNING id, property_id, is_decision_maker"#,
        )
        .bind(&data.property_ids)
        .bind(&data.names)
        .bind(&data.first_names)
        .bind(&data.last_names)
        .bind(&data.roles)
        .bind(&data.is_decision_makers)
        .bind(&data.priorities)
        .bind(&data.mailing_streets)
        .bind(&data.mailing_cities)
        .bind(&data.mailing_states)
        .bind(&data.mailing_zips)
        .bind(&data.is_absentees)
        .fetch_all(&self.pool)
        .await?;

        log::trace!("bulk inserted {} contacts", rows.len());
        Ok(rows
            .into_iter()
            .map(|(id, property_id, is_decision_maker)| InsertedContact {
                id,
                property_id,
                is_decision_maker,
            })
            .collect())
    }

    async fn insert_phones(&self, data: &PhonesData) -> Result<usize, StoreError> {
        if data.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            r#"INSERT INTO phones (contact_id, raw_number, number, is_dnc, phone_type)
               SELECT * FROM UNNEST(
                   $1::bigint[],
                   $2::text[],
                   $3::text[],
                   $4::bool[],
                   $5::text[]
               )"#,
        )
        .bind(&data.contact_ids)
        .bind(&data.raw_numbers)
        .bind(&data.numbers)
        .bind(&data.is_dncs)
        .bind(&data.phone_types)
        .execute(&self.pool)
        .await?;

        log::trace!("bulk inserted {} phones", result.rows_affected());
        Ok(result.rows_affected() as usize)
    }

    async fn insert_emails(&self, data: &EmailsData) -> Result<usize, StoreError> {
        if data.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            r#"INSERT INTO emails (contact_id, email)
               SELECT * FROM UNNEST($1::bigint[], $2::text[])"#,
        )
        .bind(&data.contact_ids)
        .bind(&data.emails)
        .execute(&self.pool)
        .await?;

        log::trace!("bulk inserted {} emails", result.rows_affected());
        Ok(result.rows_affected() as usize)
    }

    async fn insert_import_log(&self, entry: &ImportLogEntry) -> Result<(), StoreError> {
        sqlx::query(
            r#"INSERT INTO import_logs (
                source, mode, batch_id, total_records, imported, duplicates, errors
               )
               VALUES ($1, $2, $3, $4, $5, $6, $7)"#,
        )
        .bind(&entry.source)
        .bind(&entry.mode)
        .bind(&entry.batch_id)
        .bind(entry.total_records)
        .bind(entry.imported)
        .bind(entry.duplicates)
        .bind(entry.errors)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
