//! Database models for currencies and daily rates.
//!
//! Dates, timestamps and decimals are stored as TEXT. The rows are only
//! ever written by this crate, so the parse-back conversions are lenient
//! rather than fallible.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use cbr_rates_core::rates::{Currency, CurrencyRate};

/// Storage format for calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Database model for currencies
#[derive(Queryable, Identifiable, Selectable, Insertable, AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::currencies)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CurrencyDB {
    pub id: String,
    pub cbr_code: i32,
    pub char_code: String,
    pub name: String,
}

impl From<&Currency> for CurrencyDB {
    fn from(c: &Currency) -> Self {
        Self {
            id: c.id.clone(),
            cbr_code: c.cbr_code,
            char_code: c.char_code.clone(),
            name: c.name.clone(),
        }
    }
}

impl From<CurrencyDB> for Currency {
    fn from(row: CurrencyDB) -> Self {
        Self {
            id: row.id,
            cbr_code: row.cbr_code,
            char_code: row.char_code,
            name: row.name,
        }
    }
}

/// Database model for daily rates
#[derive(Queryable, Identifiable, Selectable, Insertable, AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::currency_rates)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CurrencyRateDB {
    pub id: String,
    pub currency_id: String,
    pub date: String,
    pub nominal: i32,
    pub value: String,
    pub imported_at: String,
}

impl From<&CurrencyRate> for CurrencyRateDB {
    fn from(r: &CurrencyRate) -> Self {
        Self {
            id: r.id.clone(),
            currency_id: r.currency_id.clone(),
            date: r.date.format(DATE_FORMAT).to_string(),
            nominal: r.nominal,
            value: r.value.round_dp(6).to_string(),
            imported_at: r.imported_at.to_rfc3339(),
        }
    }
}

impl From<CurrencyRateDB> for CurrencyRate {
    fn from(row: CurrencyRateDB) -> Self {
        Self {
            id: row.id,
            currency_id: row.currency_id,
            date: NaiveDate::parse_from_str(&row.date, DATE_FORMAT).unwrap_or_default(),
            nominal: row.nominal,
            value: Decimal::from_str(&row.value).unwrap_or(Decimal::ZERO),
            imported_at: DateTime::parse_from_rfc3339(&row.imported_at)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_default(),
        }
    }
}
