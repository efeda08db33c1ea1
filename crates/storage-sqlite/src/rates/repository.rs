//! The transactional rate store.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use std::sync::Arc;

use super::model::{CurrencyDB, CurrencyRateDB, DATE_FORMAT};
use crate::db::{get_connection, DbPool};
use crate::errors::{IntoCore, StorageError};
use crate::schema::currencies::dsl as currencies_dsl;
use crate::schema::currency_rates::dsl as rates_dsl;
use crate::utils::chunk_for_sqlite;
use cbr_rates_core::rates::reconcile::{plan_currencies, plan_rates};
use cbr_rates_core::rates::{Currency, CurrencyRate, DayReconciliation, RateStore};
use cbr_rates_core::Result;
use cbr_rates_source::RateRecord;

pub struct SqliteRateStore {
    pool: Arc<DbPool>,
}

impl SqliteRateStore {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RateStore for SqliteRateStore {
    async fn day_has_rates(&self, date: NaiveDate) -> Result<bool> {
        let mut conn = get_connection(&self.pool)?;
        let day = date.format(DATE_FORMAT).to_string();

        let count: i64 = rates_dsl::currency_rates
            .filter(rates_dsl::date.eq(day))
            .count()
            .get_result(&mut conn)
            .into_core()?;

        Ok(count > 0)
    }

    async fn reconcile_day(
        &self,
        date: NaiveDate,
        records: Vec<RateRecord>,
        imported_at: DateTime<Utc>,
    ) -> Result<DayReconciliation> {
        let mut conn = get_connection(&self.pool)?;
        let day = date.format(DATE_FORMAT).to_string();

        // One immediate transaction per day: the whole batch commits or
        // none of it does.
        conn.immediate_transaction::<_, StorageError, _>(move |conn| {
            let codes: Vec<&str> = records.iter().map(|r| r.char_code.as_str()).collect();

            let mut existing: Vec<Currency> = Vec::new();
            for chunk in chunk_for_sqlite(&codes) {
                let rows: Vec<CurrencyDB> = currencies_dsl::currencies
                    .filter(currencies_dsl::char_code.eq_any(chunk.iter().copied()))
                    .load(conn)?;
                existing.extend(rows.into_iter().map(Currency::from));
            }

            let currency_plan = plan_currencies(&existing, &records);
            for currency in &currency_plan.create {
                diesel::insert_into(currencies_dsl::currencies)
                    .values(CurrencyDB::from(currency))
                    .execute(conn)?;
            }
            for currency in &currency_plan.update {
                diesel::update(currencies_dsl::currencies.find(&currency.id))
                    .set(CurrencyDB::from(currency))
                    .execute(conn)?;
            }

            let ids: Vec<&str> = currency_plan
                .resolved
                .values()
                .map(|c| c.id.as_str())
                .collect();
            let mut existing_rates: Vec<CurrencyRate> = Vec::new();
            for chunk in chunk_for_sqlite(&ids) {
                let rows: Vec<CurrencyRateDB> = rates_dsl::currency_rates
                    .filter(rates_dsl::date.eq(&day))
                    .filter(rates_dsl::currency_id.eq_any(chunk.iter().copied()))
                    .load(conn)?;
                existing_rates.extend(rows.into_iter().map(CurrencyRate::from));
            }

            let rate_plan = plan_rates(
                &currency_plan.resolved,
                &existing_rates,
                &records,
                date,
                imported_at,
            );
            for rate in &rate_plan.insert {
                diesel::insert_into(rates_dsl::currency_rates)
                    .values(CurrencyRateDB::from(rate))
                    .execute(conn)?;
            }
            for rate in &rate_plan.update {
                diesel::update(rates_dsl::currency_rates.find(&rate.id))
                    .set(CurrencyRateDB::from(rate))
                    .execute(conn)?;
            }

            Ok(DayReconciliation {
                considered: records.len(),
                inserted: rate_plan.insert.len(),
                updated: rate_plan.update.len(),
            })
        })
        .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, init, run_migrations};
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn setup() -> (SqliteRateStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let url = dir.path().join("rates.db").to_str().unwrap().to_string();
        init(&url).unwrap();
        let pool = create_pool(&url).unwrap();
        run_migrations(&pool).unwrap();
        (SqliteRateStore::new(pool), dir)
    }

    fn record(code: &str, cbr_code: i32, name: &str, nominal: i32, value: rust_decimal::Decimal) -> RateRecord {
        RateRecord {
            cbr_code,
            char_code: code.to_string(),
            name: name.to_string(),
            nominal,
            value,
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap()
    }

    fn batch() -> Vec<RateRecord> {
        vec![
            record("USD", 840, "Доллар США", 1, dec!(92.3456)),
            record("JPY", 392, "Японских иен", 100, dec!(61.95)),
        ]
    }

    fn currency_count(store: &SqliteRateStore) -> i64 {
        let mut conn = get_connection(&store.pool).unwrap();
        currencies_dsl::currencies
            .count()
            .get_result(&mut conn)
            .unwrap()
    }

    fn rate_count(store: &SqliteRateStore) -> i64 {
        let mut conn = get_connection(&store.pool).unwrap();
        rates_dsl::currency_rates
            .count()
            .get_result(&mut conn)
            .unwrap()
    }

    #[tokio::test]
    async fn first_import_inserts_currencies_and_rates() {
        let (store, _dir) = setup();

        let outcome = store.reconcile_day(day(), batch(), now()).await.unwrap();

        assert_eq!(outcome.considered, 2);
        assert_eq!(outcome.inserted, 2);
        assert_eq!(outcome.updated, 0);
        assert_eq!(currency_count(&store), 2);
        assert_eq!(rate_count(&store), 2);
        assert!(store.day_has_rates(day()).await.unwrap());
    }

    #[tokio::test]
    async fn repeated_import_is_idempotent() {
        let (store, _dir) = setup();

        store.reconcile_day(day(), batch(), now()).await.unwrap();
        let second = store.reconcile_day(day(), batch(), now()).await.unwrap();

        assert_eq!(second.inserted, 0);
        assert_eq!(second.updated, 0);
        assert_eq!(currency_count(&store), 2);
        assert_eq!(rate_count(&store), 2);
    }

    #[tokio::test]
    async fn changed_value_updates_the_existing_row() {
        let (store, _dir) = setup();

        store.reconcile_day(day(), batch(), now()).await.unwrap();

        let revised = vec![
            record("USD", 840, "Доллар США", 1, dec!(93.0001)),
            record("JPY", 392, "Японских иен", 100, dec!(61.95)),
        ];
        let later = Utc.with_ymd_and_hms(2026, 1, 15, 18, 0, 0).unwrap();
        let outcome = store.reconcile_day(day(), revised, later).await.unwrap();

        assert_eq!(outcome.inserted, 0);
        assert_eq!(outcome.updated, 1);
        // Still exactly one row per (currency, date) pair.
        assert_eq!(rate_count(&store), 2);

        let mut conn = get_connection(&store.pool).unwrap();
        let rows: Vec<CurrencyRateDB> = rates_dsl::currency_rates.load(&mut conn).unwrap();
        let usd_row = rows
            .iter()
            .find(|r| r.value == "93.0001")
            .expect("updated USD row");
        assert_eq!(usd_row.imported_at, later.to_rfc3339());
    }

    #[tokio::test]
    async fn renamed_currency_is_updated_in_place() {
        let (store, _dir) = setup();

        store.reconcile_day(day(), batch(), now()).await.unwrap();

        let renamed = vec![record("USD", 840, "Доллар США (новое)", 1, dec!(92.3456))];
        let next_day = day().succ_opt().unwrap();
        store.reconcile_day(next_day, renamed, now()).await.unwrap();

        assert_eq!(currency_count(&store), 2);
        let mut conn = get_connection(&store.pool).unwrap();
        let usd: CurrencyDB = currencies_dsl::currencies
            .filter(currencies_dsl::char_code.eq("USD"))
            .first(&mut conn)
            .unwrap();
        assert_eq!(usd.name, "Доллар США (новое)");
    }

    #[tokio::test]
    async fn separate_days_get_separate_rows() {
        let (store, _dir) = setup();

        store.reconcile_day(day(), batch(), now()).await.unwrap();
        let next_day = day().succ_opt().unwrap();
        let outcome = store.reconcile_day(next_day, batch(), now()).await.unwrap();

        assert_eq!(outcome.inserted, 2);
        assert_eq!(currency_count(&store), 2);
        assert_eq!(rate_count(&store), 4);
        assert!(!store.day_has_rates(day().pred_opt().unwrap()).await.unwrap());
    }
}
