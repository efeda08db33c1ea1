//! Reconciliation planning.
//!
//! Pure functions that diff one day's fetched records against persisted
//! rows. The storage layer loads the existing rows, calls these planners
//! inside its transaction, and applies the returned plans. Matching is by
//! uppercased alphabetic code for currencies and by (currency id, date) for
//! rates — numeric CBR codes are data, never keys.

use cbr_rates_source::RateRecord;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{HashMap, HashSet};

use super::model::{Currency, CurrencyRate};

/// Currency changes for one day's batch.
#[derive(Debug, Default)]
pub struct CurrencyPlan {
    /// Every currency referenced by the batch after reconciliation, keyed
    /// by char code. Includes freshly created entities with their new ids.
    pub resolved: HashMap<String, Currency>,
    pub create: Vec<Currency>,
    pub update: Vec<Currency>,
}

/// Rate row changes for one day's batch.
#[derive(Debug, Default)]
pub struct RatePlan {
    pub insert: Vec<CurrencyRate>,
    pub update: Vec<CurrencyRate>,
}

/// Diffs records against existing currencies.
///
/// Unknown codes become new currencies; known codes refresh their numeric
/// code, and replace their name only when the incoming name is non-blank.
pub fn plan_currencies(existing: &[Currency], records: &[RateRecord]) -> CurrencyPlan {
    let mut by_code: HashMap<String, Currency> = existing
        .iter()
        .map(|c| (c.char_code.to_uppercase(), c.clone()))
        .collect();
    let mut fresh: HashSet<String> = HashSet::new();
    let mut touched: HashSet<String> = HashSet::new();

    for record in records {
        if record.char_code.is_empty() {
            continue;
        }
        match by_code.get_mut(&record.char_code) {
            None => {
                let currency =
                    Currency::new(record.cbr_code, record.char_code.clone(), record.name.clone());
                fresh.insert(currency.id.clone());
                by_code.insert(record.char_code.clone(), currency);
            }
            Some(currency) => {
                if currency.cbr_code != record.cbr_code {
                    currency.cbr_code = record.cbr_code;
                    touched.insert(currency.id.clone());
                }
                // A blank incoming name never blanks out a stored one.
                if !record.name.is_empty() && currency.name != record.name {
                    currency.name = record.name.clone();
                    touched.insert(currency.id.clone());
                }
            }
        }
    }

    let mut create: Vec<Currency> = Vec::new();
    let mut update: Vec<Currency> = Vec::new();
    for currency in by_code.values() {
        if fresh.contains(&currency.id) {
            create.push(currency.clone());
        } else if touched.contains(&currency.id) {
            update.push(currency.clone());
        }
    }
    create.sort_by(|a, b| a.char_code.cmp(&b.char_code));
    update.sort_by(|a, b| a.char_code.cmp(&b.char_code));

    CurrencyPlan {
        resolved: by_code,
        create,
        update,
    }
}

/// Diffs records against the day's existing rate rows.
///
/// Missing (currency, date) pairs become inserts; pairs whose nominal or
/// value differs become in-place updates with a refreshed import timestamp;
/// unchanged pairs are left untouched and not counted.
pub fn plan_rates(
    currencies: &HashMap<String, Currency>,
    existing: &[CurrencyRate],
    records: &[RateRecord],
    date: NaiveDate,
    imported_at: DateTime<Utc>,
) -> RatePlan {
    let mut existing_by_currency: HashMap<String, CurrencyRate> = existing
        .iter()
        .map(|r| (r.currency_id.clone(), r.clone()))
        .collect();
    let mut pending: HashMap<String, CurrencyRate> = HashMap::new();
    let mut changed: HashSet<String> = HashSet::new();

    for record in records {
        let Some(currency) = currencies.get(&record.char_code) else {
            continue;
        };
        match existing_by_currency.get_mut(&currency.id) {
            None => {
                // A duplicate code within the batch collapses onto one row.
                pending
                    .entry(currency.id.clone())
                    .and_modify(|row| {
                        row.nominal = record.nominal;
                        row.value = record.value;
                    })
                    .or_insert_with(|| {
                        CurrencyRate::new(
                            currency.id.clone(),
                            date,
                            record.nominal,
                            record.value,
                            imported_at,
                        )
                    });
            }
            Some(rate) => {
                if rate.nominal != record.nominal || rate.value != record.value {
                    rate.nominal = record.nominal;
                    rate.value = record.value;
                    rate.imported_at = imported_at;
                    changed.insert(currency.id.clone());
                }
            }
        }
    }

    let mut insert: Vec<CurrencyRate> = pending.into_values().collect();
    insert.sort_by(|a, b| a.currency_id.cmp(&b.currency_id));

    let mut update: Vec<CurrencyRate> = existing_by_currency
        .into_values()
        .filter(|r| changed.contains(&r.currency_id))
        .collect();
    update.sort_by(|a, b| a.currency_id.cmp(&b.currency_id));

    RatePlan { insert, update }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

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

    #[test]
    fn unknown_code_creates_currency() {
        let records = vec![record("USD", 840, "Доллар США", 1, dec!(92.3456))];
        let plan = plan_currencies(&[], &records);

        assert_eq!(plan.create.len(), 1);
        assert!(plan.update.is_empty());
        assert_eq!(plan.create[0].char_code, "USD");
        assert_eq!(plan.create[0].cbr_code, 840);
        assert!(plan.resolved.contains_key("USD"));
    }

    #[test]
    fn changed_name_updates_existing_currency_in_place() {
        let existing = vec![Currency::new(840, "USD", "Доллар США")];
        let records = vec![record("USD", 840, "Доллар США (новое)", 1, dec!(92.0))];
        let plan = plan_currencies(&existing, &records);

        assert!(plan.create.is_empty());
        assert_eq!(plan.update.len(), 1);
        assert_eq!(plan.update[0].id, existing[0].id);
        assert_eq!(plan.update[0].name, "Доллар США (новое)");
    }

    #[test]
    fn blank_incoming_name_never_blanks_stored_name() {
        let existing = vec![Currency::new(840, "USD", "Доллар США")];
        let records = vec![record("USD", 840, "", 1, dec!(92.0))];
        let plan = plan_currencies(&existing, &records);

        assert!(plan.update.is_empty());
        assert_eq!(plan.resolved["USD"].name, "Доллар США");
    }

    #[test]
    fn changed_cbr_code_is_refreshed() {
        let existing = vec![Currency::new(840, "USD", "Доллар США")];
        let records = vec![record("USD", 841, "Доллар США", 1, dec!(92.0))];
        let plan = plan_currencies(&existing, &records);

        assert_eq!(plan.update.len(), 1);
        assert_eq!(plan.update[0].cbr_code, 841);
    }

    #[test]
    fn unchanged_currency_is_untouched() {
        let existing = vec![Currency::new(840, "USD", "Доллар США")];
        let records = vec![record("USD", 840, "Доллар США", 1, dec!(92.0))];
        let plan = plan_currencies(&existing, &records);

        assert!(plan.create.is_empty());
        assert!(plan.update.is_empty());
    }

    #[test]
    fn existing_currency_matches_case_insensitively() {
        let mut stored = Currency::new(840, "USD", "Доллар США");
        stored.char_code = "Usd".to_string();
        let records = vec![record("USD", 840, "Доллар США", 1, dec!(92.0))];
        let plan = plan_currencies(&[stored], &records);

        assert!(plan.create.is_empty());
    }

    #[test]
    fn new_pair_is_inserted() {
        let records = vec![record("USD", 840, "Доллар США", 1, dec!(92.3456))];
        let currencies = plan_currencies(&[], &records).resolved;
        let plan = plan_rates(&currencies, &[], &records, day(), now());

        assert_eq!(plan.insert.len(), 1);
        assert!(plan.update.is_empty());
        assert_eq!(plan.insert[0].value, dec!(92.3456));
        assert_eq!(plan.insert[0].date, day());
        assert_eq!(plan.insert[0].imported_at, now());
    }

    #[test]
    fn changed_value_updates_existing_row_in_place() {
        let records = vec![record("USD", 840, "Доллар США", 1, dec!(93.0))];
        let currencies = plan_currencies(&[], &records).resolved;
        let stored = CurrencyRate::new(
            currencies["USD"].id.clone(),
            day(),
            1,
            dec!(92.0),
            Utc.with_ymd_and_hms(2026, 1, 14, 12, 0, 0).unwrap(),
        );
        let plan = plan_rates(&currencies, &[stored.clone()], &records, day(), now());

        assert!(plan.insert.is_empty());
        assert_eq!(plan.update.len(), 1);
        assert_eq!(plan.update[0].id, stored.id);
        assert_eq!(plan.update[0].value, dec!(93.0));
        assert_eq!(plan.update[0].imported_at, now());
    }

    #[test]
    fn unchanged_row_is_untouched() {
        let records = vec![record("USD", 840, "Доллар США", 1, dec!(92.0))];
        let currencies = plan_currencies(&[], &records).resolved;
        let stored = CurrencyRate::new(currencies["USD"].id.clone(), day(), 1, dec!(92.0), now());
        let plan = plan_rates(&currencies, &[stored], &records, day(), now());

        assert!(plan.insert.is_empty());
        assert!(plan.update.is_empty());
    }

    #[test]
    fn duplicate_codes_collapse_onto_one_insert() {
        let records = vec![
            record("USD", 840, "Доллар США", 1, dec!(92.0)),
            record("USD", 840, "Доллар США", 1, dec!(93.0)),
        ];
        let currencies = plan_currencies(&[], &records).resolved;
        let plan = plan_rates(&currencies, &[], &records, day(), now());

        assert_eq!(plan.insert.len(), 1);
        assert_eq!(plan.insert[0].value, dec!(93.0));
    }

    #[test]
    fn replaying_applied_plans_is_idempotent() {
        let records = vec![
            record("USD", 840, "Доллар США", 1, dec!(92.3456)),
            record("JPY", 392, "Японских иен", 100, dec!(61.95)),
        ];

        let first = plan_currencies(&[], &records);
        let applied_currencies: Vec<Currency> = first.resolved.values().cloned().collect();
        let applied_rates = plan_rates(&first.resolved, &[], &records, day(), now()).insert;

        let second = plan_currencies(&applied_currencies, &records);
        assert!(second.create.is_empty());
        assert!(second.update.is_empty());

        let second_rates = plan_rates(&second.resolved, &applied_rates, &records, day(), now());
        assert!(second_rates.insert.is_empty());
        assert!(second_rates.update.is_empty());
    }
}
