//! Domain entities and import outcome types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A currency known to the loader. Created the first time its alphabetic
/// code is observed, updated in place when the source reports a changed
/// numeric code or name, never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Currency {
    pub id: String,
    /// Numeric code in the CBR system. Data, never a matching key.
    pub cbr_code: i32,
    /// Alphabetic code, stored uppercase. Unique across currencies.
    pub char_code: String,
    pub name: String,
}

impl Currency {
    pub fn new(cbr_code: i32, char_code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            cbr_code,
            char_code: char_code.into(),
            name: name.into(),
        }
    }
}

/// One currency's published rate for one calendar date. Exactly one row
/// exists per (currency, date) pair; a later fetch that disagrees with the
/// stored value mutates the row in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyRate {
    pub id: String,
    pub currency_id: String,
    pub date: NaiveDate,
    /// Unit multiple the rate applies to, e.g. 1/10/100.
    pub nominal: i32,
    /// Rubles per `nominal` units, 6 fractional digits.
    pub value: Decimal,
    /// UTC instant of the last write.
    pub imported_at: DateTime<Utc>,
}

impl CurrencyRate {
    pub fn new(
        currency_id: impl Into<String>,
        date: NaiveDate,
        nominal: i32,
        value: Decimal,
        imported_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            currency_id: currency_id.into(),
            date,
            nominal,
            value,
            imported_at,
        }
    }
}

/// Counts from one day's reconciliation transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DayReconciliation {
    /// Records that passed filtering and entered the transaction.
    pub considered: usize,
    pub inserted: usize,
    pub updated: usize,
}

/// Result of `import_day`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DayImportOutcome {
    pub considered: usize,
    pub inserted: usize,
    pub updated: usize,
    /// True when the day was skipped because rates already existed.
    pub skipped: bool,
}

impl DayImportOutcome {
    pub(crate) fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }
}

impl From<DayReconciliation> for DayImportOutcome {
    fn from(r: DayReconciliation) -> Self {
        Self {
            considered: r.considered,
            inserted: r.inserted,
            updated: r.updated,
            skipped: false,
        }
    }
}

/// Aggregate result of `import_range`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RangeImportOutcome {
    pub days: usize,
    pub days_skipped: usize,
    pub inserted: usize,
    pub updated: usize,
}

impl RangeImportOutcome {
    pub(crate) fn absorb(&mut self, day: DayImportOutcome) {
        self.days += 1;
        if day.skipped {
            self.days_skipped += 1;
        }
        self.inserted += day.inserted;
        self.updated += day.updated;
    }
}
