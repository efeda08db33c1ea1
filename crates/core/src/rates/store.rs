//! Persistence contract for the reconciler.

use async_trait::async_trait;
use cbr_rates_source::RateRecord;
use chrono::{DateTime, NaiveDate, Utc};

use super::model::DayReconciliation;
use crate::errors::Result;

/// Storage operations the import pipeline needs.
///
/// Implementations must use a fresh connection/session per call — nothing
/// may be held across the daemon's sleep interval.
#[async_trait]
pub trait RateStore: Send + Sync {
    /// True when at least one rate row exists for the date.
    async fn day_has_rates(&self, date: NaiveDate) -> Result<bool>;

    /// Applies one day's records against persisted currencies and rates
    /// inside a single transaction. Either the whole batch commits or none
    /// of it does. `records` must already be filtered and normalized
    /// (uppercase char codes, trimmed names).
    async fn reconcile_day(
        &self,
        date: NaiveDate,
        records: Vec<RateRecord>,
        imported_at: DateTime<Utc>,
    ) -> Result<DayReconciliation>;
}
