//! Rate import service.
//!
//! Orchestrates one day's import: skip check → fetch → filter/normalize →
//! reconcile, and drives the sequential range backfill.
//!
//! # Architecture
//!
//! ```text
//! RateImportService
//!       │
//!       ├─► RateSource (fetch the day's records)
//!       └─► RateStore  (transactional reconcile)
//! ```
//!
//! Transport and protocol failures are fatal for the day being imported and
//! are not retried here — in daemon mode the next scheduled cycle is the
//! retry; in a range backfill the failure halts the remaining range.

use chrono::NaiveDate;
use log::{debug, info, warn};
use std::sync::Arc;

use super::model::{DayImportOutcome, RangeImportOutcome};
use super::store::RateStore;
use crate::clock::{Clock, SystemClock};
use crate::errors::Result;
use cbr_rates_source::RateSource;

pub struct RateImportService {
    source: Arc<dyn RateSource>,
    store: Arc<dyn RateStore>,
    clock: Arc<dyn Clock>,
}

impl RateImportService {
    pub fn new(source: Arc<dyn RateSource>, store: Arc<dyn RateStore>) -> Self {
        Self::with_clock(source, store, Arc::new(SystemClock))
    }

    pub fn with_clock(
        source: Arc<dyn RateSource>,
        store: Arc<dyn RateStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            source,
            store,
            clock,
        }
    }

    /// Imports one day's rates.
    ///
    /// With `skip_if_any_exists` set, a date that already has any persisted
    /// rate is a no-op — no fetch, no writes. Backfill passes `true` to
    /// avoid re-downloading known-complete days; scheduled daily runs pass
    /// `false` so a partial prior run is corrected.
    pub async fn import_day(
        &self,
        date: NaiveDate,
        skip_if_any_exists: bool,
    ) -> Result<DayImportOutcome> {
        if skip_if_any_exists && self.store.day_has_rates(date).await? {
            info!("Skipping {date}: rates already present.");
            return Ok(DayImportOutcome::skipped());
        }

        let fetched = self.source.rates_on_date(date).await?;
        let fetched_count = fetched.len();

        let useful: Vec<_> = fetched
            .into_iter()
            .filter(|r| !r.char_code.trim().is_empty())
            .map(|mut r| {
                r.char_code = r.char_code.trim().to_uppercase();
                r.name = r.name.trim().to_string();
                r
            })
            .collect();

        if useful.len() < fetched_count {
            debug!(
                "Dropped {} record(s) without an alphabetic code for {date}.",
                fetched_count - useful.len()
            );
        }

        if useful.is_empty() {
            warn!("No usable rate records for {date}; nothing to persist.");
            return Ok(DayImportOutcome::default());
        }

        let outcome = self
            .store
            .reconcile_day(date, useful, self.clock.now_utc())
            .await?;

        info!(
            "Imported {date}: currencies={}, inserted={}, updated={}.",
            outcome.considered, outcome.inserted, outcome.updated
        );

        Ok(outcome.into())
    }

    /// Imports every calendar day in `[from, to]` inclusive, sequentially in
    /// ascending order. Reversed bounds are normalized by swapping. The
    /// first failing day aborts the remainder of the range.
    pub async fn import_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        skip_if_any_exists: bool,
    ) -> Result<RangeImportOutcome> {
        let (from, to) = if from > to { (to, from) } else { (from, to) };

        let mut total = RangeImportOutcome::default();
        let mut day = from;
        while day <= to {
            total.absorb(self.import_day(day, skip_if_any_exists).await?);
            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }
        Ok(total)
    }
}
