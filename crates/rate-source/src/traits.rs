//! The rate source contract consumed by the import pipeline.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::RateSourceError;
use crate::models::RateRecord;

/// A source of official daily exchange rates.
///
/// Implementations produce a finite batch of records for the requested date.
/// An empty batch is a legitimate outcome (holidays have no published rates)
/// and must not be reported as an error.
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn rates_on_date(&self, date: NaiveDate) -> Result<Vec<RateRecord>, RateSourceError>;
}
