//! Error types for the rate source crate.

use thiserror::Error;

/// Errors that can occur while fetching rates from the CBR service.
///
/// Transport-level failures (`Transport`, `Status`) and protocol-level
/// failures (`Protocol`) are fatal for the day being fetched; the daily
/// schedule is the only retry mechanism.
#[derive(Error, Debug)]
pub enum RateSourceError {
    /// A network-level failure occurred before a response arrived.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success HTTP status.
    #[error("transport error: service returned {0}")]
    Status(reqwest::StatusCode),

    /// The response body did not have the expected SOAP shape.
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl RateSourceError {
    pub(crate) fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }
}
