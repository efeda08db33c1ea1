//! SOAP client for the Bank of Russia (CBR) daily exchange rate service.
//!
//! This crate owns everything that touches the wire: building the
//! `GetCursOnDateXML` request envelope, sending it over HTTP, and decoding
//! the response XML into typed [`RateRecord`]s. It never touches storage.
//!
//! # Architecture
//!
//! ```text
//! CbrSoapClient (HTTP POST + SOAPAction header)
//!       │
//!       ▼
//! soap (envelope rendering, response decoding)
//!       │
//!       ▼
//! Vec<RateRecord>
//! ```

pub mod client;
pub mod errors;
pub mod models;
mod soap;
pub mod traits;

pub use client::CbrSoapClient;
pub use errors::RateSourceError;
pub use models::RateRecord;
pub use traits::RateSource;
