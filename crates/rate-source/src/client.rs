//! HTTP client for the CBR DailyInfo SOAP service.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;

use crate::errors::RateSourceError;
use crate::models::RateRecord;
use crate::soap;
use crate::traits::RateSource;

/// The action header distinguishes the requested operation; the quotes are
/// part of the SOAP 1.1 header value.
const SOAP_ACTION: &str = "\"http://web.cbr.ru/GetCursOnDateXML\"";

/// Default HTTP request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the `GetCursOnDateXML` operation of the CBR DailyInfo service.
///
/// Holds a connection-pooled HTTP client; no response caching across calls.
pub struct CbrSoapClient {
    http: Client,
    endpoint: String,
}

impl CbrSoapClient {
    /// Creates a client for the given endpoint with the default timeout.
    pub fn new(endpoint: impl Into<String>) -> Self {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("cbr-rates-loader/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    /// Creates a client reusing an externally configured HTTP client.
    pub fn with_http(endpoint: impl Into<String>, http: Client) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl RateSource for CbrSoapClient {
    async fn rates_on_date(&self, date: NaiveDate) -> Result<Vec<RateRecord>, RateSourceError> {
        let envelope = soap::build_envelope(date);

        let response = self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "text/xml; charset=utf-8")
            .header("SOAPAction", SOAP_ACTION)
            .body(envelope)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RateSourceError::Status(status));
        }

        let body = response.text().await?;
        soap::decode_response(&body)
    }
}
