//! Envelope rendering and response decoding for `GetCursOnDateXML`.
//!
//! The service wraps its payload either as nested XML elements or as an
//! XML-encoded string inside the result element; both shapes are handled.
//! Record fields are decoded leniently: the service is trusted to be
//! well-formed, and one bad field must not abort the whole batch.

use chrono::{NaiveDate, NaiveTime};
use log::warn;
use roxmltree::{Document, Node};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::errors::RateSourceError;
use crate::models::RateRecord;

const RESULT_ELEMENT: &str = "GetCursOnDateXMLResult";
const RECORD_ELEMENT: &str = "ValuteCursOnDate";

/// Renders the SOAP 1.1 request envelope for the given date.
///
/// The date is rendered as a local wall-clock `xsd:dateTime` at midnight,
/// with no explicit UTC offset — the service accepts local date/time.
pub(crate) fn build_envelope(date: NaiveDate) -> String {
    let on_date = date.and_time(NaiveTime::MIN).format("%Y-%m-%dT%H:%M:%S");

    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
               xmlns:xsd="http://www.w3.org/2001/XMLSchema"
               xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <GetCursOnDateXML xmlns="http://web.cbr.ru/">
      <On_date>{on_date}</On_date>
    </GetCursOnDateXML>
  </soap:Body>
</soap:Envelope>"#
    )
}

/// Decodes a SOAP response body into rate records.
pub(crate) fn decode_response(body: &str) -> Result<Vec<RateRecord>, RateSourceError> {
    let doc = Document::parse(body)
        .map_err(|e| RateSourceError::protocol(format!("response is not well-formed XML: {e}")))?;

    let result = doc
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == RESULT_ELEMENT)
        .ok_or_else(|| RateSourceError::protocol(format!("missing {RESULT_ELEMENT} element")))?;

    if let Some(data_root) = result.children().find(|n| n.is_element()) {
        return Ok(collect_records(data_root));
    }

    // The result can also arrive as an XML string payload.
    let inner = result.text().map(str::trim).unwrap_or("");
    if !inner.starts_with('<') {
        return Err(RateSourceError::protocol(format!(
            "{RESULT_ELEMENT} does not contain XML"
        )));
    }
    let inner_doc = Document::parse(inner).map_err(|e| {
        RateSourceError::protocol(format!("result payload is not well-formed XML: {e}"))
    })?;
    Ok(collect_records(inner_doc.root_element()))
}

/// Collects every `ValuteCursOnDate` record under the data root.
///
/// An empty set is legitimate (holidays have no published rates) and is
/// reported as a warning, not an error.
fn collect_records(data_root: Node) -> Vec<RateRecord> {
    let records: Vec<RateRecord> = data_root
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == RECORD_ELEMENT)
        .map(parse_record)
        .collect();

    if records.is_empty() {
        warn!(
            "Service returned 0 currencies for {}.",
            data_root.attribute("OnDate").unwrap_or("the requested date")
        );
    }

    records
}

fn parse_record(node: Node) -> RateRecord {
    RateRecord {
        cbr_code: child_i32(node, "Vcode"),
        char_code: child_text(node, "VchCode").to_string(),
        name: child_text(node, "Vname").to_string(),
        nominal: child_i32(node, "Vnom"),
        value: parse_ru_decimal(child_text(node, "Vcurs")),
    }
}

fn child_text<'a>(node: Node<'a, '_>, name: &str) -> &'a str {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
        .and_then(|n| n.text())
        .map(str::trim)
        .unwrap_or("")
}

fn child_i32(node: Node, name: &str) -> i32 {
    child_text(node, name).parse().unwrap_or(0)
}

/// Parses a decimal in the service's locale format, where the fractional
/// separator is a comma. Malformed values fall back to zero.
pub(crate) fn parse_ru_decimal(raw: &str) -> Decimal {
    let normalized: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    Decimal::from_str(&normalized).unwrap_or(Decimal::ZERO)
}
