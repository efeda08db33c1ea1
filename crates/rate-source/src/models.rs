//! Transient records decoded from the CBR response.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One currency's published rate for one calendar date, as decoded from the
/// service response. Not persisted; within a single day's batch a record has
/// no identity beyond its alphabetic code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateRecord {
    /// Numeric currency code in the CBR system (`Vcode`).
    pub cbr_code: i32,
    /// Alphabetic code, e.g. "USD" (`VchCode`).
    pub char_code: String,
    /// Display name (`Vname`).
    pub name: String,
    /// Unit multiple the rate applies to, e.g. 1/10/100 (`Vnom`).
    pub nominal: i32,
    /// Rubles per `nominal` units (`Vcurs`).
    pub value: Decimal,
}
