//! Currency reference data and daily rate facts.

pub mod model;
pub mod reconcile;
pub mod service;
pub mod store;


pub use model::{
    Currency, CurrencyRate, DayImportOutcome, DayReconciliation, RangeImportOutcome,
};
pub use service::RateImportService;
pub use store::RateStore;
