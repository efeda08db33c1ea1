//! Currency and rate persistence.

pub mod model;
pub mod repository;

pub use model::{CurrencyDB, CurrencyRateDB};
pub use repository::SqliteRateStore;
