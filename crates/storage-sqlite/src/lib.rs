//! SQLite storage implementation for the CBR rates loader.
//!
//! This crate provides all database-related functionality using Diesel ORM
//! with SQLite. It implements the store trait defined in `cbr-rates-core`
//! and contains:
//! - Database connection pooling and management
//! - Diesel migrations and the schema-readiness gate
//! - The transactional rate-store implementation
//!
//! # Architecture
//!
//! This crate is the only place in the application where Diesel dependencies
//! exist. All other crates are database-agnostic and work with traits.
//!
//! ```text
//! core (domain, reconciliation planning)
//!                  │
//!                  ▼
//!          storage-sqlite (this crate)
//!                  │
//!                  ▼
//!              SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod migrator;
pub mod schema;
mod utils;

pub mod rates;

// Re-export database utilities
pub use db::{create_pool, get_connection, init, run_migrations, DbConnection, DbPool};

// Re-export the readiness gate and the store implementation
pub use migrator::{ensure_ready, GateOutcome};
pub use rates::SqliteRateStore;

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};
