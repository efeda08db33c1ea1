//! Schema-readiness gate.
//!
//! Nothing else may touch storage until the schema exists. The store can
//! lag behind process start (container orchestration brings the database
//! volume up independently), so migration is retried on a fixed cadence
//! before giving up.

use log::{error, info, warn};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::db::{run_migrations, DbPool};
use cbr_rates_core::{Error, Result};

const MAX_ATTEMPTS: u32 = 30;
const RETRY_DELAY: Duration = Duration::from_secs(2);

/// How the gate finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    /// Schema is migrated and storage is usable.
    Ready,
    /// Shutdown was requested while waiting between attempts.
    Cancelled,
}

/// Ensures the persisted schema exists, retrying while storage is not yet
/// reachable. Exhausting the attempt ceiling is a terminal startup failure:
/// the caller must abort rather than run against a possibly-unready store.
pub async fn ensure_ready(pool: &DbPool, cancel: &CancellationToken) -> Result<GateOutcome> {
    ensure_ready_with(pool, cancel, MAX_ATTEMPTS, RETRY_DELAY).await
}

async fn ensure_ready_with(
    pool: &DbPool,
    cancel: &CancellationToken,
    max_attempts: u32,
    delay: Duration,
) -> Result<GateOutcome> {
    for attempt in 1..=max_attempts {
        match run_migrations(pool) {
            Ok(()) => {
                info!("Database schema is ready.");
                return Ok(GateOutcome::Ready);
            }
            Err(e) if attempt < max_attempts => {
                warn!(
                    "Database not ready yet (attempt {}/{}): {}. Retrying in {}s.",
                    attempt,
                    max_attempts,
                    e,
                    delay.as_secs()
                );
                tokio::select! {
                    _ = cancel.cancelled() => return Ok(GateOutcome::Cancelled),
                    _ = tokio::time::sleep(delay) => {}
                }
            }
            Err(e) => {
                error!(
                    "Storage never became ready after {} attempts: {}",
                    max_attempts, e
                );
                break;
            }
        }
    }
    Err(Error::StorageUnavailable {
        attempts: max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, init, DbPool};
    use diesel::r2d2::ConnectionManager;
    use diesel::sqlite::SqliteConnection;
    use std::sync::Arc;

    /// A pool pointing at an unopenable database; connections are created
    /// lazily so construction itself succeeds.
    fn broken_pool() -> DbPool {
        let manager =
            ConnectionManager::<SqliteConnection>::new("/nonexistent-dir/never/created.db");
        r2d2::Pool::builder()
            .max_size(1)
            .connection_timeout(Duration::from_millis(100))
            .build_unchecked(manager)
    }

    fn working_pool() -> (Arc<DbPool>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gate.db");
        let url = path.to_str().unwrap();
        init(url).unwrap();
        (create_pool(url).unwrap(), dir)
    }

    #[tokio::test]
    async fn ready_once_migrations_apply() {
        let (pool, _dir) = working_pool();
        let cancel = CancellationToken::new();

        let outcome = ensure_ready(&pool, &cancel).await.unwrap();

        assert_eq!(outcome, GateOutcome::Ready);
    }

    #[tokio::test]
    async fn exhausting_attempts_is_a_terminal_error() {
        let pool = broken_pool();
        let cancel = CancellationToken::new();

        let err = ensure_ready_with(&pool, &cancel, 2, Duration::from_millis(10))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::StorageUnavailable { attempts: 2 }));
    }

    #[tokio::test]
    async fn cancellation_during_the_wait_exits_cleanly() {
        let pool = broken_pool();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = ensure_ready_with(&pool, &cancel, 5, Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(outcome, GateOutcome::Cancelled);
    }
}
