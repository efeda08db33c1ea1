//! Orchestration: readiness gate → initial import → optional daemon loop.

use chrono::Utc;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::cli::Cli;
use cbr_rates_core::rates::RateImportService;
use cbr_rates_core::schedule::{
    initial_window, local_today, next_run_at, resolve_timezone, sleep_duration,
};
use cbr_rates_core::Result;
use cbr_rates_storage_sqlite::{ensure_ready, DbPool, GateOutcome};

pub async fn run(
    cli: Cli,
    pool: Arc<DbPool>,
    importer: Arc<RateImportService>,
    cancel: CancellationToken,
) -> Result<()> {
    info!(
        "Starting in {} mode.",
        if cli.daemon { "daemon" } else { "one-shot" }
    );

    // A schema that never becomes ready is a startup failure; the error
    // propagates and aborts the process.
    match ensure_ready(&pool, &cancel).await? {
        GateOutcome::Ready => {}
        GateOutcome::Cancelled => return Ok(()),
    }

    let tz = resolve_timezone(&cli.timezone);
    let today = local_today(Utc::now(), tz);
    let (from, to) = initial_window(today, cli.from, cli.to, cli.backfill_days);
    // An explicit range must be re-imported in full; pure backfill may skip
    // days that already have rates.
    let explicit_range = cli.from.is_some() || cli.to.is_some();

    info!("Initial import window: {from} .. {to}");
    let outcome = importer.import_range(from, to, !explicit_range).await?;
    info!(
        "Initial import done: days={}, skipped={}, inserted={}, updated={}.",
        outcome.days, outcome.days_skipped, outcome.inserted, outcome.updated
    );

    if !cli.daemon {
        info!("One-shot run finished.");
        return Ok(());
    }

    info!(
        "Daemon mode active; daily import at {} ({}).",
        cli.run_time.format("%H:%M"),
        tz
    );

    while !cancel.is_cancelled() {
        let now = Utc::now();
        let next_run = next_run_at(now, cli.run_time, tz);
        let delay = sleep_duration(now, next_run);
        info!(
            "Next import scheduled for {} (in {}s).",
            next_run.with_timezone(&tz),
            delay.as_secs()
        );

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(delay) => {}
        }

        // A new day may have begun while sleeping; always import "today"
        // as seen from the configured timezone, without the skip shortcut,
        // so a partial prior run is corrected.
        let run_date = local_today(Utc::now(), tz);
        info!("Running scheduled import for {run_date}.");
        match importer.import_day(run_date, false).await {
            Ok(outcome) => info!(
                "Scheduled import done: inserted={}, updated={}.",
                outcome.inserted, outcome.updated
            ),
            // A single bad day must not take the daemon down; the next
            // cycle is the retry.
            Err(e) => error!("Scheduled import for {run_date} failed: {e}"),
        }
    }

    info!("Shutdown requested; daemon loop stopped.");
    Ok(())
}
