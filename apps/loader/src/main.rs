mod cli;
mod runner;

use clap::Parser;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use cbr_rates_core::rates::RateImportService;
use cbr_rates_source::CbrSoapClient;
use cbr_rates_storage_sqlite::{create_pool, db, SqliteRateStore};
use cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    db::init(&cli.database)?;
    let pool = create_pool(&cli.database)?;
    tracing::info!("Database path in use: {}", cli.database);

    let source = Arc::new(CbrSoapClient::new(&cli.endpoint));
    let store = Arc::new(SqliteRateStore::new(pool.clone()));
    let importer = Arc::new(RateImportService::new(source, store));

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Ctrl-C received; shutting down.");
                cancel.cancel();
            }
        });
    }

    runner::run(cli, pool, importer, cancel).await?;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .init();
}
