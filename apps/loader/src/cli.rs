//! Command-line surface.

use chrono::{NaiveDate, NaiveTime};
use clap::Parser;

/// Default CBR DailyInfo SOAP endpoint.
const DEFAULT_ENDPOINT: &str = "https://www.cbr.ru/DailyInfoWebServ/DailyInfo.asmx";

#[derive(Parser, Debug, Clone)]
#[command(name = "cbr-rates-loader", version, about)]
pub struct Cli {
    /// Keep running and re-import once per day at the configured local time.
    #[arg(long)]
    pub daemon: bool,

    /// First day of an explicit import range (YYYY-MM-DD).
    #[arg(long, value_name = "DATE")]
    pub from: Option<NaiveDate>,

    /// Last day of an explicit import range (YYYY-MM-DD).
    #[arg(long, value_name = "DATE")]
    pub to: Option<NaiveDate>,

    /// How many days to backfill on startup when no explicit range is given.
    #[arg(long = "days", value_name = "N", default_value_t = 30)]
    pub backfill_days: u32,

    /// Local time of day for the daemon's daily import (HH:MM).
    #[arg(long = "at", value_name = "TIME", default_value = "02:00", value_parser = parse_run_time)]
    pub run_time: NaiveTime,

    /// Timezone the daily schedule is anchored to.
    #[arg(long = "tz", value_name = "ZONE", default_value = "Europe/Moscow")]
    pub timezone: String,

    /// CBR DailyInfo SOAP endpoint.
    #[arg(long, env = "CBR_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// SQLite database path.
    #[arg(long, env = "DATABASE_URL", default_value = "cbr_rates.db")]
    pub database: String,
}

fn parse_run_time(raw: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| format!("'{raw}' is not a valid HH:MM time"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_contract() {
        let cli = Cli::parse_from(["cbr-rates-loader"]);
        assert!(!cli.daemon);
        assert_eq!(cli.backfill_days, 30);
        assert_eq!(cli.run_time, NaiveTime::from_hms_opt(2, 0, 0).unwrap());
        assert_eq!(cli.timezone, "Europe/Moscow");
    }

    #[test]
    fn parses_an_explicit_range() {
        let cli = Cli::parse_from([
            "cbr-rates-loader",
            "--from",
            "2026-01-01",
            "--to",
            "2026-01-31",
        ]);
        assert_eq!(cli.from, NaiveDate::from_ymd_opt(2026, 1, 1));
        assert_eq!(cli.to, NaiveDate::from_ymd_opt(2026, 1, 31));
    }

    #[test]
    fn rejects_a_malformed_run_time() {
        assert!(Cli::try_parse_from(["cbr-rates-loader", "--at", "25:99"]).is_err());
        assert!(Cli::try_parse_from(["cbr-rates-loader", "--at", "07:30"]).is_ok());
    }
}
