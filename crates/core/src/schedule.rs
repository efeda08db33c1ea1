//! Scheduling arithmetic for the daemon loop.
//!
//! Everything here is a pure function of an injected `now` — the runner owns
//! the only real clock, so next-run computation stays deterministically
//! testable across timezone and DST boundaries.

use chrono::{
    DateTime, Duration as ChronoDuration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime,
    TimeZone, Utc,
};
use chrono_tz::Tz;
use log::warn;
use std::time::Duration;

/// Platform aliases tried when the configured identifier is not a known
/// IANA name (Windows deployments configure "Russian Standard Time").
const TIMEZONE_ALIASES: &[(&str, &str)] = &[("Russian Standard Time", "Europe/Moscow")];

/// Resolves a timezone identifier, degrading gracefully: requested id →
/// platform alias → UTC. Never fails.
pub fn resolve_timezone(id: &str) -> Tz {
    if let Ok(tz) = id.parse::<Tz>() {
        return tz;
    }
    for (alias, canonical) in TIMEZONE_ALIASES {
        if alias.eq_ignore_ascii_case(id) {
            if let Ok(tz) = canonical.parse::<Tz>() {
                return tz;
            }
        }
    }
    warn!("Unknown timezone identifier '{id}'; falling back to UTC.");
    Tz::UTC
}

/// The current calendar date on the wall clock of `tz`.
pub fn local_today(now_utc: DateTime<Utc>, tz: Tz) -> NaiveDate {
    now_utc.with_timezone(&tz).date_naive()
}

/// Computes the next instant the daily import should run: today at
/// `run_time` on the wall clock of `tz`, or tomorrow if that has already
/// passed. The same target is never produced twice in a row backward.
pub fn next_run_at(now_utc: DateTime<Utc>, run_time: NaiveTime, tz: Tz) -> DateTime<Utc> {
    let today = local_today(now_utc, tz);
    let target = resolve_local(today.and_time(run_time), tz);
    if target > now_utc {
        return target;
    }
    let tomorrow = match today.succ_opt() {
        Some(d) => d,
        None => return now_utc + ChronoDuration::days(1),
    };
    resolve_local(tomorrow.and_time(run_time), tz)
}

/// Maps a wall-clock time onto a UTC instant across DST transitions.
fn resolve_local(local: NaiveDateTime, tz: Tz) -> DateTime<Utc> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        // Fall-back transition: the wall-clock time occurs twice; take the
        // earlier instant.
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        // Spring-forward gap: the wall-clock time does not exist; run an
        // hour later instead.
        LocalResult::None => match tz.from_local_datetime(&(local + ChronoDuration::hours(1))) {
            LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
            LocalResult::None => Utc.from_utc_datetime(&local),
        },
    }
}

/// How long to sleep until `next_run`, clamped to non-negative.
pub fn sleep_duration(now_utc: DateTime<Utc>, next_run: DateTime<Utc>) -> Duration {
    (next_run - now_utc).to_std().unwrap_or(Duration::ZERO)
}

/// Resolves the initial import window. Explicit bounds win; a missing bound
/// falls back to the backfill default (`today − (backfill_days − 1)` .. today).
/// Reversed bounds are normalized by swapping.
pub fn initial_window(
    today: NaiveDate,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    backfill_days: u32,
) -> (NaiveDate, NaiveDate) {
    let span = ChronoDuration::days(i64::from(backfill_days.saturating_sub(1)));
    let start = from.unwrap_or_else(|| today.checked_sub_signed(span).unwrap_or(today));
    let end = to.unwrap_or(today);
    if start > end {
        (end, start)
    } else {
        (start, end)
    }
}
