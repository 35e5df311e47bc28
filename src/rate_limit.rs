//! Sliding-window rate limiter.
//!
//! Each call reads the stored timestamps, keeps those inside the trailing
//! window, and either denies (ceiling reached) or writes back the survivors
//! plus the current call. There is no locking: concurrent hooks may lose or
//! duplicate one entry, and a torn line is skipped as malformed on the next read.

use crate::decision::Decision;
use crate::state::RateStore;
use chrono::{DateTime, Duration, SecondsFormat, Utc};

/// Length of the trailing window.
pub const WINDOW_SECS: i64 = 60;

/// Timestamps strictly inside `(now - window, now]`, skipping malformed lines.
pub fn recent_calls(lines: &[String], now: DateTime<Utc>) -> Vec<DateTime<Utc>> {
    let cutoff = now - Duration::seconds(WINDOW_SECS);
    lines
        .iter()
        .filter_map(|line| DateTime::parse_from_rfc3339(line.trim()).ok())
        .map(|ts| ts.with_timezone(&Utc))
        .filter(|ts| *ts > cutoff)
        .collect()
}

/// Count this call against the window, denying once `limit` calls are already recorded.
///
/// Store failures allow the call.
pub fn check_rate(store: &dyn RateStore, limit: usize, now: DateTime<Utc>) -> Decision {
    let lines = match store.load() {
        Ok(lines) => lines,
        Err(e) => {
            tracing::warn!(error = %e, "rate limiter state unreadable, allowing");
            return Decision::allow();
        }
    };

    let mut recent = recent_calls(&lines, now);
    if recent.len() >= limit {
        return Decision::deny(
            "rate.limit",
            format!(
                "Blocked: rate limit exceeded ({} calls in last minute, limit: {limit}). Possible runaway loop.",
                recent.len()
            ),
        );
    }

    recent.push(now);
    let updated: Vec<String> = recent
        .iter()
        .map(|ts| ts.to_rfc3339_opts(SecondsFormat::Nanos, true))
        .collect();
    if let Err(e) = store.save(&updated) {
        tracing::warn!(error = %e, "failed to persist rate limiter state");
    }

    Decision::allow()
}
