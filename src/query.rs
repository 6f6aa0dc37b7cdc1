//! Query parsing and evaluation. A raw query string becomes exactly one
//! `Filter` variant: an app filter (`from:<app>`), an age bound
//! (`... <unit> ago`), or a free-text substring filter. Matching is
//! case-insensitive throughout and results keep store order.

use anyhow::{bail, Result};
use chrono::{DateTime, Duration, Utc};

use crate::models::Record;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Substring match across recognized text, app name and image filename.
    Text(String),
    /// Substring match against the app name only.
    App(String),
    /// Matches records no older than the bound at evaluation time.
    MaxAge(Duration),
}

const HOUR_SECS: i64 = 3_600;
const DAY_SECS: i64 = 86_400;
const WEEK_SECS: i64 = 604_800;

pub fn parse(raw: &str) -> Result<Filter> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        bail!("empty query");
    }
    let lowered = trimmed.to_lowercase();

    if let Some(index) = lowered.find("from:") {
        let app = lowered[index + "from:".len()..].trim().to_string();
        return Ok(Filter::App(app));
    }

    // "ago" must stand on its own so free text like "dragonfly" is not
    // mistaken for an age query; units match by substring so plurals count.
    if lowered.split_whitespace().any(|token| token == "ago") {
        if let Some(max_age) = age_bound(&lowered) {
            return Ok(Filter::MaxAge(max_age));
        }
    }

    Ok(Filter::Text(lowered))
}

/// Unit precedence is hour, then day, then week.
fn age_bound(lowered: &str) -> Option<Duration> {
    if lowered.contains("hour") {
        Some(Duration::seconds(HOUR_SECS))
    } else if lowered.contains("day") {
        Some(Duration::seconds(DAY_SECS))
    } else if lowered.contains("week") {
        Some(Duration::seconds(WEEK_SECS))
    } else {
        None
    }
}

/// Iterates the store's existing (most-recent-first) order and keeps matches;
/// no re-ranking. `now` is sampled once by the caller.
pub fn evaluate<'a>(
    filter: &Filter,
    records: &'a [Record],
    now: DateTime<Utc>,
) -> Vec<&'a Record> {
    records
        .iter()
        .filter(|record| matches(filter, record, now))
        .collect()
}

fn matches(filter: &Filter, record: &Record, now: DateTime<Utc>) -> bool {
    match filter {
        Filter::Text(needle) => {
            record.text.to_lowercase().contains(needle)
                || record.app_name.to_lowercase().contains(needle)
                || record.image_filename().to_lowercase().contains(needle)
        }
        Filter::App(app) => record.app_name.to_lowercase().contains(app),
        Filter::MaxAge(max_age) => now - record.captured_at <= *max_age,
    }
}
