//! In-memory search and date-range filtering over the recording list.
//!
//! Pure and side-effect-free; recomputed on every change to the underlying
//! list, query string, or range selection. Text and date predicates combine
//! with AND, and input order is preserved.

use chrono::{DateTime, Duration, NaiveTime, Utc};

use crate::domain::Recording;

/// Date-range selection for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateRange {
    /// No date bound
    #[default]
    All,

    /// From the start of the current day, boundary inclusive
    Today,

    /// Rolling 7 days, boundary inclusive
    Week,

    /// Rolling 30 days, boundary inclusive
    Month,
}

impl DateRange {
    /// The inclusive lower bound for this range, if any
    fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::All => None,
            Self::Today => Some(now.date_naive().and_time(NaiveTime::MIN).and_utc()),
            Self::Week => Some(now - Duration::days(7)),
            Self::Month => Some(now - Duration::days(30)),
        }
    }
}

/// Filter recordings by text query and date range.
///
/// The text match is a case-insensitive substring over `title` OR `summary`
/// (when present); an empty query matches everything. `now` anchors the
/// date windows so results are deterministic under test.
pub fn filter(
    records: &[Recording],
    query: &str,
    range: DateRange,
    now: DateTime<Utc>,
) -> Vec<Recording> {
    let needle = query.trim().to_lowercase();
    let cutoff = range.cutoff(now);

    records
        .iter()
        .filter(|r| matches_text(r, &needle))
        .filter(|r| cutoff.map(|c| r.created_at >= c).unwrap_or(true))
        .cloned()
        .collect()
}

fn matches_text(recording: &Recording, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }

    recording.title.to_lowercase().contains(needle)
        || recording
            .summary
            .as_deref()
            .map(|s| s.to_lowercase().contains(needle))
            .unwrap_or(false)
}
