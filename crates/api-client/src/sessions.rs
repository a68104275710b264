//! Pure session-selection helpers.
//!
//! Given the year's session list, decide which session the dashboard should
//! follow when the user has not picked one explicitly.

use chrono::{DateTime, Utc};
use core_types::Session;

/// Picks the session to display by default: the most recently finished one,
/// or the earliest upcoming one at the start of a season, or the last entry
/// as a fallback.
pub fn pick_latest_session(sessions: &[Session], now: DateTime<Utc>) -> Option<Session> {
    if sessions.is_empty() {
        return None;
    }

    let most_recent_past = sessions
        .iter()
        .filter(|s| s.date_end.is_some_and(|end| end <= now))
        .max_by_key(|s| s.date_end);
    if let Some(session) = most_recent_past {
        return Some(session.clone());
    }

    let next_future = sessions
        .iter()
        .filter(|s| s.date_start.is_some_and(|start| start > now))
        .min_by_key(|s| s.date_start);
    if let Some(session) = next_future {
        return Some(session.clone());
    }

    sessions.last().cloned()
}

/// The session currently in progress, if any.
pub fn find_active_session(sessions: &[Session], now: DateTime<Utc>) -> Option<&Session> {
    sessions.iter().find(|s| match (s.date_start, s.date_end) {
        (Some(start), Some(end)) => now >= start && now <= end,
        _ => false,
    })
}

/// Up to `limit` future sessions, earliest first.
pub fn upcoming_sessions(sessions: &[Session], now: DateTime<Utc>, limit: usize) -> Vec<Session> {
    let mut upcoming: Vec<Session> = sessions
        .iter()
        .filter(|s| s.date_start.is_some_and(|start| start > now))
        .cloned()
        .collect();
    upcoming.sort_by_key(|s| s.date_start);
    upcoming.truncate(limit);
    upcoming
}
