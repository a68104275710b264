//! Payload-size mitigations.
//!
//! Historical sessions hold millions of records, far beyond the free API
//! tier's 4 MB response budget. These reductions shrink oversized
//! collections to the latest observation per driver before they ever reach
//! the reconciliation engine; small responses pass through untouched.

use core_types::{IntervalEntry, Lap, PositionEntry, Stint};
use std::collections::HashMap;

/// Collections larger than these thresholds are collapsed per driver.
pub const LAPS_LIMIT: usize = 100;
pub const INTERVALS_LIMIT: usize = 100;
pub const STINTS_LIMIT: usize = 200;
/// Live position feeds are truncated to this many trailing records.
pub const POSITIONS_TAIL: usize = 500;

pub fn latest_laps_per_driver(laps: Vec<Lap>) -> Vec<Lap> {
    let mut latest: HashMap<u32, Lap> = HashMap::new();
    for lap in laps {
        match latest.get(&lap.driver_number) {
            Some(kept) if kept.lap_number > lap.lap_number => {}
            _ => {
                latest.insert(lap.driver_number, lap);
            }
        }
    }
    latest.into_values().collect()
}

pub fn latest_intervals_per_driver(intervals: Vec<IntervalEntry>) -> Vec<IntervalEntry> {
    let mut latest: HashMap<u32, IntervalEntry> = HashMap::new();
    for entry in intervals {
        match latest.get(&entry.driver_number) {
            Some(kept) if kept.date > entry.date => {}
            _ => {
                latest.insert(entry.driver_number, entry);
            }
        }
    }
    latest.into_values().collect()
}

pub fn latest_stints_per_driver(stints: Vec<Stint>) -> Vec<Stint> {
    let mut latest: HashMap<u32, Stint> = HashMap::new();
    for stint in stints {
        match latest.get(&stint.driver_number) {
            Some(kept) if kept.stint_number > stint.stint_number => {}
            _ => {
                latest.insert(stint.driver_number, stint);
            }
        }
    }
    latest.into_values().collect()
}

/// Keeps only the trailing `tail` records of a position feed.
pub fn truncate_positions(mut positions: Vec<PositionEntry>, tail: usize) -> Vec<PositionEntry> {
    if positions.len() > tail {
        positions.drain(..positions.len() - tail);
    }
    positions
}
