use crate::error::ReconcileError;
use core_types::{parse_lap_time, DriverViewRecord, NO_GAP_DATA};
use std::cmp::Ordering;
use std::str::FromStr;

/// A sortable leaderboard column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Position,
    Driver,
    TeamName,
    Leader,
    Tyre,
    BestLap,
    Interval,
    LastLap,
    LastSector,
    Pit,
    TopSpeed,
    LapNumber,
}

impl FromStr for SortField {
    type Err = ReconcileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "position" => Ok(SortField::Position),
            "driver" => Ok(SortField::Driver),
            "team" | "team_name" => Ok(SortField::TeamName),
            "leader" | "gap" => Ok(SortField::Leader),
            "tyre" => Ok(SortField::Tyre),
            "best_lap" | "best" => Ok(SortField::BestLap),
            "interval" => Ok(SortField::Interval),
            "last_lap" | "last" => Ok(SortField::LastLap),
            "last_sector" => Ok(SortField::LastSector),
            "pit" => Ok(SortField::Pit),
            "top_speed" | "speed" => Ok(SortField::TopSpeed),
            "lap" | "lap_number" => Ok(SortField::LapNumber),
            other => Err(ReconcileError::UnknownSortField(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// The active sort column and direction. Toggling the active column flips
/// the direction; selecting a new column resets to ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            field: SortField::Position,
            direction: SortDirection::Ascending,
        }
    }
}

impl SortState {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    pub fn toggle(&mut self, field: SortField) {
        if self.field == field {
            self.direction = match self.direction {
                SortDirection::Ascending => SortDirection::Descending,
                SortDirection::Descending => SortDirection::Ascending,
            };
        } else {
            self.field = field;
            self.direction = SortDirection::Ascending;
        }
    }
}

/// Returns a copy of `records` ordered by the given sort state. Records
/// whose value for the column is a no-data sentinel sort after all real
/// values regardless of direction; the sort is stable, so equal records
/// keep their incoming relative order.
pub fn sort_records(records: &[DriverViewRecord], state: SortState) -> Vec<DriverViewRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| {
        match (is_sentinel(state.field, a), is_sentinel(state.field, b)) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => {
                let ordering = compare(state.field, a, b);
                match state.direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            }
        }
    });
    sorted
}

/// Whether the record carries no usable data for the column. Checked before
/// the direction is applied so sentinels trail under descending sorts too.
fn is_sentinel(field: SortField, record: &DriverViewRecord) -> bool {
    match field {
        SortField::Leader => record.leader_gap == NO_GAP_DATA,
        SortField::BestLap => record.best_lap == "-",
        SortField::LastLap => record.last_lap == "-",
        SortField::Interval => record.interval == "-",
        SortField::LastSector => record.last_sector == "-",
        SortField::TopSpeed => record.top_speed == "-",
        _ => false,
    }
}

fn compare(field: SortField, a: &DriverViewRecord, b: &DriverViewRecord) -> Ordering {
    match field {
        SortField::Position => a.position.cmp(&b.position),
        SortField::Driver => lexical(&a.driver, &b.driver),
        SortField::TeamName => lexical(&a.team_name, &b.team_name),
        SortField::Tyre => lexical(&a.tyre, &b.tyre),
        SortField::Leader => a.leader_gap.total_cmp(&b.leader_gap),
        SortField::BestLap => lap_time(&a.best_lap, &b.best_lap),
        SortField::LastLap => lap_time(&a.last_lap, &b.last_lap),
        SortField::Interval => numeric_then_lexical(&a.interval, &b.interval),
        SortField::LastSector => numeric_then_lexical(&a.last_sector, &b.last_sector),
        SortField::Pit => a.pit.cmp(&b.pit),
        SortField::TopSpeed => numeric_then_lexical(&a.top_speed, &b.top_speed),
        SortField::LapNumber => a.lap_number.cmp(&b.lap_number),
    }
}

fn lexical(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// `"m:ss.mmm"` strings compare by their decoded duration; anything that
/// fails to parse sorts after every parsed value.
fn lap_time(a: &str, b: &str) -> Ordering {
    let a = parse_lap_time(a).unwrap_or(f64::MAX);
    let b = parse_lap_time(b).unwrap_or(f64::MAX);
    a.total_cmp(&b)
}

/// Compares numerically when both sides parse as numbers, lexically
/// otherwise.
fn numeric_then_lexical(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(a), Ok(b)) => a.total_cmp(&b),
        _ => lexical(a, b),
    }
}
