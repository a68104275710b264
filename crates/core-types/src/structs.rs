use crate::enums::{DisplayPosition, DriverStatus, SegmentClass};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel rank for a driver with no usable position data. Sorts after all
/// real positions.
pub const UNPLACED_POSITION: u32 = 999;

/// Sentinel numeric gap for "no interval data". Must sort last under both
/// sort directions.
pub const NO_GAP_DATA: f64 = 999_999.0;

/// Documented default when stint data is entirely absent: the softest
/// compound, not an error.
pub const DEFAULT_COMPOUND: &str = "SOFT";

// ============================================================================
// Raw upstream entities (one record per observation, consumed as-is)
// ============================================================================

/// Static per-session driver identity. The driver set is the join spine:
/// records in every other stream that reference an unknown driver number are
/// dropped during reconciliation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Driver {
    pub driver_number: u32,
    pub name_acronym: Option<String>,
    pub full_name: Option<String>,
    pub team_name: Option<String>,
    pub team_colour: Option<String>,
}

/// One observation of a driver's running position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionEntry {
    pub driver_number: u32,
    pub position: u32,
    pub date: DateTime<Utc>,
}

/// One completed lap. Segment arrays may contain nulls for untimed
/// mini-sectors, and any duration may be missing while the lap is in
/// progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lap {
    pub driver_number: u32,
    pub lap_number: u32,
    pub lap_duration: Option<f64>,
    pub duration_sector_1: Option<f64>,
    pub duration_sector_2: Option<f64>,
    pub duration_sector_3: Option<f64>,
    #[serde(default)]
    pub segments_sector_1: Option<Vec<Option<u16>>>,
    #[serde(default)]
    pub segments_sector_2: Option<Vec<Option<u16>>>,
    #[serde(default)]
    pub segments_sector_3: Option<Vec<Option<u16>>>,
    /// Speed-trap speed in km/h.
    pub st_speed: Option<f64>,
    pub date_start: Option<DateTime<Utc>>,
}

/// A gap value as published upstream: either a time delta in seconds or an
/// already-formatted lap-count string such as `"+1 LAP"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Gap {
    Seconds(f64),
    Laps(String),
}

/// One observation of a driver's gap to the leader and to the car ahead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntervalEntry {
    pub driver_number: u32,
    pub gap_to_leader: Option<Gap>,
    pub interval: Option<Gap>,
    pub date: DateTime<Utc>,
}

/// A continuous period on one tyre compound. The stint with the highest
/// `stint_number` is the driver's current one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stint {
    pub driver_number: u32,
    pub stint_number: u32,
    pub compound: Option<String>,
}

/// One pit stop event; occurrences are counted, never deduplicated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PitStop {
    pub driver_number: u32,
}

/// One entry of the final classification. Authoritative over live position
/// data when present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationEntry {
    pub driver_number: u32,
    pub position: u32,
    pub display_position: DisplayPosition,
    pub status: DriverStatus,
    pub lap_number: u32,
    pub date_start: Option<DateTime<Utc>>,
}

/// One timed track activity (practice, qualifying, race).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub session_key: u64,
    pub meeting_key: Option<u64>,
    pub session_name: Option<String>,
    pub country_name: Option<String>,
    pub circuit_short_name: Option<String>,
    pub year: Option<i32>,
    pub date_start: Option<DateTime<Utc>>,
    pub date_end: Option<DateTime<Utc>>,
}

/// One weather observation for the circuit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Weather {
    pub air_temperature: Option<f64>,
    pub track_temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub rainfall: Option<f64>,
    pub wind_speed: Option<f64>,
    pub date: Option<DateTime<Utc>>,
}

/// One team-radio exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamRadio {
    pub driver_number: u32,
    pub date: Option<DateTime<Utc>>,
    pub recording_url: Option<String>,
}

/// One race-control message (flags, penalties, safety car).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceControlEvent {
    pub date: Option<DateTime<Utc>>,
    pub category: Option<String>,
    pub flag: Option<String>,
    pub message: Option<String>,
    pub driver_number: Option<u32>,
}

// ============================================================================
// Reconciliation input and output
// ============================================================================

/// The immutable input bundle for one reconciliation pass: everything the
/// gateway managed to fetch, each collection possibly empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RaceSnapshot {
    pub session: Option<Session>,
    pub drivers: Vec<Driver>,
    pub positions: Vec<PositionEntry>,
    pub laps: Vec<Lap>,
    pub intervals: Vec<IntervalEntry>,
    pub pit_stops: Vec<PitStop>,
    pub stints: Vec<Stint>,
    pub classification: Vec<ClassificationEntry>,
    /// The session's total lap count when it can be derived; used as the
    /// finish threshold instead of a hardcoded race distance.
    pub total_laps: Option<u32>,
}

/// Which streams of a snapshot arrived non-empty; drives the degraded-data
/// banner in the presentation layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DataReadiness {
    pub drivers: bool,
    pub positions: bool,
    pub laps: bool,
    pub intervals: bool,
    pub stints: bool,
}

impl DataReadiness {
    pub fn from_snapshot(snapshot: &RaceSnapshot) -> Self {
        Self {
            drivers: !snapshot.drivers.is_empty(),
            positions: !snapshot.positions.is_empty(),
            laps: !snapshot.laps.is_empty(),
            intervals: !snapshot.intervals.is_empty(),
            stints: !snapshot.stints.is_empty(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.drivers && self.positions && self.laps && self.intervals && self.stints
    }

    /// Names of the streams that came back empty.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        for (ready, name) in [
            (self.drivers, "drivers"),
            (self.positions, "positions"),
            (self.laps, "laps"),
            (self.intervals, "intervals"),
            (self.stints, "stints"),
        ] {
            if !ready {
                missing.push(name);
            }
        }
        missing
    }
}

/// One timed mini-sector segment of a driver's latest lap, already
/// classified for color-coded rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiniSector {
    pub value: u16,
    pub class: SegmentClass,
}

impl MiniSector {
    pub fn new(value: Option<u16>) -> Self {
        Self {
            value: value.unwrap_or(0),
            class: SegmentClass::classify(value),
        }
    }
}

/// The reconciled per-driver view model, one record per distinct driver
/// number in the driver set. Rebuilt from scratch on every pass and
/// read-only to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverViewRecord {
    /// Integer rank, or [`UNPLACED_POSITION`] when unknown.
    pub position: u32,
    pub display_position: DisplayPosition,
    pub status: DriverStatus,
    pub driver_number: u32,
    pub driver: String,
    pub team_name: String,
    pub team_colour: String,
    /// Formatted gap to the leader: `"LEADER"`, `"+12.345"`, a lap-count
    /// string, or `"-"` when unknown.
    pub leader: String,
    /// Raw numeric gap; [`NO_GAP_DATA`] when unknown.
    pub leader_gap: f64,
    pub tyre: String,
    pub best_lap: String,
    pub interval: String,
    pub last_lap: String,
    pub mini_sectors: Vec<MiniSector>,
    pub sector1: String,
    pub sector2: String,
    pub sector3: String,
    pub last_sector: String,
    pub pit: u32,
    pub top_speed: String,
    pub lap_number: u32,
    pub finished: bool,
}
