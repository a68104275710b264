pub mod enums;
pub mod format;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{DisplayPosition, DriverStatus, SegmentClass};
pub use format::{format_lap_time, format_sector_time, parse_lap_time};
pub use structs::{
    ClassificationEntry, DataReadiness, Driver, DriverViewRecord, Gap, IntervalEntry, Lap,
    MiniSector, PitStop, PositionEntry, RaceControlEvent, RaceSnapshot, Session, Stint, TeamRadio,
    Weather, DEFAULT_COMPOUND, NO_GAP_DATA, UNPLACED_POSITION,
};
