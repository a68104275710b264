use serde::de::{self, Deserializer, Unexpected};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The resolved classification status of a driver within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriverStatus {
    #[serde(rename = "CLASSIFIED")]
    Classified,
    #[serde(rename = "DNF")]
    Dnf,
    #[serde(rename = "DSQ")]
    Dsq,
}

impl DriverStatus {
    /// True only for drivers that are (or are projected to be) classified finishers.
    pub fn is_finished(&self) -> bool {
        matches!(self, DriverStatus::Classified)
    }
}

impl fmt::Display for DriverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DriverStatus::Classified => "CLASSIFIED",
            DriverStatus::Dnf => "DNF",
            DriverStatus::Dsq => "DSQ",
        };
        f.write_str(text)
    }
}

/// The position shown to the user: a numeric place for classified drivers,
/// or one of the symbolic codes for everyone else. The symbolic variants
/// never occur independently of `DriverStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayPosition {
    Place(u32),
    NotClassified,
    Disqualified,
}

impl fmt::Display for DisplayPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayPosition::Place(n) => write!(f, "{n}"),
            DisplayPosition::NotClassified => f.write_str("NC"),
            DisplayPosition::Disqualified => f.write_str("DQ"),
        }
    }
}

// On the wire a display position is either a number or the literal
// "NC"/"DQ" codes, so the serde impls are written by hand.
impl Serialize for DisplayPosition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DisplayPosition::Place(n) => serializer.serialize_u32(*n),
            DisplayPosition::NotClassified => serializer.serialize_str("NC"),
            DisplayPosition::Disqualified => serializer.serialize_str("DQ"),
        }
    }
}

impl<'de> Deserialize<'de> for DisplayPosition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u32),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(DisplayPosition::Place(n)),
            Raw::Text(code) => match code.as_str() {
                "NC" => Ok(DisplayPosition::NotClassified),
                "DQ" | "DSQ" => Ok(DisplayPosition::Disqualified),
                other => Err(de::Error::invalid_value(
                    Unexpected::Str(other),
                    &"a position number, \"NC\" or \"DQ\"",
                )),
            },
        }
    }
}

/// Color class of one timed mini-sector segment, derived from the fixed
/// segment codes published by the upstream timing feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentClass {
    /// Fastest segment of the whole session (code 2051).
    BestOverall,
    /// Driver's personal best in that segment (code 2049).
    PersonalBest,
    /// Slower than the driver's personal pace (code 2048).
    Slow,
    /// Any other positive segment code.
    Normal,
    /// Absent or zero value; rendered as a gap, not a zero-width segment.
    Unclassified,
}

impl SegmentClass {
    pub fn classify(value: Option<u16>) -> Self {
        match value {
            Some(2051) => SegmentClass::BestOverall,
            Some(2049) => SegmentClass::PersonalBest,
            Some(2048) => SegmentClass::Slow,
            Some(v) if v > 0 => SegmentClass::Normal,
            _ => SegmentClass::Unclassified,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_codes_map_to_documented_classes() {
        assert_eq!(SegmentClass::classify(Some(2051)), SegmentClass::BestOverall);
        assert_eq!(SegmentClass::classify(Some(2049)), SegmentClass::PersonalBest);
        assert_eq!(SegmentClass::classify(Some(2048)), SegmentClass::Slow);
        assert_eq!(SegmentClass::classify(Some(1800)), SegmentClass::Normal);
        assert_eq!(SegmentClass::classify(Some(0)), SegmentClass::Unclassified);
        assert_eq!(SegmentClass::classify(None), SegmentClass::Unclassified);
    }

    #[test]
    fn display_position_round_trips_through_json() {
        let place: DisplayPosition = serde_json::from_str("3").unwrap();
        assert_eq!(place, DisplayPosition::Place(3));
        assert_eq!(serde_json::to_string(&place).unwrap(), "3");

        let nc: DisplayPosition = serde_json::from_str("\"NC\"").unwrap();
        assert_eq!(nc, DisplayPosition::NotClassified);
        assert_eq!(serde_json::to_string(&nc).unwrap(), "\"NC\"");

        let dq: DisplayPosition = serde_json::from_str("\"DQ\"").unwrap();
        assert_eq!(dq, DisplayPosition::Disqualified);
    }
}
