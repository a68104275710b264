use core_types::{
    format_lap_time, format_sector_time, ClassificationEntry, DisplayPosition, Driver,
    DriverStatus, DriverViewRecord, Gap, IntervalEntry, Lap, MiniSector, PositionEntry,
    RaceSnapshot, Stint, DEFAULT_COMPOUND, NO_GAP_DATA, UNPLACED_POSITION,
};
use std::collections::{HashMap, HashSet};

/// Reconciles the raw per-endpoint streams of a snapshot into one ranked
/// set of per-driver view records.
///
/// The driver roster is the join spine: exactly one record is produced per
/// distinct driver number in `snapshot.drivers`, and records from the other
/// streams that reference an unknown driver are dropped. Every lookup is
/// null-safe; absent data degrades to the documented sentinels rather than
/// failing the pass.
pub fn reconcile(snapshot: &RaceSnapshot) -> Vec<DriverViewRecord> {
    let registry = dedup_drivers(&snapshot.drivers);
    if registry.is_empty() {
        return Vec::new();
    }

    let classification = index_classification(&snapshot.classification);
    let latest_positions = latest_position_per_driver(&snapshot.positions);
    let latest_laps = latest_lap_per_driver(&snapshot.laps);
    let best_laps = best_lap_per_driver(&snapshot.laps);
    let latest_intervals = latest_interval_per_driver(&snapshot.intervals);
    let current_stints = current_stint_per_driver(&snapshot.stints);
    let pit_counts = pit_counts_per_driver(snapshot);
    let finish_threshold = finish_threshold(snapshot);

    let mut records: Vec<DriverViewRecord> = registry
        .iter()
        .map(|driver| {
            build_record(
                driver,
                classification.get(&driver.driver_number).copied(),
                latest_positions.get(&driver.driver_number).copied(),
                latest_laps.get(&driver.driver_number).copied(),
                best_laps.get(&driver.driver_number).copied(),
                latest_intervals.get(&driver.driver_number).copied(),
                current_stints.get(&driver.driver_number).copied(),
                pit_counts
                    .get(&driver.driver_number)
                    .copied()
                    .unwrap_or(0),
                finish_threshold,
            )
        })
        .collect();

    rank(&mut records);
    records
}

/// First occurrence wins when the roster carries duplicates.
fn dedup_drivers(drivers: &[Driver]) -> Vec<&Driver> {
    let mut seen = HashSet::new();
    drivers
        .iter()
        .filter(|d| seen.insert(d.driver_number))
        .collect()
}

fn index_classification(
    classification: &[ClassificationEntry],
) -> HashMap<u32, &ClassificationEntry> {
    classification.iter().map(|c| (c.driver_number, c)).collect()
}

/// Latest observation per driver by timestamp. On an exact timestamp tie
/// the record later in input order wins (stable fold).
fn latest_position_per_driver(positions: &[PositionEntry]) -> HashMap<u32, &PositionEntry> {
    let mut latest: HashMap<u32, &PositionEntry> = HashMap::new();
    for entry in positions {
        match latest.get(&entry.driver_number) {
            Some(kept) if kept.date > entry.date => {}
            _ => {
                latest.insert(entry.driver_number, entry);
            }
        }
    }
    latest
}

fn latest_interval_per_driver(intervals: &[IntervalEntry]) -> HashMap<u32, &IntervalEntry> {
    let mut latest: HashMap<u32, &IntervalEntry> = HashMap::new();
    for entry in intervals {
        match latest.get(&entry.driver_number) {
            Some(kept) if kept.date > entry.date => {}
            _ => {
                latest.insert(entry.driver_number, entry);
            }
        }
    }
    latest
}

fn latest_lap_per_driver(laps: &[Lap]) -> HashMap<u32, &Lap> {
    let mut latest: HashMap<u32, &Lap> = HashMap::new();
    for lap in laps {
        match latest.get(&lap.driver_number) {
            Some(kept) if kept.lap_number > lap.lap_number => {}
            _ => {
                latest.insert(lap.driver_number, lap);
            }
        }
    }
    latest
}

/// The lap with the minimum positive duration per driver, computed
/// independently of the latest-lap projection.
fn best_lap_per_driver(laps: &[Lap]) -> HashMap<u32, &Lap> {
    let mut best: HashMap<u32, &Lap> = HashMap::new();
    for lap in laps {
        let Some(duration) = lap.lap_duration else {
            continue;
        };
        if duration <= 0.0 {
            continue;
        }
        match best.get(&lap.driver_number) {
            Some(kept) if kept.lap_duration.unwrap_or(f64::MAX) <= duration => {}
            _ => {
                best.insert(lap.driver_number, lap);
            }
        }
    }
    best
}

fn current_stint_per_driver(stints: &[Stint]) -> HashMap<u32, &Stint> {
    let mut current: HashMap<u32, &Stint> = HashMap::new();
    for stint in stints {
        match current.get(&stint.driver_number) {
            Some(kept) if kept.stint_number > stint.stint_number => {}
            _ => {
                current.insert(stint.driver_number, stint);
            }
        }
    }
    current
}

/// Pit stops are counted as occurrences, never deduplicated.
fn pit_counts_per_driver(snapshot: &RaceSnapshot) -> HashMap<u32, u32> {
    let mut counts: HashMap<u32, u32> = HashMap::new();
    for stop in &snapshot.pit_stops {
        *counts.entry(stop.driver_number).or_insert(0) += 1;
    }
    counts
}

/// The lap count that separates a finisher from a DNF. Prefers the
/// session's known total; otherwise the deepest lap anyone reached.
fn finish_threshold(snapshot: &RaceSnapshot) -> u32 {
    snapshot.total_laps.unwrap_or_else(|| {
        snapshot
            .laps
            .iter()
            .map(|l| l.lap_number)
            .max()
            .unwrap_or(0)
    })
}

#[allow(clippy::too_many_arguments)]
fn build_record(
    driver: &Driver,
    classification: Option<&ClassificationEntry>,
    position: Option<&PositionEntry>,
    last_lap: Option<&Lap>,
    best_lap: Option<&Lap>,
    interval: Option<&IntervalEntry>,
    stint: Option<&Stint>,
    pit: u32,
    finish_threshold: u32,
) -> DriverViewRecord {
    let lap_count = last_lap.map(|l| l.lap_number).unwrap_or(0);
    let live_position = position.map(|p| p.position).unwrap_or(UNPLACED_POSITION);

    // Status resolution, in priority order: the final classification is
    // authoritative; otherwise the lap count decides between a projected
    // DNF and a live-classified driver.
    let (status, display_position, rank_position) = match classification {
        Some(entry) => (entry.status, entry.display_position, entry.position),
        None if lap_count == 0 || lap_count < finish_threshold => {
            (DriverStatus::Dnf, DisplayPosition::NotClassified, live_position)
        }
        None => (
            DriverStatus::Classified,
            DisplayPosition::Place(live_position),
            live_position,
        ),
    };

    let (leader, leader_gap) = leader_fields(interval);

    DriverViewRecord {
        position: rank_position,
        display_position,
        status,
        driver_number: driver.driver_number,
        driver: driver
            .name_acronym
            .clone()
            .or_else(|| driver.full_name.clone())
            .unwrap_or_else(|| "N/A".to_string()),
        team_name: driver
            .team_name
            .clone()
            .unwrap_or_else(|| "N/A".to_string()),
        team_colour: driver
            .team_colour
            .clone()
            .unwrap_or_else(|| "FFFFFF".to_string()),
        leader,
        leader_gap,
        tyre: stint
            .and_then(|s| s.compound.clone())
            .unwrap_or_else(|| DEFAULT_COMPOUND.to_string()),
        best_lap: best_lap
            .and_then(|l| l.lap_duration)
            .map(format_lap_time)
            .unwrap_or_else(|| "-".to_string()),
        interval: interval_field(interval),
        last_lap: last_lap
            .and_then(|l| l.lap_duration)
            .map(format_lap_time)
            .unwrap_or_else(|| "-".to_string()),
        mini_sectors: mini_sectors(last_lap),
        sector1: format_sector_time(last_lap.and_then(|l| l.duration_sector_1)),
        sector2: format_sector_time(last_lap.and_then(|l| l.duration_sector_2)),
        sector3: format_sector_time(last_lap.and_then(|l| l.duration_sector_3)),
        last_sector: format_sector_time(last_lap.and_then(|l| l.duration_sector_3)),
        pit,
        top_speed: last_lap
            .and_then(|l| l.st_speed)
            .map(|v| format!("{v}"))
            .unwrap_or_else(|| "-".to_string()),
        lap_number: lap_count,
        finished: status.is_finished(),
    }
}

/// Formats the gap to the leader and resolves its raw numeric value.
///
/// No interval record at all means no data (`"-"`, sentinel); a null or
/// zero gap marks the leader; a string gap is already formatted upstream
/// and passes through with the no-data numeric sentinel.
fn leader_fields(interval: Option<&IntervalEntry>) -> (String, f64) {
    let Some(entry) = interval else {
        return ("-".to_string(), NO_GAP_DATA);
    };
    match &entry.gap_to_leader {
        None => ("LEADER".to_string(), 0.0),
        Some(Gap::Seconds(s)) if *s == 0.0 => ("LEADER".to_string(), 0.0),
        Some(Gap::Seconds(s)) => (format!("+{s:.3}"), *s),
        Some(Gap::Laps(text)) => (text.clone(), NO_GAP_DATA),
    }
}

fn interval_field(interval: Option<&IntervalEntry>) -> String {
    match interval.and_then(|i| i.interval.as_ref()) {
        Some(Gap::Seconds(s)) if *s > 0.0 => format!("{s:.3}"),
        Some(Gap::Laps(text)) => text.clone(),
        _ => "-".to_string(),
    }
}

/// Concatenates the three sector segment arrays of the latest lap, in
/// sector order, into one classified sequence. Null or zero segments stay
/// in the sequence as unclassified gaps.
fn mini_sectors(lap: Option<&Lap>) -> Vec<MiniSector> {
    let Some(lap) = lap else {
        return Vec::new();
    };
    [
        &lap.segments_sector_1,
        &lap.segments_sector_2,
        &lap.segments_sector_3,
    ]
    .into_iter()
    .flatten()
    .flat_map(|segments| segments.iter().copied())
    .map(MiniSector::new)
    .collect()
}

/// Default ranking: position ascending, with unplaced drivers trailing,
/// ordered among themselves by lap count descending then driver number.
fn rank(records: &mut [DriverViewRecord]) {
    records.sort_by(|a, b| {
        match (a.position == UNPLACED_POSITION, b.position == UNPLACED_POSITION) {
            (true, false) => std::cmp::Ordering::Greater,
            (false, true) => std::cmp::Ordering::Less,
            (true, true) => b
                .lap_number
                .cmp(&a.lap_number)
                .then(a.driver_number.cmp(&b.driver_number)),
            (false, false) => a.position.cmp(&b.position),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn date(secs: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 23, 14, 0, 0).unwrap() + chrono::Duration::seconds(secs as i64)
    }

    fn driver(number: u32, acronym: &str) -> Driver {
        Driver {
            driver_number: number,
            name_acronym: Some(acronym.to_string()),
            full_name: None,
            team_name: Some("Test Racing".to_string()),
            team_colour: Some("3671C6".to_string()),
        }
    }

    fn position(number: u32, place: u32, at: u32) -> PositionEntry {
        PositionEntry {
            driver_number: number,
            position: place,
            date: date(at),
        }
    }

    fn lap(number: u32, lap_number: u32, duration: Option<f64>) -> Lap {
        Lap {
            driver_number: number,
            lap_number,
            lap_duration: duration,
            duration_sector_1: None,
            duration_sector_2: None,
            duration_sector_3: None,
            segments_sector_1: None,
            segments_sector_2: None,
            segments_sector_3: None,
            st_speed: None,
            date_start: None,
        }
    }

    fn interval(number: u32, gap: Option<Gap>, at: u32) -> IntervalEntry {
        IntervalEntry {
            driver_number: number,
            gap_to_leader: gap,
            interval: None,
            date: date(at),
        }
    }

    fn snapshot(drivers: Vec<Driver>) -> RaceSnapshot {
        RaceSnapshot {
            drivers,
            ..RaceSnapshot::default()
        }
    }

    #[test]
    fn one_record_per_distinct_driver() {
        let mut snap = snapshot(vec![driver(1, "VER"), driver(1, "DUP"), driver(44, "HAM")]);
        snap.positions = vec![position(1, 1, 0), position(44, 2, 0)];
        snap.total_laps = Some(0);

        let records = reconcile(&snap);
        assert_eq!(records.len(), 2);
        // First occurrence wins for duplicate roster entries.
        assert_eq!(records[0].driver, "VER");
    }

    #[test]
    fn records_for_unknown_drivers_are_dropped() {
        let mut snap = snapshot(vec![driver(1, "VER")]);
        snap.positions = vec![position(1, 1, 0), position(99, 2, 0)];
        snap.total_laps = Some(0);

        let records = reconcile(&snap);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].driver_number, 1);
    }

    #[test]
    fn latest_position_wins_and_ties_go_to_last_in_input_order() {
        let mut snap = snapshot(vec![driver(1, "VER")]);
        snap.positions = vec![
            position(1, 5, 10),
            position(1, 3, 30),
            position(1, 2, 20),
            position(1, 4, 30), // same timestamp as the 3; later in input
        ];
        snap.total_laps = Some(0);

        let records = reconcile(&snap);
        assert_eq!(records[0].position, 4);
    }

    #[test]
    fn latest_wins_folds_are_input_order_insensitive() {
        let mut snap = snapshot(vec![driver(1, "VER"), driver(44, "HAM")]);
        snap.positions = vec![
            position(1, 3, 10),
            position(44, 5, 10),
            position(1, 1, 40),
            position(44, 2, 40),
        ];
        snap.total_laps = Some(0);

        let forward = reconcile(&snap);
        snap.positions.reverse();
        // Reversing changes which record is "last in order", but here the
        // timestamps differ so the latest observation still wins.
        let backward = reconcile(&snap);
        assert_eq!(forward, backward);
    }

    #[test]
    fn reconcile_is_idempotent() {
        let mut snap = snapshot(vec![driver(1, "VER"), driver(44, "HAM"), driver(16, "LEC")]);
        snap.positions = vec![position(1, 1, 5), position(44, 2, 5)];
        snap.laps = vec![
            lap(1, 50, Some(91.2)),
            lap(44, 50, Some(92.0)),
            lap(16, 12, Some(93.5)),
        ];
        snap.intervals = vec![
            interval(1, Some(Gap::Seconds(0.0)), 9),
            interval(44, Some(Gap::Seconds(1.5)), 9),
        ];
        snap.total_laps = Some(50);

        assert_eq!(reconcile(&snap), reconcile(&snap));
    }

    #[test]
    fn best_and_last_lap_are_independent_projections() {
        let mut snap = snapshot(vec![driver(1, "VER")]);
        snap.laps = vec![
            lap(1, 1, Some(95.0)),
            lap(1, 2, Some(90.5)),
            lap(1, 3, Some(96.321)),
        ];
        snap.total_laps = Some(3);

        let records = reconcile(&snap);
        assert_eq!(records[0].best_lap, "1:30.500");
        assert_eq!(records[0].last_lap, "1:36.321");
        assert_eq!(records[0].lap_number, 3);
    }

    #[test]
    fn non_positive_durations_never_count_as_best_laps() {
        let mut snap = snapshot(vec![driver(1, "VER")]);
        snap.laps = vec![lap(1, 1, Some(0.0)), lap(1, 2, None), lap(1, 3, Some(92.0))];
        snap.total_laps = Some(3);

        let records = reconcile(&snap);
        assert_eq!(records[0].best_lap, "1:32.000");
    }

    #[test]
    fn basic_ranking_with_unplaced_tail() {
        let mut snap = snapshot(vec![
            driver(1, "VER"),
            driver(2, "SAR"),
            driver(44, "HAM"),
            driver(16, "LEC"),
        ]);
        snap.positions = vec![position(1, 2, 0), position(2, 1, 0)];
        snap.laps = vec![
            lap(1, 50, Some(91.0)),
            lap(2, 50, Some(91.5)),
            lap(44, 10, Some(94.0)),
            lap(16, 20, Some(93.0)),
        ];
        snap.total_laps = Some(50);

        let order: Vec<u32> = reconcile(&snap).iter().map(|r| r.driver_number).collect();
        assert_eq!(order, vec![2, 1, 16, 44]);
    }

    #[test]
    fn classification_overrides_contradicting_live_data() {
        let mut snap = snapshot(vec![driver(44, "HAM")]);
        snap.positions = vec![position(44, 3, 0)];
        snap.laps = vec![lap(44, 50, Some(91.0))];
        snap.classification = vec![ClassificationEntry {
            driver_number: 44,
            position: 19,
            display_position: DisplayPosition::Disqualified,
            status: DriverStatus::Dsq,
            lap_number: 50,
            date_start: None,
        }];
        snap.total_laps = Some(50);

        let records = reconcile(&snap);
        assert_eq!(records[0].status, DriverStatus::Dsq);
        assert_eq!(records[0].display_position, DisplayPosition::Disqualified);
        assert_eq!(records[0].position, 19);
        assert!(!records[0].finished);
    }

    #[test]
    fn zero_laps_without_classification_is_a_dnf() {
        let snap = snapshot(vec![driver(30, "LAW")]);

        let records = reconcile(&snap);
        assert_eq!(records[0].status, DriverStatus::Dnf);
        assert_eq!(records[0].display_position, DisplayPosition::NotClassified);
        assert_eq!(records[0].position, UNPLACED_POSITION);
    }

    #[test]
    fn short_lap_counts_project_a_dnf_against_the_session_distance() {
        let mut snap = snapshot(vec![driver(1, "VER"), driver(44, "HAM")]);
        snap.laps = vec![lap(1, 58, Some(91.0)), lap(44, 23, Some(92.0))];
        snap.positions = vec![position(1, 1, 0)];
        snap.total_laps = Some(58);

        let records = reconcile(&snap);
        let ver = records.iter().find(|r| r.driver_number == 1).unwrap();
        let ham = records.iter().find(|r| r.driver_number == 44).unwrap();
        assert_eq!(ver.status, DriverStatus::Classified);
        assert_eq!(ver.display_position, DisplayPosition::Place(1));
        assert_eq!(ham.status, DriverStatus::Dnf);
        assert_eq!(ham.display_position, DisplayPosition::NotClassified);
    }

    #[test]
    fn finish_threshold_falls_back_to_deepest_observed_lap() {
        let mut snap = snapshot(vec![driver(1, "VER"), driver(44, "HAM")]);
        snap.laps = vec![lap(1, 57, Some(91.0)), lap(44, 57, Some(92.0))];
        snap.positions = vec![position(1, 1, 0), position(44, 2, 0)];

        let records = reconcile(&snap);
        assert!(records.iter().all(|r| r.status == DriverStatus::Classified));
    }

    #[test]
    fn leader_gap_formatting_covers_all_shapes() {
        let mut snap = snapshot(vec![
        driver(1, "VER"),
            driver(44, "HAM"),
            driver(2, "SAR"),
            driver(30, "LAW"),
        ]);
        snap.intervals = vec![
            interval(1, None, 0),
            interval(44, Some(Gap::Seconds(12.3456)), 0),
            interval(2, Some(Gap::Laps("+1 LAP".to_string())), 0),
        ];
        snap.total_laps = Some(0);

        let records = reconcile(&snap);
        let by_number = |n: u32| records.iter().find(|r| r.driver_number == n).unwrap();

        assert_eq!(by_number(1).leader, "LEADER");
        assert_eq!(by_number(1).leader_gap, 0.0);
        assert_eq!(by_number(44).leader, "+12.346");
        assert!((by_number(44).leader_gap - 12.3456).abs() < 1e-9);
        assert_eq!(by_number(2).leader, "+1 LAP");
        assert_eq!(by_number(2).leader_gap, NO_GAP_DATA);
        assert_eq!(by_number(30).leader, "-");
        assert_eq!(by_number(30).leader_gap, NO_GAP_DATA);
    }

    #[test]
    fn mini_sectors_concatenate_in_sector_order() {
        let mut snap = snapshot(vec![driver(1, "VER")]);
        let mut fast_lap = lap(1, 10, Some(91.0));
        fast_lap.segments_sector_1 = Some(vec![Some(2051), Some(2049)]);
        fast_lap.segments_sector_2 = Some(vec![Some(2048), None]);
        fast_lap.segments_sector_3 = Some(vec![Some(1800), Some(0)]);
        snap.laps = vec![fast_lap];
        snap.total_laps = Some(10);

        let records = reconcile(&snap);
        let classes: Vec<core_types::SegmentClass> =
            records[0].mini_sectors.iter().map(|m| m.class).collect();
        use core_types::SegmentClass::*;
        assert_eq!(
            classes,
            vec![BestOverall, PersonalBest, Slow, Unclassified, Normal, Unclassified]
        );
    }

    #[test]
    fn missing_streams_degrade_to_defaults() {
        let snap = snapshot(vec![driver(1, "VER")]);

        let records = reconcile(&snap);
        let record = &records[0];
        assert_eq!(record.tyre, DEFAULT_COMPOUND);
        assert_eq!(record.best_lap, "-");
        assert_eq!(record.last_lap, "-");
        assert_eq!(record.sector1, "-");
        assert_eq!(record.top_speed, "-");
        assert_eq!(record.pit, 0);
        assert!(record.mini_sectors.is_empty());
    }

    #[test]
    fn current_stint_and_pit_counts() {
        let mut snap = snapshot(vec![driver(1, "VER")]);
        snap.stints = vec![
            Stint {
                driver_number: 1,
                stint_number: 1,
                compound: Some("MEDIUM".to_string()),
            },
            Stint {
                driver_number: 1,
                stint_number: 3,
                compound: Some("HARD".to_string()),
            },
            Stint {
                driver_number: 1,
                stint_number: 2,
                compound: Some("SOFT".to_string()),
            },
        ];
        snap.pit_stops = vec![
            core_types::PitStop { driver_number: 1 },
            core_types::PitStop { driver_number: 1 },
        ];
        snap.total_laps = Some(0);

        let records = reconcile(&snap);
        assert_eq!(records[0].tyre, "HARD");
        assert_eq!(records[0].pit, 2);
    }
}
