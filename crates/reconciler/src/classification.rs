use core_types::{ClassificationEntry, DisplayPosition, Driver, DriverStatus, Lap};
use std::collections::HashMap;

/// Derives a final classification from the complete lap history.
///
/// Finishers are the drivers who completed the deepest lap anyone reached,
/// ordered by when they started it. Retirements rank by how far they got,
/// non-starters and disqualified drivers close the order. Positions are
/// assigned sequentially over the concatenated groups, so the output is
/// total over `drivers` even when the timing data is patchy.
///
/// `disqualified` lists the driver numbers excluded from the results by the
/// stewards; the lap data alone cannot express a disqualification.
pub fn build_classification(
    drivers: &[Driver],
    laps: &[Lap],
    disqualified: &[u32],
) -> Vec<ClassificationEntry> {
    if laps.is_empty() {
        return Vec::new();
    }

    let max_lap = laps.iter().map(|l| l.lap_number).max().unwrap_or(0);
    let last_laps = last_lap_per_driver(laps);

    let mut finishers: Vec<&Driver> = Vec::new();
    let mut retirements: Vec<&Driver> = Vec::new();
    let mut non_starters: Vec<&Driver> = Vec::new();
    let mut excluded: Vec<&Driver> = Vec::new();

    for driver in drivers {
        if disqualified.contains(&driver.driver_number) {
            excluded.push(driver);
            continue;
        }
        match last_laps.get(&driver.driver_number) {
            Some(lap) if lap.lap_number == max_lap => finishers.push(driver),
            Some(lap) if lap.lap_number > 0 => retirements.push(driver),
            _ => non_starters.push(driver),
        }
    }

    // Finishing order is the order the leaders' final lap began.
    finishers.sort_by_key(|d| last_laps.get(&d.driver_number).and_then(|l| l.date_start));
    retirements.sort_by(|a, b| {
        let lap_a = last_laps.get(&a.driver_number);
        let lap_b = last_laps.get(&b.driver_number);
        let laps_a = lap_a.map(|l| l.lap_number).unwrap_or(0);
        let laps_b = lap_b.map(|l| l.lap_number).unwrap_or(0);
        laps_b
            .cmp(&laps_a)
            .then_with(|| {
                let date_a = lap_a.and_then(|l| l.date_start);
                let date_b = lap_b.and_then(|l| l.date_start);
                date_b.cmp(&date_a)
            })
    });
    non_starters.sort_by_key(|d| d.driver_number);
    excluded.sort_by_key(|d| d.driver_number);

    let mut entries = Vec::with_capacity(drivers.len());
    let mut next_position = 1u32;
    let mut push = |entries: &mut Vec<ClassificationEntry>, driver: &Driver, status: DriverStatus| {
        let last_lap = last_laps.get(&driver.driver_number);
        let position = next_position;
        next_position += 1;
        entries.push(ClassificationEntry {
            driver_number: driver.driver_number,
            position,
            display_position: match status {
                DriverStatus::Classified => DisplayPosition::Place(position),
                DriverStatus::Dnf => DisplayPosition::NotClassified,
                DriverStatus::Dsq => DisplayPosition::Disqualified,
            },
            status,
            lap_number: last_lap.map(|l| l.lap_number).unwrap_or(0),
            date_start: last_lap.and_then(|l| l.date_start),
        });
    };

    for driver in finishers {
        push(&mut entries, driver, DriverStatus::Classified);
    }
    for driver in retirements.iter().chain(&non_starters) {
        push(&mut entries, driver, DriverStatus::Dnf);
    }
    for driver in excluded {
        push(&mut entries, driver, DriverStatus::Dsq);
    }

    entries
}

/// Deepest lap per driver; ties on lap number keep the later record.
fn last_lap_per_driver(laps: &[Lap]) -> HashMap<u32, &Lap> {
    let mut last: HashMap<u32, &Lap> = HashMap::new();
    for lap in laps {
        match last.get(&lap.driver_number) {
            Some(kept) if kept.lap_number > lap.lap_number => {}
            _ => {
                last.insert(lap.driver_number, lap);
            }
        }
    }
    last
}
