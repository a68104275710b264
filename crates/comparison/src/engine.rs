use crate::error::ComparisonError;
use crate::report::{ComparisonReport, Metric, MetricComparison, ReportSide};
use core_types::{
    format_lap_time, parse_lap_time, DriverViewRecord, Lap, NO_GAP_DATA, UNPLACED_POSITION,
};

/// Builds the head-to-head report for two reconciled drivers, given each
/// driver's full lap history. Lap-derived metrics come from the histories;
/// the remaining metrics come from the records themselves.
pub fn compare_drivers(
    record_a: &DriverViewRecord,
    record_b: &DriverViewRecord,
    laps_a: &[Lap],
    laps_b: &[Lap],
) -> Result<ComparisonReport, ComparisonError> {
    if record_a.driver_number == record_b.driver_number {
        return Err(ComparisonError::SameDriver(record_a.driver_number));
    }

    let side_a = DriverSide::new(record_a, laps_a);
    let side_b = DriverSide::new(record_b, laps_b);

    let metrics = Metric::ALL
        .iter()
        .map(|&metric| {
            let (value_a, display_a) = side_a.measure(metric);
            let (value_b, display_b) = side_b.measure(metric);
            MetricComparison {
                metric,
                value_a,
                value_b,
                display_a,
                display_b,
                winner: MetricComparison::decide(metric, value_a, value_b),
            }
        })
        .collect();

    Ok(ComparisonReport {
        driver_a: identity(record_a),
        driver_b: identity(record_b),
        metrics,
    })
}

fn identity(record: &DriverViewRecord) -> ReportSide {
    ReportSide {
        driver_number: record.driver_number,
        driver: record.driver.clone(),
        team_name: record.team_name.clone(),
        team_colour: record.team_colour.clone(),
    }
}

struct DriverSide<'a> {
    record: &'a DriverViewRecord,
    laps: &'a [Lap],
}

impl<'a> DriverSide<'a> {
    fn new(record: &'a DriverViewRecord, laps: &'a [Lap]) -> Self {
        Self { record, laps }
    }

    /// The raw value and display string for one metric. A `None` value
    /// always pairs with a `"-"` display.
    fn measure(&self, metric: Metric) -> (Option<f64>, String) {
        match metric {
            Metric::BestLap => {
                // Fall back to the reconciled display when the history got
                // mitigated away upstream.
                let value = self
                    .min_positive(|l| l.lap_duration)
                    .or_else(|| parse_lap_time(&self.record.best_lap));
                lap_time_display(value)
            }
            Metric::AverageLap => lap_time_display(self.mean_positive(|l| l.lap_duration)),
            Metric::Sector1Best => sector_display(self.min_positive(|l| l.duration_sector_1)),
            Metric::Sector2Best => sector_display(self.min_positive(|l| l.duration_sector_2)),
            Metric::Sector3Best => sector_display(self.min_positive(|l| l.duration_sector_3)),
            Metric::TopSpeed => {
                let value = self
                    .max_positive(|l| l.st_speed)
                    .or_else(|| self.record.top_speed.parse().ok());
                speed_display(value, 0)
            }
            Metric::AverageSpeed => speed_display(self.mean_positive(|l| l.st_speed), 1),
            Metric::FinalPosition => {
                if self.record.position == UNPLACED_POSITION {
                    (None, "-".to_string())
                } else {
                    let display = match self.record.display_position {
                        core_types::DisplayPosition::Place(n) => format!("P{n}"),
                        other => other.to_string(),
                    };
                    (Some(f64::from(self.record.position)), display)
                }
            }
            Metric::PitStops => (
                Some(f64::from(self.record.pit)),
                self.record.pit.to_string(),
            ),
            Metric::LapsCompleted => (
                Some(f64::from(self.record.lap_number)),
                self.record.lap_number.to_string(),
            ),
            Metric::GapToLeader => {
                if self.record.leader_gap == NO_GAP_DATA {
                    (None, "-".to_string())
                } else {
                    (Some(self.record.leader_gap), self.record.leader.clone())
                }
            }
        }
    }

    fn min_positive(&self, field: impl Fn(&Lap) -> Option<f64>) -> Option<f64> {
        self.positive_values(field)
            .reduce(|best, v| if v < best { v } else { best })
    }

    fn max_positive(&self, field: impl Fn(&Lap) -> Option<f64>) -> Option<f64> {
        self.positive_values(field)
            .reduce(|best, v| if v > best { v } else { best })
    }

    fn mean_positive(&self, field: impl Fn(&Lap) -> Option<f64>) -> Option<f64> {
        let values: Vec<f64> = self.positive_values(field).collect();
        if values.is_empty() {
            None
        } else {
            Some(values.iter().sum::<f64>() / values.len() as f64)
        }
    }

    fn positive_values<'b>(
        &'b self,
        field: impl Fn(&Lap) -> Option<f64> + 'b,
    ) -> impl Iterator<Item = f64> + 'b {
        self.laps.iter().filter_map(field).filter(|v| *v > 0.0)
    }
}

fn lap_time_display(value: Option<f64>) -> (Option<f64>, String) {
    match value {
        Some(v) => (Some(v), format_lap_time(v)),
        None => (None, "-".to_string()),
    }
}

fn sector_display(value: Option<f64>) -> (Option<f64>, String) {
    match value {
        Some(v) => (Some(v), format!("{v:.3}s")),
        None => (None, "-".to_string()),
    }
}

fn speed_display(value: Option<f64>, decimals: usize) -> (Option<f64>, String) {
    match value {
        Some(v) => (Some(v), format!("{v:.decimals$} km/h")),
        None => (None, "-".to_string()),
    }
}
