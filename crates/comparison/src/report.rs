use serde::{Deserialize, Serialize};

/// Which side of a metric is the better one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    LowerWins,
    HigherWins,
}

/// The fixed set of head-to-head metrics, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Metric {
    BestLap,
    AverageLap,
    Sector1Best,
    Sector2Best,
    Sector3Best,
    TopSpeed,
    AverageSpeed,
    FinalPosition,
    PitStops,
    LapsCompleted,
    GapToLeader,
}

impl Metric {
    pub const ALL: [Metric; 11] = [
        Metric::BestLap,
        Metric::AverageLap,
        Metric::Sector1Best,
        Metric::Sector2Best,
        Metric::Sector3Best,
        Metric::TopSpeed,
        Metric::AverageSpeed,
        Metric::FinalPosition,
        Metric::PitStops,
        Metric::LapsCompleted,
        Metric::GapToLeader,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Metric::BestLap => "Best Lap",
            Metric::AverageLap => "Average Lap",
            Metric::Sector1Best => "Best Sector 1",
            Metric::Sector2Best => "Best Sector 2",
            Metric::Sector3Best => "Best Sector 3",
            Metric::TopSpeed => "Top Speed",
            Metric::AverageSpeed => "Average Speed",
            Metric::FinalPosition => "Final Position",
            Metric::PitStops => "Pit Stops",
            Metric::LapsCompleted => "Laps Completed",
            Metric::GapToLeader => "Gap to Leader",
        }
    }

    pub fn polarity(&self) -> Polarity {
        match self {
            Metric::BestLap
            | Metric::AverageLap
            | Metric::Sector1Best
            | Metric::Sector2Best
            | Metric::Sector3Best
            | Metric::FinalPosition
            | Metric::PitStops
            | Metric::GapToLeader => Polarity::LowerWins,
            Metric::TopSpeed | Metric::AverageSpeed | Metric::LapsCompleted => Polarity::HigherWins,
        }
    }
}

/// Who won a single metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    DriverA,
    DriverB,
    Tie,
}

/// One compared metric. `winner` is `None` whenever the metric is
/// unavailable on either side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricComparison {
    pub metric: Metric,
    pub value_a: Option<f64>,
    pub value_b: Option<f64>,
    pub display_a: String,
    pub display_b: String,
    pub winner: Option<Verdict>,
}

impl MetricComparison {
    /// Applies the strict-superiority rule for the metric's polarity.
    pub fn decide(metric: Metric, value_a: Option<f64>, value_b: Option<f64>) -> Option<Verdict> {
        let (a, b) = (value_a?, value_b?);
        if a == b {
            return Some(Verdict::Tie);
        }
        let a_wins = match metric.polarity() {
            Polarity::LowerWins => a < b,
            Polarity::HigherWins => a > b,
        };
        Some(if a_wins { Verdict::DriverA } else { Verdict::DriverB })
    }
}

/// The full head-to-head report for one driver pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub driver_a: ReportSide,
    pub driver_b: ReportSide,
    pub metrics: Vec<MetricComparison>,
}

/// Identity of one side of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSide {
    pub driver_number: u32,
    pub driver: String,
    pub team_name: String,
    pub team_colour: String,
}

impl ComparisonReport {
    /// Net score over the decided metrics: wins for A, wins for B.
    pub fn score(&self) -> (usize, usize) {
        let wins_a = self
            .metrics
            .iter()
            .filter(|m| m.winner == Some(Verdict::DriverA))
            .count();
        let wins_b = self
            .metrics
            .iter()
            .filter(|m| m.winner == Some(Verdict::DriverB))
            .count();
        (wins_a, wins_b)
    }
}
