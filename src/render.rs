use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Table};
use comparison::{ComparisonReport, Verdict};
use core_types::{DriverViewRecord, RaceControlEvent, SegmentClass, Session, TeamRadio, Weather};
use engine::Leaderboard;

/// Prints the session header, a degraded-data banner when streams are
/// missing, and the leaderboard table.
pub fn print_leaderboard(board: &Leaderboard) {
    if let Some(session) = &board.session {
        println!("{}", session_title(session));
    }
    if !board.readiness.is_complete() {
        println!(
            "⚠ incomplete data, missing: {}",
            board.readiness.missing().join(", ")
        );
    }
    if let Some(updated) = board.updated_at {
        println!("updated {}", updated.format("%H:%M:%S UTC"));
    }
    println!("{}", leaderboard_table(&board.records));
}

fn session_title(session: &Session) -> String {
    let name = session.session_name.as_deref().unwrap_or("Session");
    let place = session
        .circuit_short_name
        .as_deref()
        .or(session.country_name.as_deref())
        .unwrap_or("?");
    format!("{} · {} (session {})", name, place, session.session_key)
}

pub fn leaderboard_table(records: &[DriverViewRecord]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "P", "Driver", "Team", "Tyre", "Gap", "Int", "Last Lap", "Best Lap", "S1", "S2", "S3",
            "Mini Sectors", "Pit", "Spd", "Lap", "Status",
        ]);

    for record in records {
        table.add_row(vec![
            Cell::new(record.display_position),
            Cell::new(&record.driver),
            Cell::new(&record.team_name),
            Cell::new(&record.tyre).fg(tyre_color(&record.tyre)),
            Cell::new(&record.leader),
            Cell::new(&record.interval),
            Cell::new(&record.last_lap),
            Cell::new(&record.best_lap),
            Cell::new(&record.sector1),
            Cell::new(&record.sector2),
            Cell::new(&record.sector3),
            Cell::new(mini_sector_trace(record)),
            Cell::new(record.pit),
            Cell::new(&record.top_speed),
            Cell::new(record.lap_number),
            Cell::new(record.status),
        ]);
    }
    table
}

fn tyre_color(compound: &str) -> Color {
    match compound {
        "SOFT" => Color::Red,
        "MEDIUM" => Color::Yellow,
        "HARD" => Color::White,
        "INTERMEDIATE" => Color::Green,
        "WET" => Color::Blue,
        _ => Color::Grey,
    }
}

/// One character per mini-sector of the latest lap:
/// `#` session best, `+` personal best, `~` slow, `=` on pace, `.` untimed.
fn mini_sector_trace(record: &DriverViewRecord) -> String {
    record
        .mini_sectors
        .iter()
        .map(|m| match m.class {
            SegmentClass::BestOverall => '#',
            SegmentClass::PersonalBest => '+',
            SegmentClass::Slow => '~',
            SegmentClass::Normal => '=',
            SegmentClass::Unclassified => '.',
        })
        .collect()
}

pub fn sessions_table(sessions: &[Session]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Key", "Session", "Country", "Circuit", "Starts"]);

    for session in sessions {
        table.add_row(vec![
            Cell::new(session.session_key),
            Cell::new(session.session_name.as_deref().unwrap_or("-")),
            Cell::new(session.country_name.as_deref().unwrap_or("-")),
            Cell::new(session.circuit_short_name.as_deref().unwrap_or("-")),
            Cell::new(
                session
                    .date_start
                    .map(|d| d.format("%Y-%m-%d %H:%M UTC").to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
        ]);
    }
    table
}

/// Plain pass-through rendering of the session's side channels.
pub fn print_events(
    session_key: u64,
    control: &[RaceControlEvent],
    weather: &[Weather],
    radio: &[TeamRadio],
) {
    println!("Session {session_key}");

    if let Some(latest) = weather.last() {
        println!(
            "Weather: air {}  track {}  humidity {}  wind {}  rain {}",
            celsius(latest.air_temperature),
            celsius(latest.track_temperature),
            percent(latest.humidity),
            latest
                .wind_speed
                .map(|v| format!("{v:.1} m/s"))
                .unwrap_or_else(|| "-".to_string()),
            latest
                .rainfall
                .map(|v| format!("{v}"))
                .unwrap_or_else(|| "-".to_string()),
        );
    }

    if control.is_empty() {
        println!("No race control messages.");
    } else {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["Time", "Category", "Flag", "Message"]);
        for event in control {
            table.add_row(vec![
                Cell::new(
                    event
                        .date
                        .map(|d| d.format("%H:%M:%S").to_string())
                        .unwrap_or_else(|| "-".to_string()),
                ),
                Cell::new(event.category.as_deref().unwrap_or("-")),
                Cell::new(event.flag.as_deref().unwrap_or("-")),
                Cell::new(event.message.as_deref().unwrap_or("-")),
            ]);
        }
        println!("{table}");
    }

    if !radio.is_empty() {
        println!("Team radio ({} messages):", radio.len());
        for message in radio {
            println!(
                "  #{} {} {}",
                message.driver_number,
                message
                    .date
                    .map(|d| d.format("%H:%M:%S").to_string())
                    .unwrap_or_else(|| "-".to_string()),
                message.recording_url.as_deref().unwrap_or("-"),
            );
        }
    }
}

fn celsius(value: Option<f64>) -> String {
    value
        .map(|v| format!("{v:.1}°C"))
        .unwrap_or_else(|| "-".to_string())
}

fn percent(value: Option<f64>) -> String {
    value
        .map(|v| format!("{v:.0}%"))
        .unwrap_or_else(|| "-".to_string())
}

pub fn print_comparison(report: &ComparisonReport) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "Metric",
            report.driver_a.driver.as_str(),
            report.driver_b.driver.as_str(),
            "Verdict",
        ]);

    for metric in &report.metrics {
        let (verdict, color) = match metric.winner {
            Some(Verdict::DriverA) => (report.driver_a.driver.as_str(), Color::Green),
            Some(Verdict::DriverB) => (report.driver_b.driver.as_str(), Color::Green),
            Some(Verdict::Tie) => ("tie", Color::Yellow),
            None => ("-", Color::Grey),
        };
        table.add_row(vec![
            Cell::new(metric.metric.label()),
            Cell::new(&metric.display_a),
            Cell::new(&metric.display_b),
            Cell::new(verdict).fg(color),
        ]);
    }
    println!("{table}");

    let (wins_a, wins_b) = report.score();
    println!(
        "{} {} - {} {}",
        report.driver_a.driver, wins_a, wins_b, report.driver_b.driver
    );
}
