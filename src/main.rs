use anyhow::{anyhow, Context};
use api_client::{pick_latest_session, OpenF1Client, RequestScheduler, TimingApi};
use chrono::{Datelike, Utc};
use clap::{Parser, Subcommand};
use configuration::Settings;
use engine::{FetchMode, Orchestrator, Poller};
use reconciler::{sort_records, SortDirection, SortField, SortState};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod render;

/// The main entry point for the Pitwall live-timing dashboard.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let settings = configuration::load_config().context("Failed to load configuration")?;

    let api: Arc<dyn TimingApi> =
        Arc::new(OpenF1Client::new(&settings.api).context("Failed to build the API client")?);
    let scheduler = Arc::new(RequestScheduler::new(
        settings.api.max_in_flight,
        Duration::from_millis(settings.api.batch_delay_ms),
    ));

    match cli.command {
        Commands::Sessions { year } => handle_sessions(api, scheduler, year).await,
        Commands::Snapshot(args) => handle_snapshot(api, scheduler, settings, args).await,
        Commands::Live(args) => handle_live(api, scheduler, settings, args).await,
        Commands::Compare(args) => handle_compare(api, scheduler, settings, args).await,
        Commands::Events { session_key } => handle_events(api, scheduler, session_key).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// A terminal live-timing dashboard for Formula 1 sessions.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the sessions of a championship year.
    Sessions {
        /// The year to list (defaults to the current one).
        #[arg(long)]
        year: Option<i32>,
    },
    /// Render one reconciled leaderboard and exit.
    Snapshot(SnapshotArgs),
    /// Follow a session, refreshing the leaderboard on the polling interval.
    Live(LiveArgs),
    /// Head-to-head comparison of two drivers in one session.
    Compare(CompareArgs),
    /// Race control messages, weather and team radio for a session.
    Events {
        /// Session to inspect; the latest session is picked when omitted.
        #[arg(long)]
        session_key: Option<u64>,
    },
}

#[derive(Parser)]
struct SnapshotArgs {
    /// Session to display; the latest session is picked when omitted.
    #[arg(long)]
    session_key: Option<u64>,

    /// Fetch the complete lap history instead of the mitigated endpoints.
    #[arg(long)]
    full: bool,

    /// Column to sort by (e.g. "position", "best_lap", "gap").
    #[arg(long)]
    sort: Option<SortField>,

    /// Sort descending instead of ascending.
    #[arg(long)]
    desc: bool,

    /// Emit the records as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
struct LiveArgs {
    /// Session to follow; the latest session is picked when omitted.
    #[arg(long)]
    session_key: Option<u64>,

    /// Fetch the complete lap history on every pass.
    #[arg(long)]
    full: bool,
}

#[derive(Parser)]
struct CompareArgs {
    /// First driver's race number.
    driver_a: u32,

    /// Second driver's race number.
    driver_b: u32,

    /// Session to compare in; the latest session is picked when omitted.
    #[arg(long)]
    session_key: Option<u64>,
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn handle_sessions(
    api: Arc<dyn TimingApi>,
    scheduler: Arc<RequestScheduler>,
    year: Option<i32>,
) -> anyhow::Result<()> {
    let year = year.unwrap_or_else(|| Utc::now().year());
    let sessions = scheduler.run(api.sessions(year)).await?;
    if sessions.is_empty() {
        println!("No sessions found for {year}.");
        return Ok(());
    }
    println!("{}", render::sessions_table(&sessions));
    Ok(())
}

async fn handle_snapshot(
    api: Arc<dyn TimingApi>,
    scheduler: Arc<RequestScheduler>,
    settings: Settings,
    args: SnapshotArgs,
) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::new(api, scheduler, settings);
    orchestrator.select_session(args.session_key).await;
    orchestrator.run_pass(fetch_mode(args.full)).await?;

    let mut board = orchestrator.leaderboard().await;
    if let Some(field) = args.sort {
        let direction = if args.desc {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };
        board.records = sort_records(&board.records, SortState::new(field, direction));
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&board.records)?);
    } else {
        render::print_leaderboard(&board);
    }
    Ok(())
}

async fn handle_live(
    api: Arc<dyn TimingApi>,
    scheduler: Arc<RequestScheduler>,
    settings: Settings,
    args: LiveArgs,
) -> anyhow::Result<()> {
    let interval = Duration::from_secs(settings.polling.interval_secs);
    let orchestrator = Arc::new(Orchestrator::new(api, scheduler, settings));
    orchestrator.select_session(args.session_key).await;

    let poller = Poller::start(Arc::clone(&orchestrator), interval, fetch_mode(args.full));
    let mut passes = poller.passes();

    loop {
        tokio::select! {
            changed = passes.changed() => {
                if changed.is_err() {
                    break;
                }
                let board = orchestrator.leaderboard().await;
                // Clear the terminal and redraw in place.
                print!("\x1B[2J\x1B[1;1H");
                render::print_leaderboard(&board);
            }
            _ = tokio::signal::ctrl_c() => {
                poller.stop();
                break;
            }
        }
    }
    Ok(())
}

async fn handle_compare(
    api: Arc<dyn TimingApi>,
    scheduler: Arc<RequestScheduler>,
    settings: Settings,
    args: CompareArgs,
) -> anyhow::Result<()> {
    let session_key = resolve_session_key(&api, &scheduler, args.session_key).await?;

    let all_laps = scheduler.run(api.all_laps(session_key)).await?;

    let orchestrator = Orchestrator::new(api, scheduler, settings);
    orchestrator.select_session(Some(session_key)).await;
    orchestrator.run_pass(FetchMode::Full).await?;
    let board = orchestrator.leaderboard().await;

    let find = |number: u32| {
        board
            .records
            .iter()
            .find(|r| r.driver_number == number)
            .ok_or_else(|| anyhow!("Driver {number} did not take part in session {session_key}"))
    };
    let record_a = find(args.driver_a)?;
    let record_b = find(args.driver_b)?;

    let laps_of = |number: u32| -> Vec<core_types::Lap> {
        all_laps
            .iter()
            .filter(|l| l.driver_number == number)
            .cloned()
            .collect()
    };

    let report = comparison::compare_drivers(
        record_a,
        record_b,
        &laps_of(args.driver_a),
        &laps_of(args.driver_b),
    )?;
    render::print_comparison(&report);
    Ok(())
}

async fn handle_events(
    api: Arc<dyn TimingApi>,
    scheduler: Arc<RequestScheduler>,
    session_key: Option<u64>,
) -> anyhow::Result<()> {
    let session_key = resolve_session_key(&api, &scheduler, session_key).await?;

    let control = scheduler.run(api.race_control(session_key)).await?;
    let weather = scheduler.run(api.weather(session_key)).await?;
    let radio = scheduler.run(api.team_radio(session_key)).await?;

    render::print_events(session_key, &control, &weather, &radio);
    Ok(())
}

/// Uses the explicit key when given, otherwise the latest session of the
/// current championship year.
async fn resolve_session_key(
    api: &Arc<dyn TimingApi>,
    scheduler: &Arc<RequestScheduler>,
    session_key: Option<u64>,
) -> anyhow::Result<u64> {
    match session_key {
        Some(key) => Ok(key),
        None => {
            let now = Utc::now();
            let sessions = scheduler.run(api.sessions(now.year())).await?;
            Ok(pick_latest_session(&sessions, now)
                .ok_or_else(|| anyhow!("No session available"))?
                .session_key)
        }
    }
}

fn fetch_mode(full: bool) -> FetchMode {
    if full {
        FetchMode::Full
    } else {
        FetchMode::Conservative
    }
}
