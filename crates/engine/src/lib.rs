//! # Pitwall Orchestration Engine
//!
//! Owns the fetch-reconcile-publish cycle. One [`Orchestrator`] instance
//! holds the currently followed session and the last published leaderboard;
//! the optional [`poller::Poller`] drives it on an interval for live
//! sessions.
//!
//! A pass that finishes after the user has switched sessions is discarded
//! rather than published, so the leaderboard never flashes data from a
//! session the user already left.

pub mod error;
pub mod fetch;
pub mod poller;

pub use error::EngineError;
pub use fetch::{FetchMode, SnapshotFetcher};
pub use poller::Poller;

use api_client::{pick_latest_session, RequestScheduler, TimingApi};
use chrono::{DateTime, Datelike, Utc};
use configuration::Settings;
use core_types::{DataReadiness, DriverViewRecord, Session};
use reconciler::reconcile;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::info;

/// The published output of the last successful pass.
#[derive(Debug, Clone, Default)]
pub struct Leaderboard {
    pub session: Option<Session>,
    pub records: Vec<DriverViewRecord>,
    pub readiness: DataReadiness,
    pub updated_at: Option<DateTime<Utc>>,
}

/// What became of one reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// The leaderboard was replaced with this pass's output.
    Published,
    /// The followed session changed while the pass was in flight; its
    /// output was discarded.
    Superseded,
}

pub struct Orchestrator {
    api: Arc<dyn TimingApi>,
    scheduler: Arc<RequestScheduler>,
    fetcher: SnapshotFetcher,
    /// The session the user asked to follow; `None` means auto-select.
    selection: Mutex<Option<u64>>,
    published: RwLock<Leaderboard>,
}

impl Orchestrator {
    pub fn new(
        api: Arc<dyn TimingApi>,
        scheduler: Arc<RequestScheduler>,
        settings: Settings,
    ) -> Self {
        let fetcher = SnapshotFetcher::new(Arc::clone(&api), Arc::clone(&scheduler), settings);
        Self {
            api,
            scheduler,
            fetcher,
            selection: Mutex::new(None),
            published: RwLock::new(Leaderboard::default()),
        }
    }

    /// Follows the given session from the next pass on; `None` returns to
    /// automatic selection.
    pub async fn select_session(&self, session_key: Option<u64>) {
        let mut selection = self.selection.lock().await;
        *selection = session_key;
    }

    /// A clone of the last published leaderboard.
    pub async fn leaderboard(&self) -> Leaderboard {
        self.published.read().await.clone()
    }

    /// Runs one fetch-reconcile-publish cycle for the followed session.
    pub async fn run_pass(&self, mode: FetchMode) -> Result<PassOutcome, EngineError> {
        let selected = *self.selection.lock().await;
        let session = self.resolve_session(selected).await?;

        let snapshot = self.fetcher.fetch(&session, mode).await;
        let readiness = DataReadiness::from_snapshot(&snapshot);
        let records = reconcile(&snapshot);

        // The user may have switched sessions while the fetch was running;
        // a stale pass must never overwrite the new session's view.
        if *self.selection.lock().await != selected {
            info!(
                session_key = session.session_key,
                "session changed mid-pass, discarding results"
            );
            return Ok(PassOutcome::Superseded);
        }

        let mut published = self.published.write().await;
        *published = Leaderboard {
            session: Some(session),
            records,
            readiness,
            updated_at: Some(Utc::now()),
        };
        Ok(PassOutcome::Published)
    }

    async fn resolve_session(&self, selected: Option<u64>) -> Result<Session, EngineError> {
        match selected {
            Some(key) => self
                .scheduler
                .run(self.api.session(key))
                .await?
                .ok_or(EngineError::SessionNotFound(key)),
            None => {
                let now = Utc::now();
                let sessions = self.scheduler.run(self.api.sessions(now.year())).await?;
                pick_latest_session(&sessions, now).ok_or(EngineError::NoSession)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_client::error::ApiError;
    use async_trait::async_trait;
    use core_types::{
        Driver, IntervalEntry, Lap, PitStop, PositionEntry, RaceControlEvent, Stint, TeamRadio,
        Weather,
    };
    use std::time::Duration;
    use tokio::sync::Notify;

    pub(crate) fn test_settings() -> Settings {
        configuration::load_config().expect("default settings")
    }

    pub(crate) fn session(key: u64) -> Session {
        Session {
            session_key: key,
            meeting_key: None,
            session_name: Some("Race".to_string()),
            country_name: None,
            circuit_short_name: None,
            year: Some(2025),
            date_start: Some(Utc::now() - chrono::Duration::hours(3)),
            date_end: Some(Utc::now() - chrono::Duration::hours(1)),
        }
    }

    pub(crate) fn driver(number: u32, acronym: &str) -> Driver {
        Driver {
            driver_number: number,
            name_acronym: Some(acronym.to_string()),
            full_name: None,
            team_name: None,
            team_colour: None,
        }
    }

    /// A mock upstream whose driver fetch can be held at a gate, so a test
    /// can change the followed session while a pass is in flight.
    pub(crate) struct MockApi {
        sessions: Vec<Session>,
        drivers: Vec<Driver>,
        entered: Notify,
        gate: Option<Notify>,
    }

    impl MockApi {
        pub(crate) fn new(sessions: Vec<Session>, drivers: Vec<Driver>) -> Self {
            Self {
                sessions,
                drivers,
                entered: Notify::new(),
                gate: None,
            }
        }

        fn gated(mut self) -> Self {
            self.gate = Some(Notify::new());
            self
        }
    }

    #[async_trait]
    impl TimingApi for MockApi {
        async fn sessions(&self, _year: i32) -> Result<Vec<Session>, ApiError> {
            Ok(self.sessions.clone())
        }

        async fn session(&self, session_key: u64) -> Result<Option<Session>, ApiError> {
            Ok(self
                .sessions
                .iter()
                .find(|s| s.session_key == session_key)
                .cloned())
        }

        async fn drivers(&self, _session_key: u64) -> Result<Vec<Driver>, ApiError> {
            self.entered.notify_one();
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            Ok(self.drivers.clone())
        }

        async fn positions(&self, _session_key: u64) -> Result<Vec<PositionEntry>, ApiError> {
            Ok(Vec::new())
        }

        async fn laps(&self, _session_key: u64) -> Result<Vec<Lap>, ApiError> {
            Ok(Vec::new())
        }

        async fn all_laps(&self, _session_key: u64) -> Result<Vec<Lap>, ApiError> {
            Ok(Vec::new())
        }

        async fn intervals(&self, _session_key: u64) -> Result<Vec<IntervalEntry>, ApiError> {
            Ok(Vec::new())
        }

        async fn stints(&self, _session_key: u64) -> Result<Vec<Stint>, ApiError> {
            Ok(Vec::new())
        }

        async fn pit_stops(&self, _session_key: u64) -> Result<Vec<PitStop>, ApiError> {
            Ok(Vec::new())
        }

        async fn weather(&self, _session_key: u64) -> Result<Vec<Weather>, ApiError> {
            Ok(Vec::new())
        }

        async fn team_radio(&self, _session_key: u64) -> Result<Vec<TeamRadio>, ApiError> {
            Ok(Vec::new())
        }

        async fn race_control(&self, _session_key: u64) -> Result<Vec<RaceControlEvent>, ApiError> {
            Ok(Vec::new())
        }
    }

    pub(crate) fn orchestrator(api: Arc<MockApi>) -> Arc<Orchestrator> {
        let scheduler = Arc::new(RequestScheduler::new(3, Duration::from_secs(1)));
        Arc::new(Orchestrator::new(api, scheduler, test_settings()))
    }

    #[tokio::test(start_paused = true)]
    async fn a_pass_publishes_the_reconciled_leaderboard() {
        let api = Arc::new(MockApi::new(
            vec![session(100)],
            vec![driver(1, "VER"), driver(44, "HAM")],
        ));
        let orchestrator = orchestrator(api);

        let outcome = orchestrator.run_pass(FetchMode::Conservative).await.unwrap();
        assert_eq!(outcome, PassOutcome::Published);

        let board = orchestrator.leaderboard().await;
        assert_eq!(board.session.unwrap().session_key, 100);
        assert_eq!(board.records.len(), 2);
        assert!(board.readiness.drivers);
        assert!(!board.readiness.laps);
        assert!(board.updated_at.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn an_explicitly_selected_session_is_followed() {
        let api = Arc::new(MockApi::new(
            vec![session(100), session(200)],
            vec![driver(1, "VER")],
        ));
        let orchestrator = orchestrator(api);

        orchestrator.select_session(Some(200)).await;
        orchestrator.run_pass(FetchMode::Conservative).await.unwrap();

        let board = orchestrator.leaderboard().await;
        assert_eq!(board.session.unwrap().session_key, 200);
    }

    #[tokio::test(start_paused = true)]
    async fn an_unknown_session_key_is_an_error() {
        let api = Arc::new(MockApi::new(vec![session(100)], Vec::new()));
        let orchestrator = orchestrator(api);

        orchestrator.select_session(Some(999)).await;
        let result = orchestrator.run_pass(FetchMode::Conservative).await;
        assert!(matches!(result, Err(EngineError::SessionNotFound(999))));
    }

    #[tokio::test(start_paused = true)]
    async fn a_pass_finishing_after_a_session_switch_is_discarded() {
        let api = Arc::new(
            MockApi::new(vec![session(100), session(200)], vec![driver(1, "VER")]).gated(),
        );
        let orchestrator = orchestrator(Arc::clone(&api));
        orchestrator.select_session(Some(100)).await;

        let in_flight = {
            let orchestrator = Arc::clone(&orchestrator);
            tokio::spawn(async move { orchestrator.run_pass(FetchMode::Conservative).await })
        };

        // Wait until the pass is inside the driver fetch, switch sessions,
        // then let the fetch complete.
        api.entered.notified().await;
        orchestrator.select_session(Some(200)).await;
        if let Some(gate) = &api.gate {
            gate.notify_one();
        }

        let outcome = in_flight.await.unwrap().unwrap();
        assert_eq!(outcome, PassOutcome::Superseded);

        // Nothing was published for the abandoned session.
        let board = orchestrator.leaderboard().await;
        assert!(board.session.is_none());
        assert!(board.records.is_empty());
    }
}
