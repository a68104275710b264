use crate::error::ApiError;
use async_trait::async_trait;
use chrono::Duration;
use configuration::ApiSettings;
use core_types::{
    Driver, IntervalEntry, Lap, PitStop, PositionEntry, RaceControlEvent, Session, Stint,
    TeamRadio, Weather,
};
use serde::de::DeserializeOwned;
use tracing::debug;

pub mod error;
pub mod mitigate;
pub mod scheduler;
pub mod sessions;

// --- Public API ---
pub use scheduler::RequestScheduler;
pub use sessions::{find_active_session, pick_latest_session, upcoming_sessions};

/// The abstract interface to the upstream live-timing API.
/// This trait is the contract the orchestration engine is written against,
/// allowing the underlying implementation (live or mock) to be swapped out.
#[async_trait]
pub trait TimingApi: Send + Sync {
    /// All sessions of a championship year.
    async fn sessions(&self, year: i32) -> Result<Vec<Session>, ApiError>;

    /// A single session by key, if the upstream knows it.
    async fn session(&self, session_key: u64) -> Result<Option<Session>, ApiError>;

    /// The session's driver roster.
    async fn drivers(&self, session_key: u64) -> Result<Vec<Driver>, ApiError>;

    /// Position observations, narrowed to the end of the session where
    /// possible to stay inside the upstream payload budget.
    async fn positions(&self, session_key: u64) -> Result<Vec<PositionEntry>, ApiError>;

    /// Lap records, collapsed to the latest lap per driver when oversized.
    async fn laps(&self, session_key: u64) -> Result<Vec<Lap>, ApiError>;

    /// The complete lap history, unmitigated. Needed for classification and
    /// head-to-head comparison.
    async fn all_laps(&self, session_key: u64) -> Result<Vec<Lap>, ApiError>;

    /// Interval observations, collapsed to the latest per driver when oversized.
    async fn intervals(&self, session_key: u64) -> Result<Vec<IntervalEntry>, ApiError>;

    /// Stint records, collapsed to the latest per driver when oversized.
    async fn stints(&self, session_key: u64) -> Result<Vec<Stint>, ApiError>;

    /// Pit stop events.
    async fn pit_stops(&self, session_key: u64) -> Result<Vec<PitStop>, ApiError>;

    /// Trailing weather observations.
    async fn weather(&self, session_key: u64) -> Result<Vec<Weather>, ApiError>;

    /// Trailing team-radio messages.
    async fn team_radio(&self, session_key: u64) -> Result<Vec<TeamRadio>, ApiError>;

    /// Trailing race-control events.
    async fn race_control(&self, session_key: u64) -> Result<Vec<RaceControlEvent>, ApiError>;
}

/// Trailing weather observations kept per fetch.
const WEATHER_TAIL: usize = 10;
/// Trailing team-radio messages kept per fetch.
const TEAM_RADIO_TAIL: usize = 50;
/// Trailing race-control events kept per fetch.
const RACE_CONTROL_TAIL: usize = 30;
/// Window before the end of a finished session used for final positions.
const POSITION_WINDOW_SECS: i64 = 10;

/// A concrete [`TimingApi`] implementation for the OpenF1 REST API.
#[derive(Clone)]
pub struct OpenF1Client {
    client: reqwest::Client,
    base_url: String,
}

impl OpenF1Client {
    pub fn new(settings: &ApiSettings) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(settings.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path_and_query: &str) -> Result<Vec<T>, ApiError> {
        let url = format!("{}/{}", self.base_url, path_and_query);
        debug!(%url, "issuing upstream request");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            serde_json::from_str::<Vec<T>>(&text)
                .map_err(|e| ApiError::Deserialization(e.to_string()))
        } else {
            Err(ApiError::Status(status.as_u16(), text))
        }
    }

    fn keep_tail<T>(mut records: Vec<T>, tail: usize) -> Vec<T> {
        if records.len() > tail {
            records.drain(..records.len() - tail);
        }
        records
    }
}

#[async_trait]
impl TimingApi for OpenF1Client {
    async fn sessions(&self, year: i32) -> Result<Vec<Session>, ApiError> {
        self.get_json(&format!("sessions?year={year}")).await
    }

    async fn session(&self, session_key: u64) -> Result<Option<Session>, ApiError> {
        let mut found: Vec<Session> = self
            .get_json(&format!("sessions?session_key={session_key}"))
            .await?;
        Ok(if found.is_empty() {
            None
        } else {
            Some(found.swap_remove(0))
        })
    }

    async fn drivers(&self, session_key: u64) -> Result<Vec<Driver>, ApiError> {
        self.get_json(&format!("drivers?session_key={session_key}"))
            .await
    }

    async fn positions(&self, session_key: u64) -> Result<Vec<PositionEntry>, ApiError> {
        // For finished sessions only the final seconds matter; for live ones
        // the upstream has no end date yet, so keep a trailing slice instead.
        let session = self.session(session_key).await?;
        match session.and_then(|s| s.date_end) {
            Some(end) => {
                let from = (end - Duration::seconds(POSITION_WINDOW_SECS))
                    .format("%Y-%m-%dT%H:%M:%S");
                self.get_json(&format!("position?session_key={session_key}&date>={from}"))
                    .await
            }
            None => {
                let positions = self
                    .get_json(&format!("position?session_key={session_key}"))
                    .await?;
                Ok(mitigate::truncate_positions(
                    positions,
                    mitigate::POSITIONS_TAIL,
                ))
            }
        }
    }

    async fn laps(&self, session_key: u64) -> Result<Vec<Lap>, ApiError> {
        let laps = self.all_laps(session_key).await?;
        if laps.len() > mitigate::LAPS_LIMIT {
            Ok(mitigate::latest_laps_per_driver(laps))
        } else {
            Ok(laps)
        }
    }

    async fn all_laps(&self, session_key: u64) -> Result<Vec<Lap>, ApiError> {
        self.get_json(&format!("laps?session_key={session_key}"))
            .await
    }

    async fn intervals(&self, session_key: u64) -> Result<Vec<IntervalEntry>, ApiError> {
        let intervals = self
            .get_json(&format!("intervals?session_key={session_key}"))
            .await?;
        if intervals.len() > mitigate::INTERVALS_LIMIT {
            Ok(mitigate::latest_intervals_per_driver(intervals))
        } else {
            Ok(intervals)
        }
    }

    async fn stints(&self, session_key: u64) -> Result<Vec<Stint>, ApiError> {
        let stints = self
            .get_json(&format!("stints?session_key={session_key}"))
            .await?;
        if stints.len() > mitigate::STINTS_LIMIT {
            Ok(mitigate::latest_stints_per_driver(stints))
        } else {
            Ok(stints)
        }
    }

    async fn pit_stops(&self, session_key: u64) -> Result<Vec<PitStop>, ApiError> {
        self.get_json(&format!("pit?session_key={session_key}"))
            .await
    }

    async fn weather(&self, session_key: u64) -> Result<Vec<Weather>, ApiError> {
        let weather = self
            .get_json(&format!("weather?session_key={session_key}"))
            .await?;
        Ok(Self::keep_tail(weather, WEATHER_TAIL))
    }

    async fn team_radio(&self, session_key: u64) -> Result<Vec<TeamRadio>, ApiError> {
        let radio = self
            .get_json(&format!("team_radio?session_key={session_key}"))
            .await?;
        Ok(Self::keep_tail(radio, TEAM_RADIO_TAIL))
    }

    async fn race_control(&self, session_key: u64) -> Result<Vec<RaceControlEvent>, ApiError> {
        let events = self
            .get_json(&format!("race_control?session_key={session_key}"))
            .await?;
        Ok(Self::keep_tail(events, RACE_CONTROL_TAIL))
    }
}
