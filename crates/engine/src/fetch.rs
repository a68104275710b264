use api_client::error::ApiError;
use api_client::{RequestScheduler, TimingApi};
use chrono::Utc;
use configuration::Settings;
use core_types::{RaceSnapshot, Session};
use reconciler::build_classification;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// How aggressively one pass pulls data from the upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Mitigated endpoints only; suitable for a tight polling loop.
    Conservative,
    /// Complete lap history with extra pacing between endpoints; needed for
    /// classification and head-to-head analysis of historical sessions.
    Full,
}

/// Assembles one [`RaceSnapshot`] from the per-endpoint streams.
///
/// Every request runs under the shared scheduler, and a failed endpoint
/// degrades to an empty collection instead of failing the pass. The
/// snapshot is therefore always produced; its `DataReadiness` projection
/// tells the caller what actually arrived.
pub struct SnapshotFetcher {
    api: Arc<dyn TimingApi>,
    scheduler: Arc<RequestScheduler>,
    settings: Settings,
}

impl SnapshotFetcher {
    pub fn new(
        api: Arc<dyn TimingApi>,
        scheduler: Arc<RequestScheduler>,
        settings: Settings,
    ) -> Self {
        Self {
            api,
            scheduler,
            settings,
        }
    }

    pub async fn fetch(&self, session: &Session, mode: FetchMode) -> RaceSnapshot {
        let key = session.session_key;

        let drivers = recover("drivers", self.scheduler.run(self.api.drivers(key)).await);
        let positions = recover(
            "positions",
            self.scheduler.run(self.api.positions(key)).await,
        );
        let laps = match mode {
            FetchMode::Conservative => recover("laps", self.scheduler.run(self.api.laps(key)).await),
            FetchMode::Full => recover("laps", self.scheduler.run(self.api.all_laps(key)).await),
        };
        self.pace(mode).await;

        let intervals = recover(
            "intervals",
            self.scheduler.run(self.api.intervals(key)).await,
        );
        let stints = recover("stints", self.scheduler.run(self.api.stints(key)).await);
        let pit_stops = recover(
            "pit_stops",
            self.scheduler.run(self.api.pit_stops(key)).await,
        );

        let finished = session.date_end.is_some_and(|end| end <= Utc::now());
        let classification = if finished {
            let disqualified = self.settings.race.disqualified_drivers(key);
            build_classification(&drivers, &laps, &disqualified)
        } else {
            Vec::new()
        };

        // Finished sessions reveal their true distance through the lap data;
        // live ones fall back to the configured default.
        let total_laps = if finished {
            laps.iter()
                .map(|l| l.lap_number)
                .max()
                .or(Some(self.settings.race.default_total_laps))
        } else {
            Some(self.settings.race.default_total_laps)
        };

        RaceSnapshot {
            session: Some(session.clone()),
            drivers,
            positions,
            laps,
            intervals,
            pit_stops,
            stints,
            classification,
            total_laps,
        }
    }

    /// Extra breathing room between endpoint groups during a full fetch.
    async fn pace(&self, mode: FetchMode) {
        if mode == FetchMode::Full {
            tokio::time::sleep(Duration::from_millis(self.settings.polling.endpoint_delay_ms))
                .await;
        }
    }
}

/// An endpoint failure costs that stream, never the snapshot.
fn recover<T>(endpoint: &'static str, result: Result<Vec<T>, ApiError>) -> Vec<T> {
    match result {
        Ok(records) => records,
        Err(error) => {
            warn!(endpoint, %error, "endpoint fetch failed, continuing without it");
            Vec::new()
        }
    }
}
