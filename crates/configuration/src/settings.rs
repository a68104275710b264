use serde::Deserialize;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub api: ApiSettings,
    pub polling: PollingSettings,
    pub race: RaceSettings,
}

/// Parameters for the upstream timing API and its rate limiter.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    /// Base URL of the OpenF1-compatible REST API.
    pub base_url: String,
    /// Maximum requests allowed in flight at once. The free tier tolerates
    /// roughly three requests per second.
    pub max_in_flight: usize,
    /// Pause between admission batches, in milliseconds.
    pub batch_delay_ms: u64,
    /// Per-request timeout, in seconds.
    pub request_timeout_secs: u64,
}

/// Parameters for the live polling loop.
#[derive(Debug, Clone, Deserialize)]
pub struct PollingSettings {
    /// Seconds between reconciliation passes. The next pass only starts
    /// after the previous one completes.
    pub interval_secs: u64,
    /// Extra pacing between endpoints during a full (forced) fetch, in
    /// milliseconds. Historical sessions can exceed the upstream payload
    /// budget without it.
    pub endpoint_delay_ms: u64,
}

/// Race-specific data that is configuration, not logic.
#[derive(Debug, Clone, Deserialize)]
pub struct RaceSettings {
    /// Fallback finish threshold (in laps) when the session's actual total
    /// lap count cannot be derived from the data.
    pub default_total_laps: u32,
    /// Post-race disqualifications that never appear in the upstream feeds.
    #[serde(default)]
    pub dsq_overrides: Vec<DsqOverride>,
}

/// Drivers disqualified after the fact for a specific session.
#[derive(Debug, Clone, Deserialize)]
pub struct DsqOverride {
    pub session_key: u64,
    pub driver_numbers: Vec<u32>,
}

impl RaceSettings {
    /// Driver numbers disqualified in the given session, empty for sessions
    /// without a recorded override.
    pub fn disqualified_drivers(&self, session_key: u64) -> Vec<u32> {
        self.dsq_overrides
            .iter()
            .filter(|o| o.session_key == session_key)
            .flat_map(|o| o.driver_numbers.iter().copied())
            .collect()
    }
}
