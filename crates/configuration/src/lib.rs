// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

use error::ConfigError;

// Re-export the core types to provide a clean public API.
pub use settings::{ApiSettings, DsqOverride, PollingSettings, RaceSettings, Settings};

/// Loads the application configuration.
///
/// Every setting has a sensible default, so the application runs without a
/// `config.toml`; when the file is present its values win.
pub fn load_config() -> Result<Settings, ConfigError> {
    let builder = config::Config::builder()
        .set_default("api.base_url", "https://api.openf1.org/v1")?
        .set_default("api.max_in_flight", 3)?
        .set_default("api.batch_delay_ms", 1000)?
        .set_default("api.request_timeout_secs", 30)?
        .set_default("polling.interval_secs", 5)?
        .set_default("polling.endpoint_delay_ms", 3000)?
        .set_default("race.default_total_laps", 45)?
        // Tells the builder to look for a file named `config.toml`
        .add_source(config::File::with_name("config.toml").required(false))
        .build()?;

    // Attempt to deserialize the entire configuration into our `Settings` struct
    let settings = builder.try_deserialize::<Settings>()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_setting() {
        let settings = load_config().expect("defaults must deserialize");
        assert_eq!(settings.api.max_in_flight, 3);
        assert_eq!(settings.polling.interval_secs, 5);
        assert_eq!(settings.race.default_total_laps, 45);
    }
}
