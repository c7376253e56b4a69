use std::time::Duration;

use clap::Args;

#[derive(Clone, Debug, Args)]
pub struct Config {
    /// Base URL of the Nominatim geocoder.
    #[arg(
        long,
        env = "PLACEFINDER_NOMINATIM_URL",
        default_value = "https://nominatim.openstreetmap.org"
    )]
    pub nominatim_url: String,

    /// Overpass interpreter endpoint.
    #[arg(
        long,
        env = "PLACEFINDER_OVERPASS_URL",
        default_value = "https://overpass-api.de/api/interpreter"
    )]
    pub overpass_url: String,

    #[arg(long, env = "PLACEFINDER_USER_AGENT", default_value = "MapsFinderWebApp/1.0")]
    pub user_agent: String,

    /// Per-request timeout for both upstream services.
    #[arg(long, env = "PLACEFINDER_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Search radius around the geocoded location, in metres.
    #[arg(long, env = "PLACEFINDER_RADIUS_M", default_value_t = 10_000)]
    pub radius_m: u32,

    /// Pause between enrichment steps, in milliseconds.
    #[arg(long, env = "PLACEFINDER_ENRICH_DELAY_MS", default_value_t = 50)]
    pub enrich_delay_ms: u64,
}

impl Config {
    pub fn enrich_delay(&self) -> Duration {
        Duration::from_millis(self.enrich_delay_ms)
    }
}
