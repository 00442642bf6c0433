use std::time::Duration;

use log::*;

pub const DEFAULT_KASPA_API_BASE: &str = "https://api.kaspa.org";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct KaspaRestConfig {
    /// Base URL of the explorer REST API, without a trailing slash.
    pub base_url: String,
    /// Upper bound on any single request. A fetch that exceeds it is reported as a failed query.
    pub timeout: Duration,
}

impl Default for KaspaRestConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_KASPA_API_BASE.to_string(), timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS) }
    }
}

impl KaspaRestConfig {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self { base_url, timeout }
    }

    pub fn new_from_env_or_default() -> Self {
        let base_url = std::env::var("KM_KASPA_API_BASE").unwrap_or_else(|_| {
            info!("KM_KASPA_API_BASE not set, using {DEFAULT_KASPA_API_BASE} as default");
            DEFAULT_KASPA_API_BASE.to_string()
        });
        let timeout = std::env::var("KM_FETCH_TIMEOUT_SECS")
            .ok()
            .and_then(|s| {
                s.parse::<u64>()
                    .map_err(|e| warn!("Invalid value for KM_FETCH_TIMEOUT_SECS ({s}): {e}. Using the default."))
                    .ok()
            })
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS));
        Self::new(&base_url, timeout)
    }
}
