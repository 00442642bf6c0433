use std::{env, time::Duration};

use kaspa_rest::KaspaRestConfig;
use log::*;

const DEFAULT_KM_HOST: &str = "127.0.0.1";
const DEFAULT_KM_PORT: u16 = 3000;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/kasmeter.db";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 2;
const DEFAULT_CHECKPOINT_SECONDS: i64 = 60;
const DEFAULT_RATE_KAS_PER_MINUTE: f64 = 0.1;

#[derive(Clone, Debug)]
pub struct KmConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// The shared Kaspa address every session pays into. Without it the server still runs, but
    /// session creation is refused and the reconciler is not started.
    pub receiver_address: Option<String>,
    /// How often the reconciler polls the explorer for the receiver address's UTXO set.
    pub poll_interval: Duration,
    /// Checkpoint length used when session creation does not specify one.
    pub default_checkpoint_seconds: i64,
    /// Rate used when session creation does not specify one.
    pub default_rate_kas_per_minute: f64,
    /// Explorer API configuration.
    pub kaspa: KaspaRestConfig,
}

impl Default for KmConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_KM_HOST.to_string(),
            port: DEFAULT_KM_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            receiver_address: None,
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            default_checkpoint_seconds: DEFAULT_CHECKPOINT_SECONDS,
            default_rate_kas_per_minute: DEFAULT_RATE_KAS_PER_MINUTE,
            kaspa: KaspaRestConfig::default(),
        }
    }
}

impl KmConfig {
    pub fn from_env_or_default() -> Self {
        let host = env::var("KM_HOST").ok().unwrap_or_else(|| DEFAULT_KM_HOST.into());
        let port = env::var("KM_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!("🪛️ {s} is not a valid port for KM_PORT. {e} Using the default, {DEFAULT_KM_PORT}, instead.");
                    DEFAULT_KM_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_KM_PORT);
        let database_url = env::var("KM_DATABASE_URL").ok().unwrap_or_else(|| {
            info!("🪛️ KM_DATABASE_URL is not set. Using the default, {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let receiver_address = env::var("KM_RECEIVER_ADDRESS").ok().filter(|s| !s.trim().is_empty());
        if receiver_address.is_none() {
            error!(
                "🚨️ KM_RECEIVER_ADDRESS is not set. Sessions cannot be created and no payments will be credited \
                 until a receiver address is configured."
            );
        }
        let poll_interval = env::var("KM_POLL_INTERVAL_SECS")
            .ok()
            .and_then(|s| {
                s.parse::<u64>()
                    .map_err(|e| warn!("🪛️ Invalid configuration value for KM_POLL_INTERVAL_SECS. {e}"))
                    .ok()
            })
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS));
        let default_checkpoint_seconds = env::var("KM_DEFAULT_CHECKPOINT_SECONDS")
            .ok()
            .and_then(|s| {
                s.parse::<i64>()
                    .map_err(|e| warn!("🪛️ Invalid configuration value for KM_DEFAULT_CHECKPOINT_SECONDS. {e}"))
                    .ok()
            })
            .unwrap_or(DEFAULT_CHECKPOINT_SECONDS);
        let default_rate_kas_per_minute = env::var("KM_DEFAULT_RATE_KAS_PER_MINUTE")
            .ok()
            .and_then(|s| {
                s.parse::<f64>()
                    .map_err(|e| warn!("🪛️ Invalid configuration value for KM_DEFAULT_RATE_KAS_PER_MINUTE. {e}"))
                    .ok()
            })
            .unwrap_or(DEFAULT_RATE_KAS_PER_MINUTE);
        let kaspa = KaspaRestConfig::new_from_env_or_default();
        Self {
            host,
            port,
            database_url,
            receiver_address,
            poll_interval,
            default_checkpoint_seconds,
            default_rate_kas_per_minute,
            kaspa,
        }
    }
}

//-------------------------------------------  SessionDefaults  -------------------------------------------------------
/// The subset of the configuration the session endpoints need. Kept small so no unrelated
/// configuration is passed around the handlers.
#[derive(Clone, Debug)]
pub struct SessionDefaults {
    pub receiver_address: Option<String>,
    pub checkpoint_seconds: i64,
    pub rate_kas_per_minute: f64,
}

impl SessionDefaults {
    pub fn from_config(config: &KmConfig) -> Self {
        Self {
            receiver_address: config.receiver_address.clone(),
            checkpoint_seconds: config.default_checkpoint_seconds,
            rate_kas_per_minute: config.default_rate_kas_per_minute,
        }
    }
}
