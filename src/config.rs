//! Application-level configuration loading: intent cache sizing and animation timings.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use serde_with::{DurationMilliSeconds, serde_as};
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "CLUE_BOARD_BACK_CONFIG_PATH";

/// How long a published intent counts as "recent" for late subscribers.
pub const DEFAULT_FRESHNESS_WINDOW: Duration = Duration::from_millis(2_000);
const DEFAULT_RECENT_CACHE_CAPACITY: usize = 256;
const DEFAULT_BUS_CHANNEL_CAPACITY: usize = 64;
const DEFAULT_TARGET_WAIT_TIMEOUT: Duration = Duration::from_millis(3_000);
const DEFAULT_TARGET_POLL_INTERVAL: Duration = Duration::from_millis(50);
const DEFAULT_ANIMATION_DURATION: Duration = Duration::from_millis(600);
const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_millis(2_000);

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Age after which a cached intent no longer counts as recently published.
    pub freshness_window: Duration,
    /// Upper bound on the number of cached intents.
    pub recent_cache_capacity: usize,
    /// Capacity of the broadcast channel feeding SSE clients.
    pub sse_channel_capacity: usize,
    /// Maximum time an animation waits for its presentation target.
    pub target_wait_timeout: Duration,
    /// Delay between two presentation target polls.
    pub target_poll_interval: Duration,
    /// Length of an animated (non-instant) effect.
    pub animation_duration: Duration,
    /// Maximum time spent asking whether a clue is a daily double.
    pub lookup_timeout: Duration,
    /// Whether every published intent is played on the display runtime.
    pub auto_play: bool,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        freshness_ms = app_config.freshness_window.as_millis() as u64,
                        auto_play = app_config.auto_play,
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

#[serde_as]
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde_as(as = "Option<DurationMilliSeconds<u64>>")]
    freshness_window_ms: Option<Duration>,
    recent_cache_capacity: Option<usize>,
    sse_channel_capacity: Option<usize>,
    #[serde_as(as = "Option<DurationMilliSeconds<u64>>")]
    target_wait_timeout_ms: Option<Duration>,
    #[serde_as(as = "Option<DurationMilliSeconds<u64>>")]
    target_poll_interval_ms: Option<Duration>,
    #[serde_as(as = "Option<DurationMilliSeconds<u64>>")]
    animation_duration_ms: Option<Duration>,
    #[serde_as(as = "Option<DurationMilliSeconds<u64>>")]
    lookup_timeout_ms: Option<Duration>,
    auto_play: Option<bool>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        Self {
            freshness_window: value.freshness_window_ms.unwrap_or(DEFAULT_FRESHNESS_WINDOW),
            recent_cache_capacity: value
                .recent_cache_capacity
                .filter(|capacity| *capacity > 0)
                .unwrap_or(DEFAULT_RECENT_CACHE_CAPACITY),
            sse_channel_capacity: value
                .sse_channel_capacity
                .filter(|capacity| *capacity > 0)
                .unwrap_or(DEFAULT_BUS_CHANNEL_CAPACITY),
            target_wait_timeout: value
                .target_wait_timeout_ms
                .unwrap_or(DEFAULT_TARGET_WAIT_TIMEOUT),
            target_poll_interval: value
                .target_poll_interval_ms
                .filter(|interval| !interval.is_zero())
                .unwrap_or(DEFAULT_TARGET_POLL_INTERVAL),
            animation_duration: value
                .animation_duration_ms
                .unwrap_or(DEFAULT_ANIMATION_DURATION),
            lookup_timeout: value.lookup_timeout_ms.unwrap_or(DEFAULT_LOOKUP_TIMEOUT),
            auto_play: value.auto_play.unwrap_or(false),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
