//! Pipeline settings: defaults plus `MEDIMAP_*` environment overrides.

use crate::error::MediMapError;
use std::env;
use std::time::Duration;

pub const ENV_PROBE_INTERVAL_MS: &str = "MEDIMAP_PROBE_INTERVAL_MS";
pub const ENV_PROBE_TIMEOUT_MS: &str = "MEDIMAP_PROBE_TIMEOUT_MS";
pub const ENV_THROTTLE_DELAY_MS: &str = "MEDIMAP_THROTTLE_DELAY_MS";
pub const ENV_MERGE_EVERY: &str = "MEDIMAP_MERGE_EVERY";
pub const ENV_PARALLEL_LIMIT: &str = "MEDIMAP_PARALLEL_LIMIT";
pub const ENV_TOP_N: &str = "MEDIMAP_TOP_N";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineConfig {
    /// How often the readiness probe is polled.
    pub probe_interval: Duration,
    /// Give up waiting for readiness after this long. `None` waits forever.
    pub probe_timeout: Option<Duration>,
    /// Pause between requests of a throttled batch.
    pub throttle_delay: Duration,
    /// Completed tasks between incremental merges of a throttled batch.
    pub merge_every: usize,
    /// Largest batch still resolved in parallel.
    pub parallel_limit: usize,
    /// Number of recommendations returned.
    pub top_n: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            probe_interval: Duration::from_millis(500),
            probe_timeout: None,
            throttle_delay: Duration::from_millis(50),
            merge_every: 5,
            parallel_limit: 30,
            top_n: 5,
        }
    }
}

impl PipelineConfig {
    /// Load the configuration from environment variables (call
    /// `dotenvy::dotenv()` first to pick up a `.env` file).
    pub fn from_env() -> Result<Self, MediMapError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, MediMapError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let probe_interval = match parse_positive(&lookup, ENV_PROBE_INTERVAL_MS)? {
            Some(ms) => Duration::from_millis(ms),
            None => defaults.probe_interval,
        };
        let probe_timeout = parse_positive(&lookup, ENV_PROBE_TIMEOUT_MS)?
            .map(Duration::from_millis)
            .or(defaults.probe_timeout);
        let throttle_delay = match parse_u64(&lookup, ENV_THROTTLE_DELAY_MS)? {
            Some(ms) => Duration::from_millis(ms),
            None => defaults.throttle_delay,
        };
        let merge_every = to_count(ENV_MERGE_EVERY, parse_u64(&lookup, ENV_MERGE_EVERY)?)?
            .unwrap_or(defaults.merge_every);
        let parallel_limit =
            to_count(ENV_PARALLEL_LIMIT, parse_u64(&lookup, ENV_PARALLEL_LIMIT)?)?
                .unwrap_or(defaults.parallel_limit);
        let top_n = to_count(ENV_TOP_N, parse_positive(&lookup, ENV_TOP_N)?)?
            .unwrap_or(defaults.top_n);

        Ok(Self {
            probe_interval,
            probe_timeout,
            throttle_delay,
            merge_every,
            parallel_limit,
            top_n,
        })
    }
}

fn parse_u64<F>(lookup: &F, key: &str) -> Result<Option<u64>, MediMapError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<u64>()
        .map(Some)
        .map_err(|e| MediMapError::Config {
            key: key.to_string(),
            reason: format!("'{trimmed}' is not a non-negative integer ({e})"),
        })
}

fn parse_positive<F>(lookup: &F, key: &str) -> Result<Option<u64>, MediMapError>
where
    F: Fn(&str) -> Option<String>,
{
    match parse_u64(lookup, key)? {
        Some(0) => Err(MediMapError::Config {
            key: key.to_string(),
            reason: "must be greater than zero".into(),
        }),
        other => Ok(other),
    }
}

fn to_count(key: &str, value: Option<u64>) -> Result<Option<usize>, MediMapError> {
    value
        .map(|v| {
            usize::try_from(v).map_err(|_| MediMapError::Config {
                key: key.to_string(),
                reason: format!("{v} is too large for this platform"),
            })
        })
        .transpose()
}
