pub mod resolver;
pub mod table;

pub use resolver::{BatchReport, GeocodeResolver, ResolvedView};
pub use table::TableGeocoder;

use crate::config::PipelineConfig;
use crate::error::MediMapError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Address to coordinate provider.
///
/// Implementations report "not found" as `GeocodeStatus::Fail`; transport
/// problems as `Err`. The resolver treats both as a failed task.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn resolve(&self, address: &str) -> Result<GeocodeResponse, MediMapError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GeocodeStatus {
    Ok,
    Fail,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResponse {
    pub status: GeocodeStatus,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
}

impl GeocodeResponse {
    pub fn found(lat: f64, lng: f64) -> Self {
        Self {
            status: GeocodeStatus::Ok,
            lat: Some(lat),
            lng: Some(lng),
        }
    }

    pub fn not_found() -> Self {
        Self {
            status: GeocodeStatus::Fail,
            lat: None,
            lng: None,
        }
    }
}

/// Concurrency strategy of a resolution batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolveMode {
    /// All requests at once, no pacing. For small interactive batches.
    Parallel,
    /// One request at a time with a delay in between. For large catalogs.
    Throttled,
}

impl ResolveMode {
    /// Parallel for batches up to `parallel_limit` entries, throttled above.
    pub fn choose(batch_len: usize, parallel_limit: usize) -> Self {
        if batch_len <= parallel_limit {
            ResolveMode::Parallel
        } else {
            ResolveMode::Throttled
        }
    }
}

impl fmt::Display for ResolveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveMode::Parallel => write!(f, "parallel"),
            ResolveMode::Throttled => write!(f, "throttled"),
        }
    }
}

/// Pacing options for throttled batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Pause between the end of one request and the start of the next.
    pub delay: Duration,
    /// Publish an incremental merge after this many completed tasks (0 = only at the end).
    pub merge_every: usize,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(50),
            merge_every: 5,
        }
    }
}

impl From<&PipelineConfig> for ResolveOptions {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            delay: config.throttle_delay,
            merge_every: config.merge_every,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choose_mode() {
        assert_eq!(ResolveMode::choose(1, 30), ResolveMode::Parallel);
        assert_eq!(ResolveMode::choose(30, 30), ResolveMode::Parallel);
        assert_eq!(ResolveMode::choose(31, 30), ResolveMode::Throttled);
    }

    #[test]
    fn test_response_wire_shape() {
        let r: GeocodeResponse = serde_json::from_str(r#"{"status": "FAIL"}"#).unwrap();
        assert_eq!(r, GeocodeResponse::not_found());
        let r: GeocodeResponse =
            serde_json::from_str(r#"{"status": "OK", "lat": 36.35, "lng": 127.38}"#).unwrap();
        assert_eq!(r, GeocodeResponse::found(36.35, 127.38));
    }
}
