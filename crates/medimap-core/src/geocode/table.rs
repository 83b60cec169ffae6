use super::{GeocodeResponse, Geocoder};
use crate::error::MediMapError;
use crate::model::Coordinates;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Geocoder backed by an address → coordinate table.
///
/// The table can be loaded after construction, so it also serves as the
/// mapping capability whose readiness is polled before resolution.
#[derive(Debug, Default)]
pub struct TableGeocoder {
    entries: OnceLock<HashMap<String, Coordinates>>,
}

impl TableGeocoder {
    /// A geocoder whose table has not been loaded yet.
    pub fn unloaded() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: HashMap<String, Coordinates>) -> Self {
        let geocoder = Self::default();
        geocoder.install(entries);
        geocoder
    }

    pub fn is_loaded(&self) -> bool {
        self.entries.get().is_some()
    }

    /// Install the table. Returns false if one was already installed.
    pub fn install(&self, entries: HashMap<String, Coordinates>) -> bool {
        let normalized = entries
            .into_iter()
            .map(|(address, coords)| (address.trim().to_string(), coords))
            .collect();
        self.entries.set(normalized).is_ok()
    }

    /// Read a JSON object of `{"address": {"lat": .., "lng": ..}}` entries.
    pub async fn read_table(path: &Path) -> Result<HashMap<String, Coordinates>, MediMapError> {
        let bytes = tokio::fs::read(path).await?;
        let entries: HashMap<String, Coordinates> = serde_json::from_slice(&bytes)?;
        Ok(entries)
    }

    /// Load the table file on a background task.
    pub fn spawn_load(self: &Arc<Self>, path: PathBuf) -> JoinHandle<Result<usize, MediMapError>> {
        let geocoder = Arc::clone(self);
        tokio::spawn(async move {
            let entries = Self::read_table(&path).await.map_err(|e| {
                warn!(path = %path.display(), error = %e, "failed to load geocode table");
                e
            })?;
            let count = entries.len();
            geocoder.install(entries);
            info!(path = %path.display(), entries = count, "geocode table loaded");
            Ok(count)
        })
    }
}

#[async_trait]
impl Geocoder for TableGeocoder {
    async fn resolve(&self, address: &str) -> Result<GeocodeResponse, MediMapError> {
        let entries = self.entries.get().ok_or(MediMapError::GeocoderNotReady)?;
        Ok(match entries.get(address.trim()) {
            Some(c) => GeocodeResponse::found(c.lat, c.lng),
            None => GeocodeResponse::not_found(),
        })
    }
}
