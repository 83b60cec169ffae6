use std::path::PathBuf;

use crate::readiness::GateOutcome;

#[derive(Debug, thiserror::Error)]
pub enum MediMapError {
    #[error("symptom description is empty")]
    EmptySymptoms,

    #[error("failed to load rule table from {path}: {reason}")]
    RulesetLoad { path: PathBuf, reason: String },

    #[error("invalid rule table: {0}")]
    RulesetInvalid(String),

    #[error("facility catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("favorites unavailable: {0}")]
    FavoritesUnavailable(String),

    #[error("geocoding request failed: {0}")]
    Geocoder(String),

    #[error("geocoder has not finished loading")]
    GeocoderNotReady,

    #[error("mapping capability did not become ready ({outcome})")]
    NotReady { outcome: GateOutcome },

    #[error("invalid configuration value for {key}: {reason}")]
    Config { key: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
