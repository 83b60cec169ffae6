pub mod catalog;
pub mod classify;
pub mod config;
pub mod error;
pub mod geocode;
pub mod model;
pub mod pipeline;
pub mod ranking;
pub mod readiness;
pub mod rules;
pub mod sources;

pub use config::PipelineConfig;
pub use error::MediMapError;
pub use pipeline::{CatalogLoad, Pipeline, Recommendation};

use model::Facility;
use rules::schema::RuleTable;

/// Main API entry point: turn a free-text symptom description into a
/// classification and the best matching facilities.
///
/// `facilities` should already carry coordinates; facilities without them are
/// never recommended. Returns [`MediMapError::EmptySymptoms`] for blank text.
pub fn recommend(
    text: &str,
    facilities: &[Facility],
    table: &RuleTable,
    limit: usize,
) -> Result<Recommendation, MediMapError> {
    pipeline::recommend_with(text, facilities, table, limit)
}
