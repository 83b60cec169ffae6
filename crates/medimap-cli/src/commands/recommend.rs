use medimap_core::error::MediMapError;
use medimap_core::geocode::TableGeocoder;
use medimap_core::{Pipeline, PipelineConfig};
use std::path::PathBuf;
use std::sync::Arc;

use super::Sources;
use crate::output;
use crate::ModeArg;

pub async fn run(
    text: &str,
    sources: Sources,
    rules: Option<PathBuf>,
    limit: Option<usize>,
    mode: ModeArg,
    output_format: &str,
) -> Result<(), MediMapError> {
    // Reject blank input before touching any file
    if text.trim().is_empty() {
        return Err(MediMapError::EmptySymptoms);
    }

    let mut config = PipelineConfig::from_env()?;
    if let Some(limit) = limit {
        config.top_n = limit;
    }

    let table = super::load_rules(rules)?;
    let geocoder = Arc::new(TableGeocoder::unloaded());
    let pipeline = Pipeline::new(config, table, geocoder.clone());

    let load = super::load_catalog(&pipeline, &sources, &geocoder, mode.forced()).await?;
    // ranking needs coordinates
    if let Some(outcome) = load.readiness.filter(|o| !o.is_ready()) {
        return Err(MediMapError::NotReady { outcome });
    }
    let recommendation = pipeline.recommend(text, load.facilities())?;

    match output_format {
        "json" => output::json::print(&recommendation)?,
        _ => output::table::print_recommendation(&recommendation),
    }

    Ok(())
}
