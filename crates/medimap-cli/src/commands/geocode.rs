use medimap_core::catalog::{self, SearchFilter};
use medimap_core::error::MediMapError;
use medimap_core::geocode::TableGeocoder;
use medimap_core::rules::builtin;
use medimap_core::{Pipeline, PipelineConfig};
use std::sync::Arc;
use std::time::Duration;

use super::Sources;
use crate::output;
use crate::ModeArg;

pub async fn run(
    sources: Sources,
    mode: ModeArg,
    delay_ms: Option<u64>,
    filter: SearchFilter,
    output_format: &str,
) -> Result<(), MediMapError> {
    let mut config = PipelineConfig::from_env()?;
    if let Some(ms) = delay_ms {
        config.throttle_delay = Duration::from_millis(ms);
    }

    let geocoder = Arc::new(TableGeocoder::unloaded());
    let pipeline = Pipeline::new(config, builtin::default_table()?, geocoder.clone());

    let mut load = super::load_catalog(&pipeline, &sources, &geocoder, mode.forced()).await?;
    let categories = catalog::categories(load.facilities());
    load.facilities = catalog::search(load.facilities(), &filter);

    match output_format {
        "json" => output::json::print(&load)?,
        _ => output::table::print_catalog_load(&load, &categories),
    }

    Ok(())
}
