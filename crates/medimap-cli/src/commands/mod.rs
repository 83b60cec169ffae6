pub mod classify;
pub mod geocode;
pub mod recommend;
pub mod rules;

use medimap_core::error::MediMapError;
use medimap_core::geocode::{ResolveMode, TableGeocoder};
use medimap_core::rules::builtin;
use medimap_core::rules::schema::RuleTable;
use medimap_core::sources::{FavoritesSource, JsonCatalogFile, JsonFavoritesFile, NoFavorites};
use medimap_core::{CatalogLoad, Pipeline};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

/// Input files of the catalog-loading commands.
pub struct Sources {
    pub catalog: PathBuf,
    pub geocodes: PathBuf,
    pub favorites: Option<PathBuf>,
}

/// Custom rule file if given, otherwise the built-in table.
pub fn load_rules(rules: Option<PathBuf>) -> Result<RuleTable, MediMapError> {
    match rules {
        Some(path) => medimap_core::rules::load_table(&path),
        None => builtin::default_table(),
    }
}

/// Load the catalog through the pipeline, with the geocode table loading in
/// the background as the readiness-gated mapping capability.
///
/// Ctrl-C cancels the load, as does a geocode table that fails to load.
pub async fn load_catalog(
    pipeline: &Pipeline,
    sources: &Sources,
    geocoder: &Arc<TableGeocoder>,
    mode: Option<ResolveMode>,
) -> Result<CatalogLoad, MediMapError> {
    let cancel = CancellationToken::new();

    let loading = geocoder.spawn_load(sources.geocodes.clone());
    let on_failure = cancel.clone();
    tokio::spawn(async move {
        match loading.await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                error!(error = %e, "geocode table unavailable, aborting");
                on_failure.cancel();
            }
            Err(e) => {
                error!(error = %e, "geocode table loader panicked");
                on_failure.cancel();
            }
        }
    });

    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling");
            on_interrupt.cancel();
        }
    });

    let catalog = JsonCatalogFile::new(&sources.catalog);
    let favorites: Box<dyn FavoritesSource> = match &sources.favorites {
        Some(path) => Box::new(JsonFavoritesFile::new(path)),
        None => Box::new(NoFavorites),
    };
    let probe_target = Arc::clone(geocoder);
    let probe = move || probe_target.is_loaded();

    let load = pipeline
        .load_catalog(&catalog, favorites.as_ref(), &probe, mode, &cancel)
        .await;

    if let Some(reason) = &load.catalog_error {
        return Err(MediMapError::CatalogUnavailable(reason.clone()));
    }
    Ok(load)
}
