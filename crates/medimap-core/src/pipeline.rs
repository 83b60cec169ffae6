//! End-to-end flow: load the catalog, wait for the mapping capability,
//! resolve coordinates, then classify symptoms and rank candidates.

use crate::catalog::merge_favorites;
use crate::classify::{classify, ClassificationResult};
use crate::config::PipelineConfig;
use crate::error::MediMapError;
use crate::geocode::{BatchReport, GeocodeResolver, Geocoder, ResolveMode, ResolveOptions, ResolvedView};
use crate::model::Facility;
use crate::readiness::{await_ready, GateOutcome, ReadinessProbe};
use crate::ranking::{select_top_candidates, RankedFacility};
use crate::rules::schema::RuleTable;
use crate::sources::{fetch_settled, CatalogSource, FavoritesSource};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Classification plus the facilities recommended for it.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub classification: ClassificationResult,
    pub candidates: Vec<RankedFacility>,
}

/// Result of [`Pipeline::load_catalog`].
#[derive(Debug, Clone, Serialize)]
pub struct CatalogLoad {
    pub generation: u64,
    /// Favorite-annotated catalog, with coordinates merged in when the
    /// geocode batch ran. Present even when the map never became ready.
    pub facilities: Vec<Facility>,
    /// Readiness of the mapping capability. `None` when a newer load took
    /// over before the gate was reached.
    pub readiness: Option<GateOutcome>,
    /// A newer catalog load started before this one finished.
    pub superseded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favorites_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch: Option<BatchReport>,
}

impl CatalogLoad {
    pub fn facilities(&self) -> &[Facility] {
        &self.facilities
    }

    /// Whether the mapping capability was ready for this load.
    pub fn map_ready(&self) -> bool {
        self.readiness.is_some_and(GateOutcome::is_ready)
    }
}

pub struct Pipeline {
    config: PipelineConfig,
    rules: RuleTable,
    resolver: Arc<GeocodeResolver>,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, rules: RuleTable, geocoder: Arc<dyn Geocoder>) -> Self {
        Self {
            config,
            rules,
            resolver: Arc::new(GeocodeResolver::new(geocoder)),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    pub fn resolver(&self) -> &Arc<GeocodeResolver> {
        &self.resolver
    }

    /// Observe the resolved facility list as batches publish.
    pub fn subscribe(&self) -> watch::Receiver<ResolvedView> {
        self.resolver.subscribe()
    }

    /// Fetch catalog and favorites, wait for the mapping capability and
    /// resolve missing coordinates.
    ///
    /// The load owns a generation from the moment it starts, so a load
    /// started later always wins, whatever order the fetches finish in. The
    /// favorite-annotated list is published before the readiness gate; if
    /// the gate times out or is cancelled the load still returns that list,
    /// ungeocoded. The mode is picked from the batch size unless `mode`
    /// forces one.
    pub async fn load_catalog(
        &self,
        catalog: &dyn CatalogSource,
        favorites: &dyn FavoritesSource,
        probe: &dyn ReadinessProbe,
        mode: Option<ResolveMode>,
        cancel: &CancellationToken,
    ) -> CatalogLoad {
        let generation = self.resolver.begin();

        let settled = fetch_settled(catalog, favorites).await;
        let mut load = CatalogLoad {
            generation,
            facilities: merge_favorites(&settled.facilities, &settled.favorite_ids),
            readiness: None,
            superseded: false,
            catalog_error: settled.catalog_error,
            favorites_error: settled.favorites_error,
            batch: None,
        };

        if !self.resolver.publish(generation, load.facilities.clone(), false) {
            info!(generation, "catalog load superseded before geocoding");
            load.superseded = true;
            return load;
        }

        let outcome = await_ready(
            probe,
            self.config.probe_interval,
            self.config.probe_timeout,
            cancel,
        )
        .await;
        load.readiness = Some(outcome);

        if !outcome.is_ready() {
            warn!(generation, %outcome, "mapping capability unavailable, catalog left ungeocoded");
            load.superseded = !self.resolver.publish(generation, load.facilities.clone(), true);
            return load;
        }

        let mode = mode.unwrap_or_else(|| {
            let pending = load.facilities.iter().filter(|f| f.needs_geocoding()).count();
            ResolveMode::choose(pending, self.config.parallel_limit)
        });
        let options = ResolveOptions::from(&self.config);
        let batch = self
            .resolver
            .resolve_generation(generation, load.facilities.clone(), mode, &options, cancel)
            .await;

        load.superseded = batch.superseded;
        load.facilities = batch.facilities.clone();
        load.batch = Some(batch);
        load
    }

    /// Classify `text` and rank `facilities` for it, returning at most
    /// `top_n` candidates.
    pub fn recommend(
        &self,
        text: &str,
        facilities: &[Facility],
    ) -> Result<Recommendation, MediMapError> {
        recommend_with(text, facilities, &self.rules, self.config.top_n)
    }
}

/// Stateless form of [`Pipeline::recommend`].
pub fn recommend_with(
    text: &str,
    facilities: &[Facility],
    rules: &RuleTable,
    limit: usize,
) -> Result<Recommendation, MediMapError> {
    if text.trim().is_empty() {
        return Err(MediMapError::EmptySymptoms);
    }

    let classification = classify(text, rules);
    let candidates = select_top_candidates(facilities, &classification, limit);

    info!(
        department = %classification.department_title,
        urgency = %classification.urgency_level,
        candidates = candidates.len(),
        "recommendation ready"
    );

    Ok(Recommendation {
        classification,
        candidates,
    })
}
