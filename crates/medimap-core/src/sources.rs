//! Catalog and favorites collaborators, and the settled dual fetch.

use crate::error::MediMapError;
use crate::model::{Facility, FavoriteRef};
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Source of the facility catalog (`GET facilities`).
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_facilities(&self) -> Result<Vec<Facility>, MediMapError>;
}

/// Source of the user's favorites (`GET favorites`).
#[async_trait]
pub trait FavoritesSource: Send + Sync {
    async fn fetch_favorites(&self) -> Result<Vec<FavoriteRef>, MediMapError>;

    async fn toggle_favorite(&self, id: i64) -> Result<(), MediMapError>;
}

/// Outcome of fetching catalog and favorites together.
///
/// A failed source degrades to empty input; its error is kept for reporting.
#[derive(Debug, Default)]
pub struct SettledFetch {
    pub facilities: Vec<Facility>,
    pub favorite_ids: HashSet<i64>,
    pub catalog_error: Option<String>,
    pub favorites_error: Option<String>,
}

/// Fetch catalog and favorites concurrently. Neither failure cancels the other.
pub async fn fetch_settled(
    catalog: &dyn CatalogSource,
    favorites: &dyn FavoritesSource,
) -> SettledFetch {
    let (catalog_res, favorites_res) =
        tokio::join!(catalog.fetch_facilities(), favorites.fetch_favorites());

    let mut settled = SettledFetch::default();

    match catalog_res {
        Ok(facilities) => settled.facilities = facilities,
        Err(e) => {
            warn!(error = %e, "catalog fetch failed, continuing with an empty catalog");
            settled.catalog_error = Some(e.to_string());
        }
    }

    match favorites_res {
        Ok(list) => settled.favorite_ids = list.into_iter().map(|f| f.id).collect(),
        Err(e) => {
            warn!(error = %e, "favorites fetch failed, continuing without favorites");
            settled.favorites_error = Some(e.to_string());
        }
    }

    info!(
        facilities = settled.facilities.len(),
        favorites = settled.favorite_ids.len(),
        "catalog and favorites settled"
    );
    settled
}

/// Catalog read from a JSON array of facility records.
pub struct JsonCatalogFile {
    path: PathBuf,
}

impl JsonCatalogFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CatalogSource for JsonCatalogFile {
    async fn fetch_facilities(&self) -> Result<Vec<Facility>, MediMapError> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            MediMapError::CatalogUnavailable(format!("{}: {}", self.path.display(), e))
        })?;
        let facilities: Vec<Facility> = serde_json::from_slice(&bytes).map_err(|e| {
            MediMapError::CatalogUnavailable(format!("{}: {}", self.path.display(), e))
        })?;
        Ok(facilities)
    }
}

/// Favorites stored as a JSON array of `{"id": ..}` objects.
pub struct JsonFavoritesFile {
    path: PathBuf,
}

impl JsonFavoritesFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn read(&self) -> Result<Vec<FavoriteRef>, MediMapError> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            MediMapError::FavoritesUnavailable(format!("{}: {}", self.path.display(), e))
        })?;
        serde_json::from_slice(&bytes).map_err(|e| {
            MediMapError::FavoritesUnavailable(format!("{}: {}", self.path.display(), e))
        })
    }
}

#[async_trait]
impl FavoritesSource for JsonFavoritesFile {
    async fn fetch_favorites(&self) -> Result<Vec<FavoriteRef>, MediMapError> {
        self.read().await
    }

    async fn toggle_favorite(&self, id: i64) -> Result<(), MediMapError> {
        let mut list = self.read().await?;
        if list.iter().any(|f| f.id == id) {
            list.retain(|f| f.id != id);
        } else {
            list.push(FavoriteRef { id });
        }
        let json = serde_json::to_vec_pretty(&list)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

/// Favorites source for anonymous sessions: always empty, toggling refused.
pub struct NoFavorites;

#[async_trait]
impl FavoritesSource for NoFavorites {
    async fn fetch_favorites(&self) -> Result<Vec<FavoriteRef>, MediMapError> {
        Ok(Vec::new())
    }

    async fn toggle_favorite(&self, _id: i64) -> Result<(), MediMapError> {
        Err(MediMapError::FavoritesUnavailable(
            "no favorites store configured".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    struct FailingCatalog;

    #[async_trait]
    impl CatalogSource for FailingCatalog {
        async fn fetch_facilities(&self) -> Result<Vec<Facility>, MediMapError> {
            Err(MediMapError::CatalogUnavailable("503".into()))
        }
    }

    struct FailingFavorites;

    #[async_trait]
    impl FavoritesSource for FailingFavorites {
        async fn fetch_favorites(&self) -> Result<Vec<FavoriteRef>, MediMapError> {
            Err(MediMapError::FavoritesUnavailable("401".into()))
        }

        async fn toggle_favorite(&self, _id: i64) -> Result<(), MediMapError> {
            Err(MediMapError::FavoritesUnavailable("401".into()))
        }
    }

    fn write_json(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_favorites_failure_keeps_catalog() {
        let file = write_json(
            r#"[{"id": 1, "name": "한빛내과", "address": "대전 서구", "treatCategory": "내과"}]"#,
        );
        let settled = fetch_settled(&JsonCatalogFile::new(file.path()), &FailingFavorites).await;
        assert_eq!(settled.facilities.len(), 1);
        assert!(settled.favorite_ids.is_empty());
        assert!(settled.favorites_error.is_some());
        assert!(settled.catalog_error.is_none());
    }

    #[tokio::test]
    async fn test_catalog_failure_keeps_favorites() {
        let file = write_json(r#"[{"id": 4}, {"id": 8}]"#);
        let settled = fetch_settled(&FailingCatalog, &JsonFavoritesFile::new(file.path())).await;
        assert!(settled.facilities.is_empty());
        assert_eq!(settled.favorite_ids, HashSet::from([4, 8]));
        assert!(settled.catalog_error.is_some());
    }

    #[tokio::test]
    async fn test_missing_catalog_file_is_unavailable() {
        let err = JsonCatalogFile::new("/nonexistent/catalog.json")
            .fetch_facilities()
            .await
            .unwrap_err();
        assert!(matches!(err, MediMapError::CatalogUnavailable(_)));
    }

    #[tokio::test]
    async fn test_file_favorites_toggle_round_trip() {
        let file = write_json(r#"[{"id": 4}]"#);
        let source = JsonFavoritesFile::new(file.path());

        source.toggle_favorite(7).await.unwrap();
        source.toggle_favorite(4).await.unwrap();

        let ids: Vec<i64> = source
            .fetch_favorites()
            .await
            .unwrap()
            .iter()
            .map(|f| f.id)
            .collect();
        assert_eq!(ids, vec![7]);
    }

    #[tokio::test]
    async fn test_no_favorites() {
        assert!(NoFavorites.fetch_favorites().await.unwrap().is_empty());
        assert!(NoFavorites.toggle_favorite(1).await.is_err());
    }
}
