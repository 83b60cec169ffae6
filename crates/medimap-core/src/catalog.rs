//! Pure operations over a facility list: favorite annotation, search and
//! category listing. Every function returns a new list.

use crate::error::MediMapError;
use crate::model::Facility;
use crate::sources::FavoritesSource;
use std::collections::HashSet;
use tracing::warn;

/// Category label meaning "no category filter".
pub const ALL_CATEGORIES: &str = "전체";

/// Annotate each facility with whether its id is in `favorite_ids`.
///
/// An empty set (e.g. because the favorites source failed) leaves every
/// facility unflagged.
pub fn merge_favorites(catalog: &[Facility], favorite_ids: &HashSet<i64>) -> Vec<Facility> {
    catalog
        .iter()
        .map(|f| Facility {
            is_favorite: favorite_ids.contains(&f.id),
            ..f.clone()
        })
        .collect()
}

/// Flip the favorite flag of the facility with `id`.
pub fn toggle_favorite(catalog: &[Facility], id: i64) -> Vec<Facility> {
    catalog
        .iter()
        .map(|f| {
            if f.id == id {
                Facility {
                    is_favorite: !f.is_favorite,
                    ..f.clone()
                }
            } else {
                f.clone()
            }
        })
        .collect()
}

/// Toggle a favorite through the favorites API.
///
/// Returns the flipped list on success. On failure the error is returned and
/// the caller keeps its previous list, undoing any optimistic update.
pub async fn toggle_favorite_remote(
    source: &dyn FavoritesSource,
    catalog: &[Facility],
    id: i64,
) -> Result<Vec<Facility>, MediMapError> {
    match source.toggle_favorite(id).await {
        Ok(()) => Ok(toggle_favorite(catalog, id)),
        Err(e) => {
            warn!(facility_id = id, error = %e, "favorite toggle rejected, keeping previous state");
            Err(e)
        }
    }
}

/// Facilities that can be plotted on a map.
pub fn plottable(catalog: &[Facility]) -> Vec<Facility> {
    catalog
        .iter()
        .filter(|f| f.coordinates.is_some())
        .cloned()
        .collect()
}

/// Distinct categories in first-seen order.
pub fn categories(catalog: &[Facility]) -> Vec<String> {
    let mut seen = Vec::new();
    for f in catalog {
        if !f.category.is_empty() && !seen.iter().any(|c| c == &f.category) {
            seen.push(f.category.clone());
        }
    }
    seen
}

/// List filter of the facility browser.
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    /// Exact category to keep. `None` or [`ALL_CATEGORIES`] disables the filter.
    pub category: Option<String>,
    /// Whitespace-separated terms; each must appear in the name or address.
    pub keyword: String,
}

/// Filter a facility list by category and keyword terms (case-insensitive).
pub fn search(catalog: &[Facility], filter: &SearchFilter) -> Vec<Facility> {
    let category = filter
        .category
        .as_deref()
        .filter(|c| *c != ALL_CATEGORIES);
    let terms: Vec<String> = filter
        .keyword
        .split_whitespace()
        .map(|t| t.to_lowercase())
        .collect();

    catalog
        .iter()
        .filter(|f| category.map_or(true, |c| f.category == c))
        .filter(|f| {
            if terms.is_empty() {
                return true;
            }
            let name = f.name.to_lowercase();
            let address = f.address.to_lowercase();
            terms
                .iter()
                .all(|t| name.contains(t.as_str()) || address.contains(t.as_str()))
        })
        .cloned()
        .collect()
}
