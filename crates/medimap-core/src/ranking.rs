//! Candidate selection and scoring over a geocoded facility catalog.

use crate::classify::ClassificationResult;
use crate::model::Facility;
use serde::{Deserialize, Serialize};

/// Points awarded per name keyword found in a facility name.
pub const NAME_MATCH_WEIGHT: u32 = 3;

/// Default number of recommendations returned.
pub const DEFAULT_LIMIT: usize = 5;

/// A facility with its ranking score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedFacility {
    #[serde(flatten)]
    pub facility: Facility,
    pub score: u32,
}

/// Tokens driving the dental-only precision override.
///
/// When the name keywords contain `exclusive_token` but not `unless_token`,
/// only facilities whose category or name contains `exclusive_token` qualify.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingPolicy {
    pub exclusive_token: String,
    pub unless_token: String,
}

impl Default for RankingPolicy {
    fn default() -> Self {
        Self {
            exclusive_token: "치과".into(),
            unless_token: "내과".into(),
        }
    }
}

/// Select and rank the best matching facilities with the default policy.
pub fn select_top_candidates(
    catalog: &[Facility],
    result: &ClassificationResult,
    limit: usize,
) -> Vec<RankedFacility> {
    select_top_candidates_with(catalog, result, limit, &RankingPolicy::default())
}

/// Select and rank the best matching facilities.
///
/// Facilities without coordinates are never candidates. Ties keep catalog
/// order. An empty result is a valid "no match" outcome.
pub fn select_top_candidates_with(
    catalog: &[Facility],
    result: &ClassificationResult,
    limit: usize,
    policy: &RankingPolicy,
) -> Vec<RankedFacility> {
    let exclusive = has_keyword(result, &policy.exclusive_token)
        && !has_keyword(result, &policy.unless_token);

    let mut ranked: Vec<RankedFacility> = catalog
        .iter()
        .filter(|f| f.coordinates.is_some())
        .filter(|f| {
            if exclusive {
                f.category.contains(policy.exclusive_token.as_str())
                    || f.name.contains(policy.exclusive_token.as_str())
            } else {
                is_candidate(f, result)
            }
        })
        .map(|f| RankedFacility {
            facility: f.clone(),
            score: score(f, result),
        })
        .collect();

    // sort_by is stable: equal scores keep catalog order
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked.truncate(limit);
    ranked
}

fn has_keyword(result: &ClassificationResult, token: &str) -> bool {
    result.name_keywords.iter().any(|k| k == token)
}

fn is_candidate(facility: &Facility, result: &ClassificationResult) -> bool {
    let type_match = result
        .target_facility_types
        .iter()
        .any(|t| facility.category.contains(t.as_str()));
    let name_match = result
        .name_keywords
        .iter()
        .any(|k| facility.name.contains(k.as_str()));
    type_match || name_match
}

fn score(facility: &Facility, result: &ClassificationResult) -> u32 {
    let hits = result
        .name_keywords
        .iter()
        .filter(|k| facility.name.contains(k.as_str()))
        .count() as u32;
    hits * NAME_MATCH_WEIGHT
}
