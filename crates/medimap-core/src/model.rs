use serde::{Deserialize, Serialize};
use std::fmt;

/// Urgency tier of a triage outcome. Ordered so that `max()` escalates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UrgencyLevel {
    #[default]
    Normal,
    Urgent,
    Emergency,
}

impl fmt::Display for UrgencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UrgencyLevel::Normal => write!(f, "NORMAL"),
            UrgencyLevel::Urgent => write!(f, "URGENT"),
            UrgencyLevel::Emergency => write!(f, "EMERGENCY"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lat, self.lng)
    }
}

/// A medical facility from the catalog API.
///
/// `coordinates` and `is_favorite` are derived locally and never sent back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub address: String,
    /// Treatment category (e.g., "내과", "치과병원"). The catalog API calls it `treatCategory`.
    #[serde(default, alias = "treatCategory")]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub is_favorite: bool,
}

impl Facility {
    pub fn new(id: i64, name: &str, address: &str, category: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            address: address.to_string(),
            category: category.to_string(),
            coordinates: None,
            is_favorite: false,
        }
    }

    pub fn with_coordinates(mut self, lat: f64, lng: f64) -> Self {
        self.coordinates = Some(Coordinates { lat, lng });
        self
    }

    /// Whether a geocode request should be issued for this facility.
    pub fn needs_geocoding(&self) -> bool {
        self.coordinates.is_none() && !self.address.trim().is_empty()
    }
}

/// Entry of the favorites API response. Only the id is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteRef {
    pub id: i64,
}
