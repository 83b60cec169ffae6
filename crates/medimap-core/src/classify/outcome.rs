use crate::model::UrgencyLevel;
use serde::{Deserialize, Serialize};

/// Triage outcome for one symptom description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Headline shown to the user (department list or a fixed tier title).
    pub department_title: String,
    pub description: String,
    pub urgency_level: UrgencyLevel,
    /// True if more than one rule matched.
    pub is_complex: bool,
    /// Catalog categories considered relevant, deduplicated, in insertion order.
    pub target_facility_types: Vec<String>,
    /// Department tokens searched for in facility names.
    pub name_keywords: Vec<String>,
    /// Departments of the matched rules, in table order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matched_departments: Vec<String>,
}

impl ClassificationResult {
    pub fn is_fallback(&self) -> bool {
        self.matched_departments.is_empty()
    }
}
