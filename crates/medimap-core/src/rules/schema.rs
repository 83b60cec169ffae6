use crate::model::UrgencyLevel;
use serde::{Deserialize, Serialize};

/// A symptom rule table: keyword rules plus the fixed texts used when
/// composing a classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleTable {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub version: String,
    pub fallback: FallbackDef,
    pub messages: TriageMessages,
    /// Facility type added to the targets whenever urgency is above normal.
    pub escalation_type: String,
    /// Department names that are triage labels rather than real departments.
    #[serde(default)]
    pub triage_labels: Vec<String>,
    pub rules: Vec<SymptomRule>,
}

impl RuleTable {
    pub fn is_triage_label(&self, department: &str) -> bool {
        self.triage_labels.iter().any(|l| l == department)
    }
}

/// A single keyword rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymptomRule {
    /// Matched as plain, case-sensitive substrings of the input text.
    pub keywords: Vec<String>,
    pub department: String,
    pub description: String,
    pub target_types: Vec<String>,
    pub urgency: UrgencyLevel,
}

/// Result used when no rule matches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackDef {
    pub title: String,
    pub description: String,
    pub target_types: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageMessages {
    pub emergency_title: String,
    pub emergency_description: String,
    /// Appended to the department list for urgent outcomes.
    pub urgent_qualifier: String,
    /// Title for urgent outcomes where only triage labels matched.
    pub urgent_title: String,
    pub urgent_description: String,
    pub complex_description: String,
    /// Appended to the single matched rule's description.
    pub specialist_suffix: String,
}
