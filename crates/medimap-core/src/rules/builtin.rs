use crate::error::MediMapError;
use crate::rules::schema::RuleTable;

const SYMPTOM_TRIAGE_JSON: &str = include_str!("../../../../rules/symptom-triage.json");

/// Available predefined rule tables.
pub const PRESETS: &[&str] = &["default"];

/// Load a predefined rule table by name.
pub fn load_preset(name: &str) -> Result<RuleTable, MediMapError> {
    match name {
        "default" => {
            let table: RuleTable = serde_json::from_str(SYMPTOM_TRIAGE_JSON)?;
            Ok(table)
        }
        _ => Err(MediMapError::RulesetInvalid(format!(
            "unknown preset '{}'. Available: {}",
            name,
            PRESETS.join(", ")
        ))),
    }
}

/// The built-in rule table.
pub fn default_table() -> Result<RuleTable, MediMapError> {
    load_preset("default")
}
