pub mod builtin;
pub mod schema;

use crate::error::MediMapError;
use schema::RuleTable;
use std::path::Path;

/// Load a rule table from a JSON file.
pub fn load_table(path: &Path) -> Result<RuleTable, MediMapError> {
    let content = std::fs::read_to_string(path).map_err(|e| MediMapError::RulesetLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_table(&content, path)
}

/// Parse a rule table from a JSON string.
pub fn parse_table(json: &str, source: &Path) -> Result<RuleTable, MediMapError> {
    let table: RuleTable = serde_json::from_str(json).map_err(|e| MediMapError::RulesetLoad {
        path: source.to_path_buf(),
        reason: e.to_string(),
    })?;
    validate_table(&table)?;
    Ok(table)
}

/// Parse a rule table from a JSON string (no file path context).
pub fn parse_table_str(json: &str) -> Result<RuleTable, MediMapError> {
    let table: RuleTable = serde_json::from_str(json).map_err(MediMapError::Json)?;
    validate_table(&table)?;
    Ok(table)
}

/// Validate that a rule table is well-formed.
pub fn validate_table(table: &RuleTable) -> Result<(), MediMapError> {
    if table.rules.is_empty() {
        return Err(MediMapError::RulesetInvalid("rules must not be empty".into()));
    }

    if table.fallback.target_types.is_empty() {
        return Err(MediMapError::RulesetInvalid(
            "fallback target_types must not be empty".into(),
        ));
    }

    if table.escalation_type.trim().is_empty() {
        return Err(MediMapError::RulesetInvalid(
            "escalation_type must not be empty".into(),
        ));
    }

    for (i, rule) in table.rules.iter().enumerate() {
        if rule.department.trim().is_empty() {
            return Err(MediMapError::RulesetInvalid(format!(
                "rule #{} has an empty department",
                i + 1
            )));
        }

        if rule.keywords.is_empty() {
            return Err(MediMapError::RulesetInvalid(format!(
                "department '{}' has no keywords",
                rule.department
            )));
        }

        // An empty keyword would match every input.
        if rule.keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(MediMapError::RulesetInvalid(format!(
                "department '{}' has a blank keyword",
                rule.department
            )));
        }

        if rule.target_types.is_empty() {
            return Err(MediMapError::RulesetInvalid(format!(
                "department '{}' has no target facility types",
                rule.department
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn table_json(rules: &str) -> String {
        format!(
            r#"{{
            "name": "Test",
            "version": "1.0",
            "fallback": {{ "title": "Nearby", "description": "General care", "target_types": ["hospital"] }},
            "messages": {{
                "emergency_title": "Emergency",
                "emergency_description": "Go now",
                "urgent_qualifier": "(after hours)",
                "urgent_title": "After hours",
                "urgent_description": "Open late",
                "complex_description": "Several symptoms",
                "specialist_suffix": " specialist first"
            }},
            "escalation_type": "general-hospital",
            "rules": {rules}
        }}"#
        )
    }

    #[test]
    fn test_parse_valid_table() {
        let json = table_json(
            r#"[{ "keywords": ["tooth"], "department": "dental", "description": "Teeth",
                  "target_types": ["dental"], "urgency": "NORMAL" }]"#,
        );
        let table = parse_table_str(&json).unwrap();
        assert_eq!(table.name, "Test");
        assert_eq!(table.rules.len(), 1);
        assert!(table.triage_labels.is_empty());
    }

    #[test]
    fn test_empty_rules_rejected() {
        assert!(parse_table_str(&table_json("[]")).is_err());
    }

    #[test]
    fn test_blank_keyword_rejected() {
        let json = table_json(
            r#"[{ "keywords": ["tooth", " "], "department": "dental", "description": "Teeth",
                  "target_types": ["dental"], "urgency": "NORMAL" }]"#,
        );
        assert!(parse_table_str(&json).is_err());
    }

    #[test]
    fn test_missing_target_types_rejected() {
        let json = table_json(
            r#"[{ "keywords": ["tooth"], "department": "dental", "description": "Teeth",
                  "target_types": [], "urgency": "NORMAL" }]"#,
        );
        assert!(parse_table_str(&json).is_err());
    }

    #[test]
    fn test_unknown_urgency_rejected() {
        let json = table_json(
            r#"[{ "keywords": ["tooth"], "department": "dental", "description": "Teeth",
                  "target_types": ["dental"], "urgency": "SOON" }]"#,
        );
        assert!(matches!(parse_table_str(&json), Err(MediMapError::Json(_))));
    }

    #[test]
    fn test_load_table_from_file() {
        let json = table_json(
            r#"[{ "keywords": ["ear"], "department": "ent", "description": "Ears",
                  "target_types": ["ent"], "urgency": "URGENT" }]"#,
        );
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let table = load_table(file.path()).unwrap();
        assert_eq!(table.rules[0].department, "ent");
    }

    #[test]
    fn test_load_missing_file_reports_path() {
        let err = load_table(Path::new("/nonexistent/rules.json")).unwrap_err();
        assert!(matches!(err, MediMapError::RulesetLoad { .. }));
        assert!(err.to_string().contains("/nonexistent/rules.json"));
    }
}
