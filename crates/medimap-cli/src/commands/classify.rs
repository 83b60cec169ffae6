use medimap_core::error::MediMapError;
use std::path::PathBuf;

use crate::output;

pub fn run(text: &str, rules: Option<PathBuf>, output_format: &str) -> Result<(), MediMapError> {
    if text.trim().is_empty() {
        return Err(MediMapError::EmptySymptoms);
    }

    let table = super::load_rules(rules)?;
    let result = medimap_core::classify::classify(text, &table);

    match output_format {
        "json" => output::json::print(&result)?,
        _ => output::table::print_classification(&result),
    }

    Ok(())
}
