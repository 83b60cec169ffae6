use medimap_core::error::MediMapError;
use medimap_core::model::UrgencyLevel;
use medimap_core::rules::builtin;
use std::path::Path;

pub fn list() -> Result<(), MediMapError> {
    println!("Available predefined rule tables:\n");
    for name in builtin::PRESETS {
        let table = builtin::load_preset(name)?;
        println!(
            "  {:<8} {} (v{}), {} rules",
            name,
            table.name,
            table.version,
            table.rules.len()
        );
        if let Some(ref desc) = table.description {
            println!("           {}", desc);
        }
        println!();
    }
    Ok(())
}

pub fn explain(preset: &str) -> Result<(), MediMapError> {
    let table = builtin::load_preset(preset)?;

    println!("{} (version {})\n", table.name, table.version);

    if let Some(ref desc) = table.description {
        println!("{}\n", desc);
    }

    println!(
        "A description matches every rule with at least one keyword in the text.\n\
         The most severe urgency among matched rules decides the result.\n"
    );

    for level in [UrgencyLevel::Emergency, UrgencyLevel::Urgent, UrgencyLevel::Normal] {
        let rules: Vec<_> = table.rules.iter().filter(|r| r.urgency == level).collect();
        if rules.is_empty() {
            continue;
        }
        println!("{}:", level);
        for rule in rules {
            println!("  {}", rule.department);
            println!("    keywords:   {}", rule.keywords.join(", "));
            println!("    facilities: {}", rule.target_types.join(", "));
        }
        println!();
    }

    println!(
        "Urgent and emergency results list '{}' first.",
        table.escalation_type
    );
    println!(
        "No match: '{}' ({}).",
        table.fallback.title,
        table.fallback.target_types.join(", ")
    );
    println!();

    Ok(())
}

pub fn validate(file: &Path) -> Result<(), MediMapError> {
    let table = medimap_core::rules::load_table(file)?;

    println!("Rule table '{}' (v{}) is valid.", table.name, table.version);
    println!("  Rules: {}", table.rules.len());
    println!("  Fallback: {}", table.fallback.target_types.join(", "));

    // Potential issues (warnings, not errors)
    let mut warnings = Vec::new();
    for (i, rule) in table.rules.iter().enumerate() {
        for other in &table.rules[i + 1..] {
            for keyword in &rule.keywords {
                if other.keywords.contains(keyword) {
                    warnings.push(format!(
                        "keyword '{}' is shared by '{}' and '{}'",
                        keyword, rule.department, other.department
                    ));
                }
            }
        }
    }

    if !warnings.is_empty() {
        println!("\nWarnings:");
        for w in &warnings {
            println!("  - {}", w);
        }
    }

    Ok(())
}
