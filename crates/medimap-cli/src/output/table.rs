use medimap_core::classify::ClassificationResult;
use medimap_core::model::Facility;
use medimap_core::{CatalogLoad, Recommendation};

pub fn print_classification(result: &ClassificationResult) {
    println!("=== {} ===\n", result.department_title);
    println!("  Urgency: {}", result.urgency_level);
    println!("  {}\n", result.description);

    if !result.matched_departments.is_empty() {
        let kind = if result.is_complex { "complex" } else { "single" };
        println!(
            "  Matched ({}): {}",
            kind,
            result.matched_departments.join(", ")
        );
    }
    println!(
        "  Facility types: {}",
        result.target_facility_types.join(", ")
    );
    if !result.name_keywords.is_empty() {
        println!("  Name keywords: {}", result.name_keywords.join(", "));
    }
    println!();
}

pub fn print_recommendation(rec: &Recommendation) {
    print_classification(&rec.classification);

    if rec.candidates.is_empty() {
        println!("  No matching facility with a known location.\n");
        return;
    }

    println!("Recommended facilities:\n");
    let max_name = rec
        .candidates
        .iter()
        .map(|c| c.facility.name.chars().count())
        .max()
        .unwrap_or(10);

    for (i, c) in rec.candidates.iter().enumerate() {
        let star = if c.facility.is_favorite { " *" } else { "" };
        println!(
            "  {}. {:<width$}  [{}] score {}{}",
            i + 1,
            c.facility.name,
            c.facility.category,
            c.score,
            star,
            width = max_name
        );
        println!("     {}", c.facility.address);
    }
    println!();
}

pub fn print_catalog_load(load: &CatalogLoad, categories: &[String]) {
    match &load.batch {
        Some(batch) => {
            println!("=== Geocode batch {} ({}) ===\n", batch.generation, batch.mode);
            println!(
                "  Resolved: {}  Failed: {}  Skipped: {}  Pending: {}",
                batch.resolved, batch.failed, batch.skipped, batch.pending
            );
            if batch.cancelled {
                println!("  Batch was cancelled before finishing.");
            }
        }
        None => {
            println!("=== Catalog {} ===\n", load.generation);
            if let Some(outcome) = load.readiness {
                println!("  Map not ready ({}), listing without coordinates.", outcome);
            }
        }
    }
    if let Some(ref e) = load.favorites_error {
        println!("  Favorites unavailable: {}", e);
    }
    if !categories.is_empty() {
        println!("  Categories: {}", categories.join(", "));
    }
    println!();

    for f in &load.facilities {
        println!("  {}", facility_line(f));
    }
    println!();
}

fn facility_line(f: &Facility) -> String {
    let location = match f.coordinates {
        Some(c) => c.to_string(),
        None => "-".into(),
    };
    let star = if f.is_favorite { " *" } else { "" };
    format!("{:>6}  {}  [{}]  {}{}", f.id, f.name, f.category, location, star)
}
