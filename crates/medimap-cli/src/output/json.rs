use medimap_core::error::MediMapError;
use serde::Serialize;

pub fn print<T: Serialize>(value: &T) -> Result<(), MediMapError> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}
