//! CLI subcommand implementations.

pub mod config;
pub mod item;

use std::path::Path;

use bookline_core::SchedulableItem;

/// Load the item collection from the JSON data file. A missing file is an
/// empty collection.
pub fn load_items(path: &Path) -> Result<Vec<SchedulableItem>, Box<dyn std::error::Error>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Persist the item collection back to the JSON data file.
pub fn save_items(path: &Path, items: &[SchedulableItem]) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::write(path, serde_json::to_string_pretty(items)?)?;
    Ok(())
}
