//! Configuration management commands for the CLI.

use std::path::Path;

use bookline_core::EngineConfig;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Write a default configuration file
    Init,
}

pub fn run(action: ConfigAction, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            let config = EngineConfig::load_from(path)?;
            print!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::Init => {
            EngineConfig::default().save_to(path)?;
            println!("wrote {}", path.display());
        }
    }
    Ok(())
}
