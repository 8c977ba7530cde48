use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "bookline", version, about = "Bookline scheduling CLI")]
struct Cli {
    /// Path to the JSON item file.
    #[arg(long, global = true, default_value = "bookline.json")]
    data: PathBuf,

    /// Path to the engine configuration file.
    #[arg(long, global = true, default_value = "bookline.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Item management
    Item {
        #[command(subcommand)]
        action: commands::item::ItemAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Item { action } => commands::item::run(action, &cli.data, &cli.config),
        Commands::Config { action } => commands::config::run(action, &cli.config),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
