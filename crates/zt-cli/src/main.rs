//! ZenTube CLI
//!
//! Developer tooling: inspect the suppression rules, evaluate a storage
//! export, and smoke-test the packaged extension.

#[cfg(feature = "e2e")]
mod e2e;
mod prefs;

use clap::{Parser, Subcommand};

use zt_core::rules::{rule_for, BODY_SELECTOR, PRIMARY_CONTAINER_SELECTOR, VIDEO_SELECTORS};
use zt_core::url::TARGET_ORIGINS;
use zt_core::Flag;

#[derive(Parser)]
#[command(name = "zt-cli")]
#[command(about = "ZenTube extension tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the flag, storage key and selector table
    Rules,

    /// Evaluate a JSON export of the synced storage area
    Prefs {
        /// JSON file with storage key to boolean entries
        #[arg(short, long)]
        input: String,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Load the unpacked extension in Chrome and run smoke checks
    #[cfg(feature = "e2e")]
    E2e {
        /// WebDriver endpoint
        #[arg(long, default_value = "http://localhost:9515")]
        chromedriver: String,

        /// Unpacked extension directory
        #[arg(short, long)]
        extension: String,

        /// Run Chrome headless
        #[arg(long)]
        headless: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Rules => cmd_rules(),
        Commands::Prefs { input, json } => prefs::cmd_prefs(&input, json),
        #[cfg(feature = "e2e")]
        Commands::E2e {
            chromedriver,
            extension,
            headless,
        } => e2e::run_e2e(e2e::E2eOptions {
            chromedriver_url: chromedriver,
            extension_path: extension,
            headless,
        }),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn cmd_rules() -> Result<(), String> {
    println!("{:<26} {:<24} {}", "Flag", "Storage key", "Selector");
    for flag in Flag::ALL {
        let selector = rule_for(flag).map(|rule| rule.selector).unwrap_or("-");
        println!("{:<26} {:<24} {}", flag.name(), flag.storage_key(), selector);
    }
    println!();
    println!("Observed root:  {} (fallback {})", PRIMARY_CONTAINER_SELECTOR, BODY_SELECTOR);
    println!("Video:          {}", VIDEO_SELECTORS.join(", then "));
    println!("Target origins: {}", TARGET_ORIGINS.join(", "));
    Ok(())
}
