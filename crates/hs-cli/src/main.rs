//! Hypersearch CLI
//!
//! Native tooling for the extension's config record and rule engine.

use std::collections::HashSet;
use std::fs;

use clap::{Parser, Subcommand};

use hs_core::config::{Config, ConfigStore};
use hs_core::{migrate_legacy, validate_domain_input};

use crate::store::FileStore;

mod bench;
#[cfg(feature = "e2e")]
mod e2e;
mod simulate;
mod store;

#[derive(Parser)]
#[command(name = "hs-cli")]
#[command(about = "Hypersearch config record and rule engine tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a config record
    Validate {
        /// Config record file to validate
        #[arg(short, long)]
        input: String,
    },

    /// Fold legacy storage keys into a config record
    Migrate {
        /// JSON file holding the legacy hiddenDomains/pinnedDomains/hiddenCards keys
        #[arg(short, long)]
        input: String,

        /// Output config record file
        #[arg(short, long, default_value = "config.json")]
        output: String,
    },

    /// Replay a scan over a JSON fixture of result probes
    Simulate {
        /// Config record file
        #[arg(short, long)]
        config: String,

        /// Fixture file of result probes
        #[arg(short, long)]
        fixture: String,
    },

    /// Export TypeScript bindings for the extension's JS side
    Types {
        /// Output directory for the generated bindings
        #[arg(short, long, default_value = "bindings")]
        out_dir: String,
    },

    /// Micro-benchmark the action resolver
    Bench {
        /// Config record to benchmark against; synthesized when absent
        #[arg(short, long)]
        config: Option<String>,

        /// Synthetic rule count when no config is given
        #[arg(long, default_value_t = 50)]
        rules: usize,

        /// Synthetic results per scan
        #[arg(long, default_value_t = 30)]
        results: usize,

        /// Scan iterations
        #[arg(short, long, default_value_t = 10_000)]
        iterations: usize,

        /// Workload seed
        #[arg(long, default_value_t = 0xc0ffee)]
        seed: u32,
    },

    /// Drive a Chrome instance with the packed extension loaded
    #[cfg(feature = "e2e")]
    E2e {
        /// chromedriver endpoint
        #[arg(long, default_value = "http://localhost:9515")]
        chromedriver_url: String,

        /// Path to the unpacked extension directory
        #[arg(short, long)]
        extension: String,

        /// Search results page to scan
        #[arg(long, default_value = "https://www.google.com/search?q=rust+tutorial")]
        search_url: String,

        /// Run Chrome headless
        #[arg(long)]
        headless: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { input } => cmd_validate(&input),
        Commands::Migrate { input, output } => cmd_migrate(&input, &output),
        Commands::Simulate { config, fixture } => simulate::run(&config, &fixture),
        Commands::Types { out_dir } => cmd_types(&out_dir),
        Commands::Bench {
            config,
            rules,
            results,
            iterations,
            seed,
        } => bench::run(bench::BenchOptions {
            config_path: config,
            rules,
            results,
            iterations,
            seed,
        }),
        #[cfg(feature = "e2e")]
        Commands::E2e {
            chromedriver_url,
            extension,
            search_url,
            headless,
        } => e2e::run_e2e(e2e::E2eOptions {
            chromedriver_url,
            extension_path: extension,
            search_url,
            headless,
        }),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn cmd_validate(input: &str) -> Result<(), String> {
    let store = FileStore::new(input);
    let config = store
        .load()
        .map_err(|e| format!("Failed to load '{}': {}", input, e))?
        .ok_or_else(|| format!("No config record at '{}'", input))?;

    let pinned = config.domains.iter().filter(|r| r.opts.pinned).count();
    let strict = config.domains.iter().filter(|r| r.opts.strict).count();
    let overrides = config
        .domains
        .iter()
        .filter(|r| r.opts.override_others)
        .count();

    let mut seen = HashSet::new();
    let duplicates: Vec<&str> = config
        .domains
        .iter()
        .filter(|rule| !seen.insert(rule.domain.as_str()))
        .map(|rule| rule.domain.as_str())
        .collect();

    let invalid: Vec<String> = config
        .domains
        .iter()
        .filter_map(|rule| validate_domain_input(&rule.domain).err().map(|e| e.to_string()))
        .collect();

    println!("Config record '{}' parsed", input);
    println!(
        "  Domains:     {} ({} pinned, {} strict, {} override)",
        config.domains.len(),
        pinned,
        strict,
        overrides
    );
    println!("  Cards:       {} hidden", config.hidden_cards.iter().count());
    println!("  Debug:       {}", config.opts.debug);

    for duplicate in &duplicates {
        println!("  Warning: duplicate rule for '{}' (first one wins)", duplicate);
    }

    if invalid.is_empty() {
        Ok(())
    } else {
        Err(format!("Invalid domains:\n- {}", invalid.join("\n- ")))
    }
}

/// The record shape older builds persisted across three storage keys.
#[derive(serde::Deserialize)]
struct LegacyRecord {
    #[serde(default, rename = "hiddenDomains")]
    hidden: Vec<String>,
    #[serde(default, rename = "pinnedDomains")]
    pinned: Vec<String>,
    #[serde(default, rename = "hiddenCards")]
    cards: u32,
}

fn cmd_migrate(input: &str, output: &str) -> Result<(), String> {
    let text = fs::read_to_string(input)
        .map_err(|e| format!("Failed to read '{}': {}", input, e))?;
    let legacy: LegacyRecord = serde_json::from_str(&text)
        .map_err(|e| format!("Invalid legacy record '{}': {}", input, e))?;

    let config = migrate_legacy(&legacy.hidden, &legacy.pinned, legacy.cards);

    let store = FileStore::new(output);
    store
        .store(&config)
        .map_err(|e| format!("Failed to write '{}': {}", output, e))?;

    println!("Migrated legacy record to '{}'", output);
    println!(
        "  Hidden:   {} domains in, {} rules out",
        legacy.hidden.len(),
        config.domains.iter().filter(|r| !r.opts.pinned).count()
    );
    println!(
        "  Pinned:   {} domains in, {} rules out",
        legacy.pinned.len(),
        config.domains.iter().filter(|r| r.opts.pinned).count()
    );
    println!("  Cards:    {} hidden", config.hidden_cards.iter().count());

    Ok(())
}

fn cmd_types(out_dir: &str) -> Result<(), String> {
    use ts_rs::TS;

    Config::export_all_to(out_dir)
        .map_err(|e| format!("Failed to export bindings: {}", e))?;

    println!("Exported TypeScript bindings to '{}/'", out_dir);
    Ok(())
}
