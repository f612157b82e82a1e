//! graphcrawl CLI
//!
//! Local execution entry point.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use log::LevelFilter;
use graphcrawl::{
    error::Result,
    models::{AddressFields, Config, SourceRecord},
    pipeline,
    services::{AddressBuilder, CountryRegistry},
    storage::{EntityStorage, LocalStorage},
};

/// graphcrawl - Address identity and data assertions for entity datasets
#[derive(Parser, Debug)]
#[command(name = "graphcrawl", version, about = "Entity dataset ingestion")]
struct Cli {
    /// Path to the dataset configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ingest source records and write the entity snapshot
    Ingest {
        /// JSON array of source records
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Build a single address and print it as JSON
    Address(AddressArgs),

    /// Validate the configuration and list assertions
    Validate,

    /// Show current snapshot info
    Info,
}

#[derive(Args, Debug)]
struct AddressArgs {
    #[arg(long)]
    full: Option<String>,
    #[arg(long)]
    remarks: Option<String>,
    #[arg(long)]
    summary: Option<String>,
    #[arg(long)]
    po_box: Option<String>,
    #[arg(long)]
    street: Option<String>,
    #[arg(long)]
    street2: Option<String>,
    #[arg(long)]
    street3: Option<String>,
    #[arg(long)]
    city: Option<String>,
    #[arg(long)]
    place: Option<String>,
    #[arg(long)]
    postal_code: Option<String>,
    #[arg(long)]
    region: Option<String>,
    #[arg(long)]
    state: Option<String>,
    #[arg(long)]
    country: Option<String>,
    #[arg(long)]
    country_code: Option<String>,
    #[arg(long)]
    key: Option<String>,
}

impl From<AddressArgs> for AddressFields {
    fn from(args: AddressArgs) -> Self {
        AddressFields {
            full: args.full,
            remarks: args.remarks,
            summary: args.summary,
            po_box: args.po_box,
            street: args.street,
            street2: args.street2,
            street3: args.street3,
            city: args.city,
            place: args.place,
            postal_code: args.postal_code,
            region: args.region,
            state: args.state,
            country: args.country,
            country_code: args.country_code,
            key: args.key,
        }
    }
}

/// Initialize logging. RUST_LOG wins when set; otherwise the level starts
/// at `info` until the config is loaded.
fn init_logging() -> bool {
    let from_env = std::env::var_os(env_logger::DEFAULT_FILTER_ENV).is_some();
    env_logger::Builder::new()
        .filter_level(LevelFilter::Trace)
        .parse_env(env_logger::Env::default())
        .format_timestamp_secs()
        .init();
    if !from_env {
        log::set_max_level(LevelFilter::Info);
    }
    from_env
}

/// Apply the configured level unless RUST_LOG already decided it.
fn apply_log_level(verbose: bool, configured: &str) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        configured.parse().unwrap_or_else(|_| {
            log::warn!("Unknown log level {:?}, using info", configured);
            LevelFilter::Info
        })
    };
    log::set_max_level(level);
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let from_env = init_logging();

    let config = Config::load_or_default(&cli.config);
    if !from_env {
        apply_log_level(cli.verbose, &config.logging.level);
    }
    log::debug!("Using configuration from {}", cli.config.display());

    let storage = LocalStorage::new(&config.paths.output_dir);

    match cli.command {
        Command::Ingest { input } => {
            let records = SourceRecord::load_all(&input)?;
            log::info!("Loaded {} records from {}", records.len(), input.display());

            let summary = pipeline::run_ingest(&config, &storage, &records).await?;
            log::info!(
                "Wrote {} entities to {}",
                summary.entity_count,
                summary.write.location
            );
        }

        Command::Address(args) => {
            let builder = AddressBuilder::for_dataset(&config.dataset)?;
            let address = builder.build(args.into());
            println!("{}", serde_json::to_string_pretty(&address)?);
        }

        Command::Validate => {
            pipeline::run_validate(&config)?;
            log::info!("All validations passed!");
        }

        Command::Info => {
            log::info!("Dataset: {}", config.dataset.name);
            if let Some(title) = &config.dataset.title {
                log::info!("Title: {}", title);
            }
            log::info!("Output directory: {}", storage.root_dir().display());

            match storage.load_stats().await? {
                Some(stats) => {
                    if let Some(updated) = stats.updated_at {
                        log::info!("Last updated: {}", updated);
                    }
                    log::info!("Entities: {}", stats.entity_count);
                    for (schema, count) in &stats.schemata {
                        log::info!("  {}: {}", schema, count);
                    }
                    let countries = CountryRegistry::shared();
                    for (code, count) in &stats.countries {
                        let label = countries.label(code).unwrap_or("unknown");
                        log::info!("  {} ({}): {}", code, label, count);
                    }
                }
                None => log::info!("No snapshot found yet."),
            }
        }
    }

    log::info!("Done!");

    Ok(())
}
