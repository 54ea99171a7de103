//! vpes - Vehicle price extraction for the Singapore car catalogue
//!
//! Scrapes new and used listings, classifies each into a COE category and
//! prices it with the current COE premium.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;
use vpes::coe::fetch_benchmark;
use vpes::commands::{load_brands, run_annotations, NewCarsCommand, UsedCarsCommand};
use vpes::config::{Config, OutputFormat};
use vpes::format::Formatter;
use vpes::listing::{FuelType, Report};
use vpes::sgcarmart::{Catalogue, CatalogueClient, CatalogueParser, UsedGroup};

#[derive(Parser)]
#[command(
    name = "vpes",
    version,
    about = "Vehicle price extraction with COE category pricing",
    long_about = "Scrapes the new and used car catalogues, assigns each listing a COE category and reports its price including COE."
)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Write the report to this file instead of stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Proxy URL (e.g., socks5://host:port)
    #[arg(long, global = true, env = "VPES_PROXY")]
    proxy: Option<String>,

    /// Delay between requests in milliseconds
    #[arg(long, global = true, env = "VPES_DELAY")]
    delay: Option<u64>,

    /// Attempts per detail page before it becomes a NIL row
    #[arg(long, global = true)]
    retries: Option<u32>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape the new-car catalogue
    #[command(alias = "n")]
    New {
        /// Fuel types to scrape (comma-separated, default all)
        #[arg(long, value_delimiter = ',')]
        fuel: Vec<FuelType>,

        /// Maximum pages per query
        #[arg(long)]
        pages: Option<u32>,
    },

    /// Scrape the used-car catalogue
    #[command(alias = "u")]
    Used {
        /// Groups to scrape: petrol, hybrid, ev (comma-separated, default all)
        #[arg(long, value_delimiter = ',')]
        group: Vec<UsedGroup>,

        /// Maximum listing pages per group
        #[arg(long)]
        pages: Option<u32>,

        /// Maximum listings per group
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// List catalogue brands in matching order
    Brands,

    /// Show the latest COE premiums
    Coe,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    // Apply CLI overrides
    if let Some(format) = cli.format {
        config.format = format;
    }
    if let Some(output) = cli.output {
        config.output = Some(output);
    }
    if let Some(proxy) = cli.proxy {
        config.proxy = Some(proxy);
    }
    if let Some(delay) = cli.delay {
        config.delay_ms = delay;
    }
    if let Some(retries) = cli.retries {
        config.max_retries = retries;
    }

    let output_path = config.output.clone();

    let output = match cli.command {
        Commands::New { fuel, pages } => {
            NewCarsCommand::new(config).with_fuels(fuel).with_max_pages(pages).execute().await?
        }

        Commands::Used { group, pages, limit } => {
            UsedCarsCommand::new(config)
                .with_groups(group)
                .with_max_pages(pages)
                .with_limit(limit)
                .execute()
                .await?
        }

        Commands::Brands => {
            let client =
                CatalogueClient::new(&config).await.context("Failed to create HTTP client")?;
            let catalogue = Catalogue::new(&config.catalogue_base_url);
            let parser = CatalogueParser::new(catalogue.clone());

            let brands = load_brands(&client, &catalogue, &parser).await;
            Formatter::new(config.format).format_list("Brands", brands.brands())
        }

        Commands::Coe => {
            let client =
                CatalogueClient::new(&config).await.context("Failed to create HTTP client")?;
            let benchmark = fetch_benchmark(&client, &config.benchmark_url)
                .await
                .context("Failed to fetch COE results")?;

            let report =
                Report { groups: Vec::new(), annotations: run_annotations(Some(&benchmark)) };
            Formatter::new(config.format).format_report(&report)
        }
    };

    write_output(output_path.as_deref(), &output)
}

fn write_output(path: Option<&Path>, output: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, output)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            info!("Report written to {}", path.display());
        }
        None => println!("{}", output),
    }
    Ok(())
}
