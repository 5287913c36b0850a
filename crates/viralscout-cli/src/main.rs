mod stages;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use viralscout_pipeline::Services;

use crate::stages::{AnalyzeArgs, ArchiveArgs, DiscoverArgs, EnrichArgs};

#[derive(Debug, Parser)]
#[command(name = "viralscout-cli")]
#[command(about = "Douyin creator discovery and virality reporting")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search videos, rank their creators and append new ones to the sheet
    Discover(DiscoverArgs),
    /// Fill in blank follower counts on the creator sheet
    Enrich(EnrichArgs),
    /// Score recent videos of the newest creators into a report worksheet
    Analyze(AnalyzeArgs),
    /// Copy videos into a new Drive folder
    Archive(ArchiveArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = viralscout_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let services = Services::from_config(&config)?;
    let output = match cli.command {
        Commands::Discover(args) => stages::run_discover(&services, args).await?,
        Commands::Enrich(args) => stages::run_enrich(&services, args).await?,
        Commands::Analyze(args) => stages::run_analyze(services, args).await?,
        Commands::Archive(args) => stages::run_archive(&services, args).await?,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

#[cfg(test)]
mod tests;
