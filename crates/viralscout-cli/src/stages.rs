//! Stage command handlers for the CLI.
//!
//! Each handler maps its flags onto the stage request, runs the stage and
//! hands back the output as JSON for `main` to print.

use clap::Args;
use viralscout_pipeline::{
    AnalyzeRequest, ArchiveRequest, DiscoverRequest, EnrichRequest, Services,
};

/// Flags shared by every stage that reads the creator sheet.
#[derive(Debug, Args)]
pub struct SheetArgs {
    /// Spreadsheet identifier
    #[arg(long, env = "VIRALSCOUT_SPREADSHEET_ID")]
    pub spreadsheet_id: String,
    /// Worksheet holding the creator table
    #[arg(long, default_value = "Creators")]
    pub sheet_name: String,
}

#[derive(Debug, Args)]
pub struct DiscoverArgs {
    /// Search term; repeat for several
    #[arg(long = "term", required = true)]
    pub terms: Vec<String>,
    #[command(flatten)]
    pub sheet: SheetArgs,
    /// Videos requested per term
    #[arg(long, default_value_t = 100)]
    pub max_videos_per_term: u32,
    /// Number of creators to rank
    #[arg(long, default_value_t = 20)]
    pub top: usize,
}

#[derive(Debug, Args)]
pub struct EnrichArgs {
    #[command(flatten)]
    pub sheet: SheetArgs,
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub sheet: SheetArgs,
    /// Override `VIRALSCOUT_ANALYSIS_MAX_CREATORS`
    #[arg(long)]
    pub max_creators: Option<usize>,
    /// Override `VIRALSCOUT_ANALYSIS_VIDEOS_PER_CREATOR`
    #[arg(long)]
    pub videos_per_creator: Option<u32>,
}

#[derive(Debug, Args)]
pub struct ArchiveArgs {
    /// Drive folder the new archive folder is created in
    #[arg(long)]
    pub parent_folder_id: String,
    /// Video identifier; repeat for several
    #[arg(long = "video-id", required = true)]
    pub video_ids: Vec<String>,
}

pub(crate) async fn run_discover(
    services: &Services,
    args: DiscoverArgs,
) -> anyhow::Result<serde_json::Value> {
    let request = DiscoverRequest {
        search_terms: args.terms,
        spreadsheet_id: args.sheet.spreadsheet_id,
        sheet_name: args.sheet.sheet_name,
        max_videos_per_term: args.max_videos_per_term,
        top_creators_to_rank: args.top,
    };
    tracing::info!(terms = request.search_terms.len(), "discover: starting");
    let output = viralscout_pipeline::discover_creators(services, &request).await?;
    tracing::info!(added = output.new_creators_added, "discover: complete");
    Ok(serde_json::to_value(output)?)
}

pub(crate) async fn run_enrich(
    services: &Services,
    args: EnrichArgs,
) -> anyhow::Result<serde_json::Value> {
    let request = EnrichRequest {
        spreadsheet_id: args.sheet.spreadsheet_id,
        sheet_name: args.sheet.sheet_name,
    };
    tracing::info!(sheet = %request.sheet_name, "enrich: starting");
    let output = viralscout_pipeline::update_follower_counts(services, &request).await?;
    tracing::info!(
        updated = output.users_updated,
        failed = output.users_failed,
        "enrich: complete"
    );
    Ok(serde_json::to_value(output)?)
}

pub(crate) async fn run_analyze(
    mut services: Services,
    args: AnalyzeArgs,
) -> anyhow::Result<serde_json::Value> {
    if let Some(n) = args.max_creators {
        services.settings.max_creators = n;
    }
    if let Some(n) = args.videos_per_creator {
        services.settings.videos_per_creator = n;
    }
    let request = AnalyzeRequest {
        spreadsheet_id: args.sheet.spreadsheet_id,
        sheet_name: args.sheet.sheet_name,
    };
    tracing::info!(
        max_creators = services.settings.max_creators,
        videos_per_creator = services.settings.videos_per_creator,
        "analyze: starting"
    );
    let output = viralscout_pipeline::analyze_and_report(&services, &request).await?;
    tracing::info!(videos = output.videos_processed, "analyze: complete");
    Ok(serde_json::to_value(output)?)
}

pub(crate) async fn run_archive(
    services: &Services,
    args: ArchiveArgs,
) -> anyhow::Result<serde_json::Value> {
    let request = ArchiveRequest {
        parent_folder_id: args.parent_folder_id,
        video_ids: args.video_ids,
    };
    tracing::info!(videos = request.video_ids.len(), "archive: starting");
    let output = viralscout_pipeline::archive_videos(services, &request).await?;
    let failed = output
        .download_results
        .iter()
        .filter(|r| r.status == viralscout_pipeline::ItemStatus::Failed)
        .count();
    tracing::info!(failed, "archive: complete");
    Ok(serde_json::to_value(output)?)
}
