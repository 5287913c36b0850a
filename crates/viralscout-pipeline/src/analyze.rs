//! Analysis: score the recent videos of the most recently added creators and
//! write them, best first, to a new report worksheet.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use viralscout_core::creator::{
    parse_follower_count, ACCOUNT_LINK_COLUMN, FOLLOWER_COUNT_COLUMN, NAME_COLUMN, SEC_UID_COLUMN,
};
use viralscout_core::{Creator, ReportRow, REPORT_HEADERS};
use viralscout_google::ValueInput;

use crate::error::PipelineError;
use crate::ports::{Record, StoreError};
use crate::services::Services;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalyzeRequest {
    pub spreadsheet_id: String,
    pub sheet_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub message: String,
    pub videos_processed: usize,
    pub report_sheet_url: String,
}

/// # Errors
///
/// See [`analyze_and_report_at`].
pub async fn analyze_and_report(
    services: &Services,
    request: &AnalyzeRequest,
) -> Result<AnalyzeResponse, PipelineError> {
    analyze_and_report_at(services, request, Utc::now()).await
}

/// Run analysis with a fixed clock. `now` is used both for scoring and for
/// the report worksheet title.
///
/// # Errors
///
/// - [`PipelineError::Config`] when the provider or sheet store is not
///   configured.
/// - [`PipelineError::NotFound`] when the sheet is missing, has no creator
///   rows, or none of the selected creators yields a scorable video.
/// - [`PipelineError::Upstream`] on the first failed video lookup.
/// - [`PipelineError::Store`] when the sheet cannot be read or the report
///   cannot be written.
pub async fn analyze_and_report_at(
    services: &Services,
    request: &AnalyzeRequest,
    now: DateTime<Utc>,
) -> Result<AnalyzeResponse, PipelineError> {
    let store = services.store()?;
    let provider = services.provider()?;
    let settings = services.settings;
    let spreadsheet_id = request.spreadsheet_id.as_str();
    let sheet = request.sheet_name.as_str();
    let ts = now.timestamp();
    let per_creator = usize::try_from(settings.videos_per_creator).unwrap_or(usize::MAX);

    let records = store
        .get_all_records(spreadsheet_id, sheet)
        .await
        .map_err(|e| PipelineError::sheet_read(spreadsheet_id, sheet, e))?;
    if records.is_empty() {
        return Err(PipelineError::NotFound(
            "The source sheet contains no user data.".to_owned(),
        ));
    }

    // Newest rows are at the bottom of the sheet.
    let selected = &records[records.len().saturating_sub(settings.max_creators)..];
    tracing::info!(selected = selected.len(), "analysis: selected creators");

    let mut report = Vec::new();
    for record in selected {
        let Some(creator) = creator_from_record(record) else {
            tracing::warn!(
                name = record.get(NAME_COLUMN).map_or("", String::as_str),
                "analysis: skipping creator without id or follower count"
            );
            continue;
        };

        let videos = provider
            .recent_videos(&creator.sec_uid, settings.videos_per_creator)
            .await
            .map_err(|source| PipelineError::Upstream {
                context: format!("Failed to fetch videos for creator {}", creator.sec_uid),
                source,
            })?;
        tracing::debug!(sec_uid = %creator.sec_uid, videos = videos.len(), "analysis: fetched videos");

        report.extend(
            videos
                .iter()
                .take(per_creator)
                .filter_map(|v| ReportRow::build(&creator, v, ts)),
        );
    }

    if report.is_empty() {
        return Err(PipelineError::NotFound(
            "Could not fetch or process any videos for the selected users.".to_owned(),
        ));
    }

    // Stable: equal scores keep fetch order.
    report.sort_by(|a, b| b.virality_score.total_cmp(&a.virality_score));

    let title = format!("VideoReport_{}", now.format("%Y%m%d_%H%M%S"));
    let sheet_id = store
        .add_worksheet(spreadsheet_id, &title, report.len() + 1, REPORT_HEADERS.len())
        .await
        .map_err(report_write_error)?;

    // RAW keeps 19-digit ids exact and stops descriptions evaluating as formulas.
    let headers: Vec<serde_json::Value> = REPORT_HEADERS.iter().map(|h| (*h).into()).collect();
    store
        .update_values(spreadsheet_id, &title, "A1", &[headers], ValueInput::Raw)
        .await
        .map_err(report_write_error)?;
    let rows: Vec<Vec<serde_json::Value>> = report.iter().map(ReportRow::to_row).collect();
    store
        .update_values(spreadsheet_id, &title, "A2", &rows, ValueInput::Raw)
        .await
        .map_err(report_write_error)?;

    let report_sheet_url =
        format!("https://docs.google.com/spreadsheets/d/{spreadsheet_id}/edit#gid={sheet_id}");
    tracing::info!(videos = report.len(), %report_sheet_url, "analysis: report written");

    Ok(AnalyzeResponse {
        message: "Successfully generated video virality report.".to_owned(),
        videos_processed: report.len(),
        report_sheet_url,
    })
}

/// A creator with an identifier and a positive follower count, or `None`.
fn creator_from_record(record: &Record) -> Option<Creator> {
    let field = |name: &str| record.get(name).cloned().unwrap_or_default();

    let sec_uid = field(SEC_UID_COLUMN);
    if sec_uid.is_empty() {
        return None;
    }
    let follower_count = record
        .get(FOLLOWER_COUNT_COLUMN)
        .map(String::as_str)
        .and_then(parse_follower_count)
        .filter(|n| *n > 0)?;

    Some(Creator {
        name: field(NAME_COLUMN),
        account_link: field(ACCOUNT_LINK_COLUMN),
        sec_uid,
        follower_count: Some(follower_count),
    })
}

fn report_write_error(source: StoreError) -> PipelineError {
    PipelineError::Store {
        context: "Failed to write the report to Google Sheets".to_owned(),
        source,
    }
}

#[cfg(test)]
#[path = "analyze_test.rs"]
mod tests;
