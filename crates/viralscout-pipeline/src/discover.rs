//! Discovery: search, rank creators by their best video's velocity, and
//! append creators not yet in the sheet.

use std::collections::HashSet;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use viralscout_core::creator::SEC_UID_COLUMN;
use viralscout_core::{rank_creators, Creator, CREATOR_SHEET_HEADERS};

use crate::error::PipelineError;
use crate::ports::StoreError;
use crate::services::Services;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DiscoverRequest {
    pub search_terms: Vec<String>,
    pub spreadsheet_id: String,
    pub sheet_name: String,
    #[serde(default = "default_max_videos_per_term")]
    pub max_videos_per_term: u32,
    #[serde(default = "default_top_creators_to_rank")]
    pub top_creators_to_rank: usize,
}

fn default_max_videos_per_term() -> u32 {
    100
}

fn default_top_creators_to_rank() -> usize {
    20
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoverResponse {
    pub message: String,
    pub new_creators_added: usize,
    pub top_ranked_sec_uids: Vec<String>,
}

/// Run discovery with the current time.
///
/// # Errors
///
/// See [`discover_creators_at`].
pub async fn discover_creators(
    services: &Services,
    request: &DiscoverRequest,
) -> Result<DiscoverResponse, PipelineError> {
    discover_creators_at(services, request, Utc::now().timestamp()).await
}

/// Run discovery, scoring every video against the same `now`.
///
/// # Errors
///
/// - [`PipelineError::InvalidInput`] for an empty term list.
/// - [`PipelineError::Config`] when the search provider or the sheet store
///   is not configured.
/// - [`PipelineError::Upstream`] when the search fails; nothing is written.
/// - [`PipelineError::NotFound`] / [`PipelineError::Store`] for sheet
///   failures.
pub async fn discover_creators_at(
    services: &Services,
    request: &DiscoverRequest,
    now: i64,
) -> Result<DiscoverResponse, PipelineError> {
    if request.search_terms.is_empty() {
        return Err(PipelineError::InvalidInput(
            "The 'search_terms' list cannot be empty.".to_owned(),
        ));
    }
    let search = services.search()?;
    let store = services.store()?;

    tracing::info!(
        terms = request.search_terms.len(),
        max_videos_per_term = request.max_videos_per_term,
        "discovery: searching"
    );
    let videos = search
        .search_videos(&request.search_terms, request.max_videos_per_term)
        .await
        .map_err(|source| PipelineError::Upstream {
            context: "Failed to fetch data from the search provider".to_owned(),
            source,
        })?;

    let ranked = rank_creators(&videos, now, request.top_creators_to_rank);
    tracing::info!(videos = videos.len(), ranked = ranked.len(), "discovery: ranked creators");

    let spreadsheet_id = request.spreadsheet_id.as_str();
    let sheet = request.sheet_name.as_str();

    let records = match store.get_all_records(spreadsheet_id, sheet).await {
        Ok(records) => records,
        Err(StoreError::WorksheetNotFound(_)) => {
            tracing::info!(sheet, "discovery: creating creator sheet");
            store
                .add_worksheet(spreadsheet_id, sheet, 1, CREATOR_SHEET_HEADERS.len())
                .await
                .map_err(|e| sheet_write_error("create the creator sheet", e))?;
            let headers: Vec<serde_json::Value> =
                CREATOR_SHEET_HEADERS.iter().map(|h| (*h).into()).collect();
            store
                .append_rows(spreadsheet_id, sheet, &[headers])
                .await
                .map_err(|e| sheet_write_error("write the header row", e))?;
            Vec::new()
        }
        Err(e) => return Err(PipelineError::sheet_read(spreadsheet_id, sheet, e)),
    };

    let mut existing: HashSet<String> = records
        .iter()
        .filter_map(|r| r.get(SEC_UID_COLUMN).cloned())
        .collect();
    tracing::info!(existing = existing.len(), "discovery: existing creators");

    let mut new_rows = Vec::new();
    let mut top_ranked_sec_uids = Vec::with_capacity(ranked.len());
    for author in &ranked {
        let Some(sec_uid) = author.known_sec_uid() else {
            continue;
        };
        top_ranked_sec_uids.push(sec_uid.to_owned());
        if existing.insert(sec_uid.to_owned()) {
            let creator = Creator::discovered(author.name.clone().unwrap_or_default(), sec_uid);
            new_rows.push(creator.to_row());
        } else {
            tracing::debug!(sec_uid, "discovery: creator already present");
        }
    }

    if new_rows.is_empty() {
        tracing::info!("discovery: no new creators to append");
    } else {
        store
            .append_rows(spreadsheet_id, sheet, &new_rows)
            .await
            .map_err(|e| sheet_write_error("append new creators", e))?;
        tracing::info!(added = new_rows.len(), sheet, "discovery: appended creators");
    }

    Ok(DiscoverResponse {
        message: format!("Process complete. Identified {} top creators.", ranked.len()),
        new_creators_added: new_rows.len(),
        top_ranked_sec_uids,
    })
}

fn sheet_write_error(action: &str, source: StoreError) -> PipelineError {
    PipelineError::Store {
        context: format!("Failed to {action}"),
        source,
    }
}

#[cfg(test)]
#[path = "discover_test.rs"]
mod tests;
