//! Enrichment: fill in blank follower counts on the creator sheet.
//!
//! Only rows whose follower cell is blank are touched, so a count that is
//! already present is never overwritten. Lookups run one at a time and a
//! failed lookup is counted rather than aborting the batch. All counts are
//! written back in a single batch update.

use serde::{Deserialize, Serialize};
use viralscout_core::creator::{FOLLOWER_COUNT_COLUMN, SEC_UID_COLUMN};
use viralscout_google::CellUpdate;

use crate::error::PipelineError;
use crate::outcome::Tally;
use crate::services::Services;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EnrichRequest {
    pub spreadsheet_id: String,
    pub sheet_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichResponse {
    pub message: String,
    pub users_checked: usize,
    pub users_updated: usize,
    pub users_failed: usize,
}

impl EnrichResponse {
    fn from_tally(message: &str, tally: Tally) -> Self {
        Self {
            message: message.to_owned(),
            users_checked: tally.checked,
            users_updated: tally.updated,
            users_failed: tally.failed,
        }
    }
}

/// A creator row waiting for a follower count.
struct Pending<'a> {
    row: usize,
    sec_uid: &'a str,
}

/// # Errors
///
/// - [`PipelineError::Config`] when the provider or sheet store is not
///   configured.
/// - [`PipelineError::NotFound`] for an unknown spreadsheet or worksheet.
/// - [`PipelineError::MissingColumn`] when the header row lacks the id or
///   follower column.
/// - [`PipelineError::Store`] when the sheet cannot be read.
///
/// Lookup and write failures are reported in the response counts instead.
pub async fn update_follower_counts(
    services: &Services,
    request: &EnrichRequest,
) -> Result<EnrichResponse, PipelineError> {
    let store = services.store()?;
    let provider = services.provider()?;
    let spreadsheet_id = request.spreadsheet_id.as_str();
    let sheet = request.sheet_name.as_str();

    let rows = store
        .get_all_values(spreadsheet_id, sheet)
        .await
        .map_err(|e| PipelineError::sheet_read(spreadsheet_id, sheet, e))?;

    if rows.len() < 2 {
        return Ok(EnrichResponse::from_tally(
            "Sheet is empty or contains only headers.",
            Tally::default(),
        ));
    }

    let headers = &rows[0];
    let sec_uid_col = column_index(headers, SEC_UID_COLUMN)?;
    let follower_col = column_index(headers, FOLLOWER_COUNT_COLUMN)?;

    let pending: Vec<Pending<'_>> = rows
        .iter()
        .enumerate()
        .skip(1)
        .filter_map(|(i, row)| {
            let blank = row.get(follower_col)?.trim().is_empty();
            let sec_uid = row.get(sec_uid_col).map(String::as_str).unwrap_or_default();
            (blank && !sec_uid.is_empty()).then_some(Pending { row: i + 1, sec_uid })
        })
        .collect();

    let mut tally = Tally::new(rows.len() - 1);
    if pending.is_empty() {
        return Ok(EnrichResponse::from_tally(
            "No users needed a follower count update.",
            tally,
        ));
    }
    tracing::info!(pending = pending.len(), sheet, "enrichment: fetching follower counts");

    let mut updates = Vec::with_capacity(pending.len());
    for item in &pending {
        match provider.follower_count(item.sec_uid).await {
            Ok(count) => {
                tracing::debug!(sec_uid = item.sec_uid, count, "enrichment: fetched follower count");
                updates.push(CellUpdate {
                    row: item.row,
                    col: follower_col,
                    value: count.into(),
                });
            }
            Err(e) => {
                tracing::warn!(sec_uid = item.sec_uid, error = %e, "enrichment: follower lookup failed");
                tally.fail();
            }
        }
    }

    if !updates.is_empty() {
        match store.batch_update_cells(spreadsheet_id, sheet, &updates).await {
            Ok(()) => {
                tally.updated = updates.len();
                tracing::info!(updated = tally.updated, sheet, "enrichment: follower counts written");
            }
            Err(e) => {
                tracing::error!(error = %e, queued = updates.len(), "enrichment: batch update failed");
                tally.fail_batch(updates.len());
            }
        }
    }

    Ok(EnrichResponse::from_tally(
        "Follower count update process complete.",
        tally,
    ))
}

fn column_index(headers: &[String], name: &str) -> Result<usize, PipelineError> {
    headers.iter().position(|h| h == name).ok_or_else(|| {
        PipelineError::MissingColumn(format!(
            "Missing required column in sheet: '{name}'. Please ensure \
             '{SEC_UID_COLUMN}' and '{FOLLOWER_COUNT_COLUMN}' columns exist."
        ))
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::fakes::{FakeProvider, MemorySheets};

    const HEADER: &[&str] = &["Creator Name", "Creator SecUid", "Account Link", "Follower Count"];

    fn request() -> EnrichRequest {
        EnrichRequest {
            spreadsheet_id: "sheet-1".to_owned(),
            sheet_name: "Creators".to_owned(),
        }
    }

    fn services(provider: Arc<FakeProvider>, sheets: Arc<MemorySheets>) -> Services {
        Services {
            provider: Some(provider),
            store: Some(sheets),
            ..Services::default()
        }
    }

    #[tokio::test]
    async fn fills_only_blank_follower_cells() {
        let provider = Arc::new(
            FakeProvider::new()
                .with_followers("uid_a", 1500)
                .with_followers("uid_b", 99)
                .with_followers("uid_c", 7),
        );
        let sheets = Arc::new(MemorySheets::new("sheet-1").with_sheet(
            "Creators",
            &[
                HEADER,
                &["a", "uid_a", "link", ""],
                &["b", "uid_b", "link", "42"],
                &["c", "uid_c", "link", "   "],
            ],
        ));

        let svc = services(Arc::clone(&provider), Arc::clone(&sheets));
        let out = update_follower_counts(&svc, &request()).await.unwrap();

        assert_eq!(
            out,
            EnrichResponse {
                message: "Follower count update process complete.".to_owned(),
                users_checked: 3,
                users_updated: 2,
                users_failed: 0,
            }
        );
        assert_eq!(provider.follower_lookups(), vec!["uid_a", "uid_c"]);
        let rows = sheets.sheet("Creators").unwrap();
        assert_eq!(rows[1][3], "1500");
        assert_eq!(rows[2][3], "42");
        assert_eq!(rows[3][3], "7");
        assert_eq!(sheets.batch_update_calls(), 1);
    }

    #[tokio::test]
    async fn short_rows_and_rows_without_ids_are_handled() {
        let provider = Arc::new(FakeProvider::new().with_followers("uid_a", 10));
        let sheets = Arc::new(MemorySheets::new("sheet-1").with_sheet(
            "Creators",
            &[HEADER, &["a", "uid_a"], &["nobody", "", "", ""]],
        ));

        let svc = services(Arc::clone(&provider), Arc::clone(&sheets));
        let out = update_follower_counts(&svc, &request()).await.unwrap();

        assert_eq!(out.users_updated, 1);
        assert_eq!(provider.follower_lookups(), vec!["uid_a"]);
        assert_eq!(sheets.sheet("Creators").unwrap()[1][3], "10");
    }

    #[tokio::test]
    async fn lookup_failures_are_counted_not_fatal() {
        let provider = Arc::new(FakeProvider::new().with_followers("uid_b", 5));
        let sheets = Arc::new(MemorySheets::new("sheet-1").with_sheet(
            "Creators",
            &[HEADER, &["a", "uid_missing", "link", ""], &["b", "uid_b", "link", ""]],
        ));

        let svc = services(provider, Arc::clone(&sheets));
        let out = update_follower_counts(&svc, &request()).await.unwrap();

        assert_eq!((out.users_checked, out.users_updated, out.users_failed), (2, 1, 1));
        let rows = sheets.sheet("Creators").unwrap();
        assert_eq!(rows[1][3], "");
        assert_eq!(rows[2][3], "5");
    }

    #[tokio::test]
    async fn failed_batch_write_counts_every_queued_update_as_failed() {
        let provider = Arc::new(
            FakeProvider::new()
                .with_followers("uid_a", 1)
                .with_followers("uid_b", 2),
        );
        let sheets = Arc::new(
            MemorySheets::new("sheet-1")
                .with_sheet(
                    "Creators",
                    &[
                        HEADER,
                        &["a", "uid_a", "link", ""],
                        &["b", "uid_b", "link", ""],
                        &["x", "uid_x", "link", ""],
                    ],
                )
                .failing_writes(),
        );

        let svc = services(provider, sheets);
        let out = update_follower_counts(&svc, &request()).await.unwrap();

        assert_eq!((out.users_checked, out.users_updated, out.users_failed), (3, 0, 3));
    }

    #[tokio::test]
    async fn nothing_pending_reports_rows_checked() {
        let provider = Arc::new(FakeProvider::new());
        let sheets = Arc::new(MemorySheets::new("sheet-1").with_sheet(
            "Creators",
            &[HEADER, &["a", "uid_a", "link", "10"], &["b", "uid_b", "link", "0"]],
        ));

        let svc = services(Arc::clone(&provider), Arc::clone(&sheets));
        let out = update_follower_counts(&svc, &request()).await.unwrap();

        assert_eq!(out.message, "No users needed a follower count update.");
        assert_eq!((out.users_checked, out.users_updated, out.users_failed), (2, 0, 0));
        assert!(provider.follower_lookups().is_empty());
        assert_eq!(sheets.batch_update_calls(), 0);
    }

    #[tokio::test]
    async fn header_only_sheet_is_reported_empty() {
        let sheets = Arc::new(MemorySheets::new("sheet-1").with_sheet("Creators", &[HEADER]));

        let svc = services(Arc::new(FakeProvider::new()), sheets);
        let out = update_follower_counts(&svc, &request()).await.unwrap();

        assert_eq!(out.message, "Sheet is empty or contains only headers.");
        assert_eq!(out.users_checked, 0);
    }

    #[tokio::test]
    async fn missing_follower_column_is_rejected() {
        let sheets = Arc::new(MemorySheets::new("sheet-1").with_sheet(
            "Creators",
            &[&["Creator Name", "Creator SecUid"], &["a", "uid_a"]],
        ));

        let svc = services(Arc::new(FakeProvider::new()), sheets);
        let err = update_follower_counts(&svc, &request()).await.unwrap_err();

        assert!(matches!(err, PipelineError::MissingColumn(ref m) if m.contains("'Follower Count'")));
    }

    #[tokio::test]
    async fn unknown_worksheet_is_not_found() {
        let sheets = Arc::new(MemorySheets::new("sheet-1"));

        let svc = services(Arc::new(FakeProvider::new()), sheets);
        let err = update_follower_counts(&svc, &request()).await.unwrap_err();

        assert_eq!(err.to_string(), "Sheet 'Creators' not found in the spreadsheet.");
    }
}
