//! Interfaces to the external systems the stages depend on.
//!
//! Stages only ever see these traits; the concrete HTTP clients are wired
//! in by [`crate::adapters`] and the in-memory doubles by `fakes`.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use viralscout_core::Video;
use viralscout_google::{CellUpdate, ValueInput};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("{0}")]
    MissingField(String),

    #[error("provider request failed: {0}")]
    Transport(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("spreadsheet not found: {0}")]
    SpreadsheetNotFound(String),

    #[error("worksheet not found: {0}")]
    WorksheetNotFound(String),

    #[error("{0}")]
    Backend(String),
}

/// A data row keyed by the header row.
pub type Record = HashMap<String, String>;

/// A file or folder in blob storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub id: String,
    pub link: Option<String>,
}

/// Keyword search over the video platform.
#[async_trait]
pub trait VideoSearch: Send + Sync {
    async fn search_videos(
        &self,
        terms: &[String],
        max_per_term: u32,
    ) -> Result<Vec<Video>, ProviderError>;
}

/// Per-creator and per-video lookups.
#[async_trait]
pub trait VideoProvider: Send + Sync {
    async fn follower_count(&self, sec_uid: &str) -> Result<u64, ProviderError>;

    async fn recent_videos(&self, sec_uid: &str, count: u32) -> Result<Vec<Video>, ProviderError>;

    /// Direct download URL for a video identifier.
    async fn download_url(&self, video_id: &str) -> Result<String, ProviderError>;

    async fn download(&self, url: &str) -> Result<Vec<u8>, ProviderError>;
}

/// A spreadsheet used as a table store. Rows are addressed by 1-based sheet
/// row number, columns by 0-based index.
#[async_trait]
pub trait TabularStore: Send + Sync {
    /// Every row as text, each padded to the width of the widest row.
    async fn get_all_values(
        &self,
        spreadsheet_id: &str,
        sheet: &str,
    ) -> Result<Vec<Vec<String>>, StoreError>;

    /// Data rows keyed by the first row. Cells missing from short rows map
    /// to an empty string.
    async fn get_all_records(
        &self,
        spreadsheet_id: &str,
        sheet: &str,
    ) -> Result<Vec<Record>, StoreError> {
        let values = self.get_all_values(spreadsheet_id, sheet).await?;
        Ok(records_from_values(&values))
    }

    /// Create a worksheet, returning its numeric id.
    async fn add_worksheet(
        &self,
        spreadsheet_id: &str,
        title: &str,
        rows: usize,
        cols: usize,
    ) -> Result<i64, StoreError>;

    async fn append_rows(
        &self,
        spreadsheet_id: &str,
        sheet: &str,
        rows: &[Vec<Value>],
    ) -> Result<(), StoreError>;

    async fn update_values(
        &self,
        spreadsheet_id: &str,
        sheet: &str,
        a1_start: &str,
        rows: &[Vec<Value>],
        input: ValueInput,
    ) -> Result<(), StoreError>;

    async fn batch_update_cells(
        &self,
        spreadsheet_id: &str,
        sheet: &str,
        cells: &[CellUpdate],
    ) -> Result<(), StoreError>;
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn create_folder(&self, name: &str, parent_id: &str) -> Result<StoredObject, StoreError>;

    async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        folder_id: &str,
        mime_type: &str,
    ) -> Result<StoredObject, StoreError>;
}

pub(crate) fn records_from_values(values: &[Vec<String>]) -> Vec<Record> {
    let Some((headers, rows)) = values.split_first() else {
        return Vec::new();
    };
    rows.iter()
        .map(|row| {
            headers
                .iter()
                .enumerate()
                .map(|(i, h)| (h.clone(), row.get(i).cloned().unwrap_or_default()))
                .collect()
        })
        .collect()
}
