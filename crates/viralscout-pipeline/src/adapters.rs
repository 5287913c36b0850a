//! Port implementations backed by the real HTTP clients.

use async_trait::async_trait;
use serde_json::Value;
use viralscout_core::Video;
use viralscout_google::{
    CellUpdate, DriveClient, DriveFile, GoogleError, SheetsClient, ValueInput,
};
use viralscout_scraper::{ApifyClient, DouyinClient, ScraperError};

use crate::ports::{
    BlobStore, ProviderError, StoreError, StoredObject, TabularStore, VideoProvider, VideoSearch,
};

impl From<ScraperError> for ProviderError {
    fn from(err: ScraperError) -> Self {
        match err {
            ScraperError::UnexpectedStatus { status, body, .. } => Self::Status {
                status,
                message: body,
            },
            ScraperError::MissingField { .. } => Self::MissingField(err.to_string()),
            ScraperError::Http(_)
            | ScraperError::Deserialize { .. }
            | ScraperError::InvalidBaseUrl { .. } => Self::Transport(err.to_string()),
        }
    }
}

impl From<GoogleError> for StoreError {
    fn from(err: GoogleError) -> Self {
        match err {
            GoogleError::SpreadsheetNotFound(id) => Self::SpreadsheetNotFound(id),
            GoogleError::WorksheetNotFound { title, .. } => Self::WorksheetNotFound(title),
            other => Self::Backend(other.to_string()),
        }
    }
}

impl From<DriveFile> for StoredObject {
    fn from(file: DriveFile) -> Self {
        Self {
            id: file.id,
            link: file.web_view_link,
        }
    }
}

#[async_trait]
impl VideoSearch for ApifyClient {
    async fn search_videos(
        &self,
        terms: &[String],
        max_per_term: u32,
    ) -> Result<Vec<Video>, ProviderError> {
        Ok(ApifyClient::search_videos(self, terms, max_per_term).await?)
    }
}

#[async_trait]
impl VideoProvider for DouyinClient {
    async fn follower_count(&self, sec_uid: &str) -> Result<u64, ProviderError> {
        Ok(DouyinClient::follower_count(self, sec_uid).await?)
    }

    async fn recent_videos(&self, sec_uid: &str, count: u32) -> Result<Vec<Video>, ProviderError> {
        Ok(DouyinClient::recent_videos(self, sec_uid, count).await?)
    }

    async fn download_url(&self, video_id: &str) -> Result<String, ProviderError> {
        Ok(DouyinClient::download_url(self, video_id).await?)
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
        Ok(DouyinClient::download(self, url).await?)
    }
}

#[async_trait]
impl TabularStore for SheetsClient {
    async fn get_all_values(
        &self,
        spreadsheet_id: &str,
        sheet: &str,
    ) -> Result<Vec<Vec<String>>, StoreError> {
        Ok(SheetsClient::get_all_values(self, spreadsheet_id, sheet).await?)
    }

    async fn add_worksheet(
        &self,
        spreadsheet_id: &str,
        title: &str,
        rows: usize,
        cols: usize,
    ) -> Result<i64, StoreError> {
        Ok(SheetsClient::add_worksheet(self, spreadsheet_id, title, rows, cols).await?)
    }

    async fn append_rows(
        &self,
        spreadsheet_id: &str,
        sheet: &str,
        rows: &[Vec<Value>],
    ) -> Result<(), StoreError> {
        Ok(SheetsClient::append_rows(self, spreadsheet_id, sheet, rows).await?)
    }

    async fn update_values(
        &self,
        spreadsheet_id: &str,
        sheet: &str,
        a1_start: &str,
        rows: &[Vec<Value>],
        input: ValueInput,
    ) -> Result<(), StoreError> {
        Ok(SheetsClient::update_values(self, spreadsheet_id, sheet, a1_start, rows, input).await?)
    }

    async fn batch_update_cells(
        &self,
        spreadsheet_id: &str,
        sheet: &str,
        cells: &[CellUpdate],
    ) -> Result<(), StoreError> {
        Ok(SheetsClient::batch_update_cells(self, spreadsheet_id, sheet, cells).await?)
    }
}

#[async_trait]
impl BlobStore for DriveClient {
    async fn create_folder(&self, name: &str, parent_id: &str) -> Result<StoredObject, StoreError> {
        Ok(DriveClient::create_folder(self, name, parent_id).await?.into())
    }

    async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        folder_id: &str,
        mime_type: &str,
    ) -> Result<StoredObject, StoreError> {
        Ok(DriveClient::upload(self, bytes, filename, folder_id, mime_type)
            .await?
            .into())
    }
}
