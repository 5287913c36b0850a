//! Google Drive v3 client: folder creation and multipart file upload.
//!
//! Every call passes `supportsAllDrives=true` so parents may live on a
//! Shared Drive.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::json;

use crate::auth::TokenSource;
use crate::error::GoogleError;

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/";
const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";
const RETURNED_FIELDS: &str = "id,webViewLink";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    pub web_view_link: Option<String>,
}

pub struct DriveClient {
    client: Client,
    tokens: Arc<TokenSource>,
    base_url: Url,
}

impl DriveClient {
    /// `timeout_secs` bounds every request, uploads included.
    ///
    /// # Errors
    ///
    /// Returns [`GoogleError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(tokens: Arc<TokenSource>, timeout_secs: u64) -> Result<Self, GoogleError> {
        Self::with_base_url(tokens, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    /// Metadata calls go to `{base}/drive/v3`, uploads to
    /// `{base}/upload/drive/v3`.
    ///
    /// # Errors
    ///
    /// Returns [`GoogleError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`GoogleError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        tokens: Arc<TokenSource>,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, GoogleError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            tokens,
            base_url: crate::parse_base_url(base_url)?,
        })
    }

    /// Create a folder named `name` inside `parent_id`.
    ///
    /// # Errors
    ///
    /// Returns [`GoogleError::Api`] for any non-2xx response, e.g. when the
    /// parent does not exist or is not writable.
    pub async fn create_folder(&self, name: &str, parent_id: &str) -> Result<DriveFile, GoogleError> {
        let url = self.files_url(&["drive", "v3", "files"], None)?;
        let metadata = json!({
            "name": name,
            "mimeType": FOLDER_MIME_TYPE,
            "parents": [parent_id],
        });

        let token = self.tokens.access_token().await?;
        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&metadata)
            .send()
            .await?;
        let response = crate::check_status(response, "create folder").await?;
        let folder: DriveFile = crate::decode_json(response, "create folder").await?;

        tracing::info!(folder_id = %folder.id, name, "created Drive folder");
        Ok(folder)
    }

    /// Upload `bytes` as `filename` into `folder_id`.
    ///
    /// # Errors
    ///
    /// Returns [`GoogleError::Api`] for any non-2xx response and
    /// [`GoogleError::Http`] on transport failure or timeout.
    pub async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        folder_id: &str,
        mime_type: &str,
    ) -> Result<DriveFile, GoogleError> {
        let url = self.files_url(&["upload", "drive", "v3", "files"], Some("multipart"))?;
        let metadata = json!({ "name": filename, "parents": [folder_id] });
        let boundary = format!("viralscout-{}", uuid::Uuid::new_v4().simple());
        let body = multipart_related(&boundary, &metadata, mime_type, &bytes);

        let token = self.tokens.access_token().await?;
        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={boundary}"),
            )
            .body(body)
            .send()
            .await?;
        let response = crate::check_status(response, "upload file").await?;
        crate::decode_json(response, "upload file").await
    }

    fn files_url(&self, segments: &[&str], upload_type: Option<&str>) -> Result<Url, GoogleError> {
        let mut url = crate::endpoint(&self.base_url, segments)?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(upload_type) = upload_type {
                query.append_pair("uploadType", upload_type);
            }
            query
                .append_pair("supportsAllDrives", "true")
                .append_pair("fields", RETURNED_FIELDS);
        }
        Ok(url)
    }
}

/// Body of a `multipart/related` upload: JSON metadata part, then media.
fn multipart_related(
    boundary: &str,
    metadata: &serde_json::Value,
    mime_type: &str,
    media: &[u8],
) -> Vec<u8> {
    let mut body = Vec::with_capacity(media.len() + 512);
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{metadata}\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("--{boundary}\r\nContent-Type: {mime_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(media);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}
