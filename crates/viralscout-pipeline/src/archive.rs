//! Archival: copy videos into a fresh, timestamped Drive folder.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::PipelineError;
use crate::outcome::{ItemResult, ItemStatus};
use crate::ports::{BlobStore, ProviderError, StoreError, StoredObject, VideoProvider};
use crate::services::Services;

const VIDEO_MIME_TYPE: &str = "video/mp4";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArchiveRequest {
    pub parent_folder_id: String,
    pub video_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveResponse {
    pub message: String,
    pub new_folder_url: Option<String>,
    pub download_results: Vec<ItemResult>,
}

#[derive(Debug, Error)]
enum ItemError {
    #[error("could not resolve download link: {0}")]
    Resolve(#[source] ProviderError),

    #[error("download failed: {0}")]
    Download(#[source] ProviderError),

    #[error("upload failed: {0}")]
    Upload(#[source] StoreError),
}

/// # Errors
///
/// See [`archive_videos_at`].
pub async fn archive_videos(
    services: &Services,
    request: &ArchiveRequest,
) -> Result<ArchiveResponse, PipelineError> {
    archive_videos_at(services, request, Utc::now()).await
}

/// Archive each video in request order. One result is returned per input
/// id; a failed video does not stop the rest.
///
/// # Errors
///
/// - [`PipelineError::InvalidInput`] for an empty id list.
/// - [`PipelineError::Config`] when the provider or Drive is not configured.
/// - [`PipelineError::Store`] when the destination folder cannot be created.
pub async fn archive_videos_at(
    services: &Services,
    request: &ArchiveRequest,
    now: DateTime<Utc>,
) -> Result<ArchiveResponse, PipelineError> {
    if request.video_ids.is_empty() {
        return Err(PipelineError::InvalidInput(
            "The 'video_ids' list cannot be empty.".to_owned(),
        ));
    }
    let provider = services.provider()?;
    let blobs = services.blobs()?;

    let folder_name = format!("Downloaded_Videos_{}", now.format("%Y%m%d_%H%M%S"));
    let folder = blobs
        .create_folder(&folder_name, &request.parent_folder_id)
        .await
        .map_err(|source| PipelineError::Store {
            context: "Failed to create Google Drive folder".to_owned(),
            source,
        })?;
    tracing::info!(folder = %folder_name, id = %folder.id, "archival: created folder");

    let mut download_results = Vec::with_capacity(request.video_ids.len());
    for video_id in &request.video_ids {
        let outcome = archive_one(&**provider, &**blobs, video_id, &folder.id).await;
        let result = match outcome {
            Ok(file) => {
                tracing::info!(video_id, file_id = %file.id, "archival: uploaded");
                ItemResult::success(video_id.as_str(), file.link)
            }
            Err(e) => {
                tracing::warn!(video_id, error = %e, "archival: failed");
                ItemResult::failed(video_id.as_str(), e.to_string())
            }
        };
        download_results.push(result);
    }

    let succeeded = download_results
        .iter()
        .filter(|r| r.status == ItemStatus::Success)
        .count();
    tracing::info!(
        succeeded,
        failed = download_results.len() - succeeded,
        "archival: complete"
    );

    Ok(ArchiveResponse {
        message: "Video download process complete.".to_owned(),
        new_folder_url: folder.link,
        download_results,
    })
}

async fn archive_one(
    provider: &dyn VideoProvider,
    blobs: &dyn BlobStore,
    video_id: &str,
    folder_id: &str,
) -> Result<StoredObject, ItemError> {
    let url = provider
        .download_url(video_id)
        .await
        .map_err(ItemError::Resolve)?;
    let bytes = provider.download(&url).await.map_err(ItemError::Download)?;
    tracing::debug!(video_id, bytes = bytes.len(), "archival: downloaded");
    blobs
        .upload(bytes, &format!("douyin_{video_id}.mp4"), folder_id, VIDEO_MIME_TYPE)
        .await
        .map_err(ItemError::Upload)
}
