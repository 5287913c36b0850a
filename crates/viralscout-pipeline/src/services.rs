use std::sync::Arc;

use viralscout_core::AppConfig;
use viralscout_google::{DriveClient, ServiceAccountKey, SheetsClient, TokenSource};
use viralscout_scraper::{ApifyClient, DouyinClient};

use crate::error::PipelineError;
use crate::ports::{BlobStore, TabularStore, VideoProvider, VideoSearch};

/// Analysis knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    pub max_creators: usize,
    pub videos_per_creator: u32,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            max_creators: 20,
            videos_per_creator: 10,
        }
    }
}

/// Handles to every external system, built once per process.
///
/// A handle is `None` when its credential is not configured; stages that
/// need it fail with [`PipelineError::Config`].
#[derive(Clone, Default)]
pub struct Services {
    pub search: Option<Arc<dyn VideoSearch>>,
    pub provider: Option<Arc<dyn VideoProvider>>,
    pub store: Option<Arc<dyn TabularStore>>,
    pub blobs: Option<Arc<dyn BlobStore>>,
    pub settings: PipelineSettings,
}

impl Services {
    /// Build the HTTP-backed services described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] if a configured credential cannot be
    /// loaded or a client cannot be constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, PipelineError> {
        let search: Option<Arc<dyn VideoSearch>> = match config.apify_token.as_deref() {
            Some(token) => Some(Arc::new(
                ApifyClient::new(token, config.search_timeout_secs).map_err(config_error)?,
            )),
            None => None,
        };

        let provider: Option<Arc<dyn VideoProvider>> = match config.rapidapi_key.as_deref() {
            Some(key) => Some(Arc::new(
                DouyinClient::new(key, config.provider_timeout_secs, config.download_timeout_secs)
                    .map_err(config_error)?,
            )),
            None => None,
        };

        let (store, blobs): (Option<Arc<dyn TabularStore>>, Option<Arc<dyn BlobStore>>) =
            match google_tokens(config)? {
                Some(tokens) => (
                    Some(Arc::new(
                        SheetsClient::new(Arc::clone(&tokens), config.provider_timeout_secs)
                            .map_err(config_error)?,
                    )),
                    Some(Arc::new(
                        DriveClient::new(tokens, config.download_timeout_secs)
                            .map_err(config_error)?,
                    )),
                ),
                None => (None, None),
            };

        Ok(Self {
            search,
            provider,
            store,
            blobs,
            settings: PipelineSettings {
                max_creators: config.analysis_max_creators,
                videos_per_creator: config.analysis_videos_per_creator,
            },
        })
    }

    pub(crate) fn search(&self) -> Result<&Arc<dyn VideoSearch>, PipelineError> {
        self.search
            .as_ref()
            .ok_or_else(|| PipelineError::Config("APIFY_TOKEN not configured.".to_owned()))
    }

    pub(crate) fn provider(&self) -> Result<&Arc<dyn VideoProvider>, PipelineError> {
        self.provider
            .as_ref()
            .ok_or_else(|| PipelineError::Config("RAPIDAPI_KEY not configured.".to_owned()))
    }

    pub(crate) fn store(&self) -> Result<&Arc<dyn TabularStore>, PipelineError> {
        self.store.as_ref().ok_or_else(|| {
            PipelineError::Config("Could not initialize Google Sheets client.".to_owned())
        })
    }

    pub(crate) fn blobs(&self) -> Result<&Arc<dyn BlobStore>, PipelineError> {
        self.blobs.as_ref().ok_or_else(|| {
            PipelineError::Config("Could not initialize Google Drive service.".to_owned())
        })
    }
}

/// A credentials file takes precedence over a pre-issued token.
fn google_tokens(config: &AppConfig) -> Result<Option<Arc<TokenSource>>, PipelineError> {
    if let Some(path) = config.google_credentials_path.as_deref() {
        let key = ServiceAccountKey::from_file(path).map_err(config_error)?;
        tracing::info!(client_email = %key.client_email, "using Google service account");
        let source =
            TokenSource::service_account(key, config.provider_timeout_secs).map_err(config_error)?;
        return Ok(Some(Arc::new(source)));
    }
    Ok(config
        .google_access_token
        .as_ref()
        .map(|token| Arc::new(TokenSource::Static(token.clone()))))
}

fn config_error(err: impl std::fmt::Display) -> PipelineError {
    PipelineError::Config(err.to_string())
}
