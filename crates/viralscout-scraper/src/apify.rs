//! Client for the Apify douyin search actor.
//!
//! Uses the synchronous `run-sync-get-dataset-items` endpoint: one request
//! starts the actor, waits for it to finish and returns the dataset. Runs
//! can take minutes, so the client is built with a long timeout.

use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::ScraperError;
use crate::types::{ApifyVideoItem, DouyinSearchInput};
use viralscout_core::Video;

const DEFAULT_BASE_URL: &str = "https://api.apify.com/v2/";

/// Actor path segment for `natanielsantos/douyin-scraper`.
const DOUYIN_SCRAPER_ACTOR: &str = "natanielsantos~douyin-scraper";

pub struct ApifyClient {
    client: Client,
    token: String,
    base_url: Url,
}

impl ApifyClient {
    /// Creates a client pointed at the production Apify API.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(token: &str, timeout_secs: u64) -> Result<Self, ScraperError> {
        Self::with_base_url(token, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`ScraperError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        token: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            token: token.to_owned(),
            base_url: crate::parse_base_url(base_url)?,
        })
    }

    /// Runs the search actor for `terms` and returns every video it found.
    ///
    /// Dataset items that do not match the expected shape are skipped with
    /// a warning rather than failing the whole run.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::UnexpectedStatus`] for any non-2xx response.
    /// - [`ScraperError::Http`] on network failure or timeout.
    /// - [`ScraperError::Deserialize`] if the body is not a JSON array.
    pub async fn search_videos(
        &self,
        terms: &[String],
        max_items_per_term: u32,
    ) -> Result<Vec<Video>, ScraperError> {
        let url = self.search_url()?;
        let input = DouyinSearchInput {
            search_terms_or_hashtags: terms.to_vec(),
            max_items_per_url: max_items_per_term,
        };

        tracing::info!(?terms, max_items_per_term, "starting Apify douyin search");

        let response = self
            .client
            .post(url)
            .json(&input)
            .send()
            .await
            .map_err(|e| ScraperError::Http(e.without_url()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), %body, "Apify search request failed");
            return Err(ScraperError::UnexpectedStatus {
                context: "apify douyin search".to_owned(),
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ScraperError::Http(e.without_url()))?;
        let items: Vec<serde_json::Value> =
            serde_json::from_str(&body).map_err(|e| ScraperError::Deserialize {
                context: "apify douyin search".to_owned(),
                source: e,
            })?;

        let total = items.len();
        let videos: Vec<Video> = items
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<ApifyVideoItem>(item) {
                Ok(parsed) => Some(parsed.into_video()),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping malformed Apify dataset item");
                    None
                }
            })
            .collect();

        tracing::info!(total, parsed = videos.len(), "Apify search complete");
        Ok(videos)
    }

    /// The token travels as a query parameter, so this URL must never be
    /// logged or put into an error.
    fn search_url(&self) -> Result<Url, ScraperError> {
        let mut url = self
            .base_url
            .join(&format!(
                "acts/{DOUYIN_SCRAPER_ACTOR}/run-sync-get-dataset-items"
            ))
            .map_err(|e| ScraperError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        url.query_pairs_mut().append_pair("token", &self.token);
        Ok(url)
    }
}
