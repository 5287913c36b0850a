//! Client for the RapidAPI "douyin media no watermark" API.
//!
//! Covers the three lookups the pipeline needs (creator detail, a creator's
//! recent videos, a video's download address) plus the raw binary download
//! of the resolved address.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::error::ScraperError;
use crate::types::{AwemeDetailResponse, AwemeListResponse, UserDetailResponse};
use viralscout_core::Video;

const DEFAULT_HOST: &str = "douyin-media-no-watermark1.p.rapidapi.com";

const USER_DETAIL_PATH: &str = "v1/social/douyin/web/user/detail";
const AWEME_POST_PATH: &str = "v1/social/douyin/web/aweme/post";
const AWEME_DETAIL_PATH: &str = "v1/social/douyin/web/aweme/detail";

pub struct DouyinClient {
    client: Client,
    api_key: String,
    host: String,
    base_url: Url,
    download_timeout: Duration,
}

impl DouyinClient {
    /// Creates a client pointed at the production RapidAPI host.
    ///
    /// `timeout_secs` bounds the JSON lookups; `download_timeout_secs` bounds
    /// [`Self::download`], which moves whole video files.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        api_key: &str,
        timeout_secs: u64,
        download_timeout_secs: u64,
    ) -> Result<Self, ScraperError> {
        Self::with_base_url(
            api_key,
            timeout_secs,
            download_timeout_secs,
            &format!("https://{DEFAULT_HOST}/"),
        )
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    /// The `x-rapidapi-host` header keeps the production host name.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`ScraperError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        download_timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            host: DEFAULT_HOST.to_owned(),
            base_url: crate::parse_base_url(base_url)?,
            download_timeout: Duration::from_secs(download_timeout_secs),
        })
    }

    /// Current follower count of a creator.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::UnexpectedStatus`] for any non-2xx response.
    /// - [`ScraperError::MissingField`] when the payload has no
    ///   `user.follower_count`.
    /// - [`ScraperError::Http`] / [`ScraperError::Deserialize`] on transport
    ///   or decoding failure.
    pub async fn follower_count(&self, sec_uid: &str) -> Result<u64, ScraperError> {
        let payload = serde_json::json!({ "sec_user_id": sec_uid });
        let detail: UserDetailResponse = self
            .post_json(USER_DETAIL_PATH, &payload, "user detail")
            .await?;

        detail
            .user
            .and_then(|u| u.follower_count)
            .ok_or_else(|| ScraperError::MissingField {
                context: "user detail".to_owned(),
                field: "follower_count",
            })
    }

    /// The most recent `count` videos posted by a creator. The API treats
    /// `count` as a hint, so the list is truncated here.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::UnexpectedStatus`] for any non-2xx response.
    /// - [`ScraperError::Http`] / [`ScraperError::Deserialize`] on transport
    ///   or decoding failure.
    pub async fn recent_videos(&self, sec_uid: &str, count: u32) -> Result<Vec<Video>, ScraperError> {
        let payload = serde_json::json!({
            "sec_user_id": sec_uid,
            "count": count,
            "max_cursor": "0",
        });
        let list: AwemeListResponse = self
            .post_json(AWEME_POST_PATH, &payload, "aweme post list")
            .await?;

        Ok(list
            .aweme_list
            .unwrap_or_default()
            .into_iter()
            .take(usize::try_from(count).unwrap_or(usize::MAX))
            .map(crate::types::Aweme::into_video)
            .collect())
    }

    /// Resolve a video identifier to a direct, watermark-free download URL.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::MissingField`] when the response carries no play
    ///   address.
    /// - [`ScraperError::UnexpectedStatus`] for any non-2xx response.
    /// - [`ScraperError::Http`] / [`ScraperError::Deserialize`] on transport
    ///   or decoding failure.
    pub async fn download_url(&self, video_id: &str) -> Result<String, ScraperError> {
        let payload = serde_json::json!({ "id": video_id });
        let detail: AwemeDetailResponse = self
            .post_json(AWEME_DETAIL_PATH, &payload, "aweme detail")
            .await?;

        detail
            .play_url()
            .map(str::to_owned)
            .ok_or_else(|| ScraperError::MissingField {
                context: "aweme detail".to_owned(),
                field: "download link",
            })
    }

    /// Fetch the bytes behind a download URL.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::UnexpectedStatus`] for any non-2xx response and
    /// [`ScraperError::Http`] on network failure or timeout.
    pub async fn download(&self, url: &str) -> Result<Vec<u8>, ScraperError> {
        let response = self
            .client
            .get(url)
            .timeout(self.download_timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                context: "video download".to_owned(),
                status: status.as_u16(),
                body: String::new(),
            });
        }

        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }

    /// POSTs `payload` to `path` with the RapidAPI headers, asserts a 2xx
    /// status and decodes the body as `T`.
    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        payload: &serde_json::Value,
        context: &str,
    ) -> Result<T, ScraperError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| ScraperError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;

        let response = self
            .client
            .post(url)
            .header("x-rapidapi-key", &self.api_key)
            .header("x-rapidapi-host", &self.host)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ScraperError::UnexpectedStatus {
                context: context.to_owned(),
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ScraperError::Deserialize {
            context: context.to_owned(),
            source: e,
        })
    }
}
