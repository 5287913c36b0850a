//! Thin REST clients for the Google Sheets v4 and Drive v3 APIs.

pub mod a1;
pub mod auth;
pub mod drive;
pub mod error;
pub mod sheets;

pub use auth::{ServiceAccountKey, TokenSource};
pub use drive::{DriveClient, DriveFile};
pub use error::GoogleError;
pub use sheets::{CellUpdate, SheetsClient, ValueInput, WorksheetProperties};

use reqwest::Url;

pub(crate) fn parse_base_url(base_url: &str) -> Result<Url, GoogleError> {
    let normalised = format!("{}/", base_url.trim_end_matches('/'));
    Url::parse(&normalised).map_err(|e| GoogleError::InvalidBaseUrl {
        base_url: base_url.to_owned(),
        reason: e.to_string(),
    })
}

/// Append percent-encoded path segments to `base`.
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, GoogleError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| GoogleError::InvalidBaseUrl {
            base_url: base.to_string(),
            reason: "URL cannot be a base".to_owned(),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Turn a non-2xx response into [`GoogleError::Api`], pulling the message
/// out of Google's `{"error": {"message": ...}}` envelope when present.
pub(crate) async fn check_status(
    response: reqwest::Response,
    context: &str,
) -> Result<reqwest::Response, GoogleError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(serde_json::Value::as_str)
                .map(str::to_owned)
        })
        .unwrap_or(body);
    Err(GoogleError::Api {
        context: context.to_owned(),
        status: status.as_u16(),
        message,
    })
}

pub(crate) async fn decode_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    context: &str,
) -> Result<T, GoogleError> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| GoogleError::Deserialize {
        context: context.to_owned(),
        source: e,
    })
}
