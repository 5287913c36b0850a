pub mod apify;
pub mod douyin;
pub mod error;
pub mod types;

pub use apify::ApifyClient;
pub use douyin::DouyinClient;
pub use error::ScraperError;

use reqwest::Url;

/// Parse a base URL, normalising it to end with exactly one slash so that
/// `Url::join` appends path segments instead of replacing the last one.
pub(crate) fn parse_base_url(base_url: &str) -> Result<Url, ScraperError> {
    let normalised = format!("{}/", base_url.trim_end_matches('/'));
    Url::parse(&normalised).map_err(|e| ScraperError::InvalidBaseUrl {
        base_url: base_url.to_owned(),
        reason: e.to_string(),
    })
}
