use serde::{Deserialize, Serialize};

/// Engagement counters for one video. Providers omit counters freely;
/// anything absent is recorded as `0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoStats {
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
    pub bookmarks: u64,
    pub recommends: u64,
}

/// Creator metadata attached to a search result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorMeta {
    /// Opaque platform identifier; the dedup key for creator rows.
    pub sec_uid: Option<String>,
    pub name: Option<String>,
}

impl AuthorMeta {
    /// The identifier, if present and non-empty.
    #[must_use]
    pub fn known_sec_uid(&self) -> Option<&str> {
        self.sec_uid.as_deref().filter(|s| !s.is_empty())
    }
}

/// A video as returned by a scraping provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub id: Option<String>,
    /// Epoch seconds. `None` means the provider did not report it.
    pub create_time: Option<i64>,
    pub description: Option<String>,
    pub stats: VideoStats,
    pub author: Option<AuthorMeta>,
}

impl Video {
    /// Creation time, substituting `now` when the provider omitted it.
    #[must_use]
    pub fn create_time_or(&self, now: i64) -> i64 {
        self.create_time.unwrap_or(now)
    }
}
