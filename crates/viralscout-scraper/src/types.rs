//! Provider payload types.
//!
//! Both providers omit fields freely: counters vanish when zero, lists come
//! back as `null`, and nested objects may be absent entirely. Every field is
//! therefore optional here, and the `into_video` conversions apply the
//! defaulting rules (absent counter ⇒ `0`, absent list ⇒ empty).

use serde::Deserialize;
use viralscout_core::{AuthorMeta, Video, VideoStats};

// --- Apify douyin-scraper actor ---

/// Input for the `natanielsantos/douyin-scraper` actor.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DouyinSearchInput {
    #[serde(rename = "searchTermsOrHashtags")]
    pub search_terms_or_hashtags: Vec<String>,
    #[serde(rename = "maxItemsPerUrl")]
    pub max_items_per_url: u32,
}

/// One dataset item from the search actor.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApifyVideoItem {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    pub text: Option<String>,
    pub create_time: Option<i64>,
    pub statistics: Option<ApifyStatistics>,
    pub author_meta: Option<ApifyAuthorMeta>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApifyStatistics {
    pub digg_count: Option<u64>,
    pub comment_count: Option<u64>,
    pub share_count: Option<u64>,
    pub collect_count: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApifyAuthorMeta {
    pub sec_uid: Option<String>,
    pub name: Option<String>,
}

/// The actor reports ids as strings on some runs and as bare numbers on others.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

impl ApifyVideoItem {
    #[must_use]
    pub fn into_video(self) -> Video {
        let stats = self.statistics.unwrap_or_default();
        Video {
            id: self.id,
            create_time: self.create_time,
            description: self.text,
            stats: VideoStats {
                likes: stats.digg_count.unwrap_or(0),
                comments: stats.comment_count.unwrap_or(0),
                shares: stats.share_count.unwrap_or(0),
                bookmarks: stats.collect_count.unwrap_or(0),
                recommends: 0,
            },
            author: self.author_meta.map(|a| AuthorMeta {
                sec_uid: a.sec_uid,
                name: a.name,
            }),
        }
    }
}

// --- RapidAPI douyin media endpoints ---

/// `POST /v1/social/douyin/web/user/detail`
#[derive(Debug, Deserialize)]
pub struct UserDetailResponse {
    pub user: Option<UserDetail>,
}

#[derive(Debug, Deserialize)]
pub struct UserDetail {
    pub follower_count: Option<u64>,
}

/// `POST /v1/social/douyin/web/aweme/post`
#[derive(Debug, Deserialize)]
pub struct AwemeListResponse {
    pub aweme_list: Option<Vec<Aweme>>,
}

/// A video ("aweme") as the media API reports it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Aweme {
    pub aweme_id: Option<String>,
    pub desc: Option<String>,
    pub create_time: Option<i64>,
    pub statistics: Option<AwemeStatistics>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AwemeStatistics {
    pub digg_count: Option<u64>,
    pub comment_count: Option<u64>,
    pub share_count: Option<u64>,
    pub collect_count: Option<u64>,
    pub recommend_count: Option<u64>,
}

impl Aweme {
    #[must_use]
    pub fn into_video(self) -> Video {
        let stats = self.statistics.unwrap_or_default();
        Video {
            id: self.aweme_id,
            create_time: self.create_time,
            description: self.desc,
            stats: VideoStats {
                likes: stats.digg_count.unwrap_or(0),
                comments: stats.comment_count.unwrap_or(0),
                shares: stats.share_count.unwrap_or(0),
                bookmarks: stats.collect_count.unwrap_or(0),
                recommends: stats.recommend_count.unwrap_or(0),
            },
            author: None,
        }
    }
}

/// `POST /v1/social/douyin/web/aweme/detail`
#[derive(Debug, Deserialize)]
pub struct AwemeDetailResponse {
    pub aweme_detail: Option<AwemeDetail>,
}

#[derive(Debug, Deserialize)]
pub struct AwemeDetail {
    pub video: Option<AwemeVideo>,
}

#[derive(Debug, Deserialize)]
pub struct AwemeVideo {
    pub play_addr: Option<PlayAddr>,
}

#[derive(Debug, Deserialize)]
pub struct PlayAddr {
    pub url_list: Option<Vec<String>>,
}

impl AwemeDetailResponse {
    /// First non-empty play URL, if any.
    #[must_use]
    pub fn play_url(&self) -> Option<&str> {
        self.aweme_detail
            .as_ref()?
            .video
            .as_ref()?
            .play_addr
            .as_ref()?
            .url_list
            .as_ref()?
            .iter()
            .map(String::as_str)
            .find(|u| !u.is_empty())
    }
}
