use chrono::DateTime;
use serde::Serialize;

use crate::creator::Creator;
use crate::scoring::composite_score;
use crate::video::Video;

/// Column headers of an analysis report sheet, in write order.
pub const REPORT_HEADERS: [&str; 15] = [
    "Creator Name",
    "Creator SecUid",
    "Account Link",
    "Follower Count",
    "Video ID",
    "Video URL",
    "Description",
    "Create Timestamp",
    "Create Date",
    "Likes",
    "Comments",
    "Shares",
    "Bookmarks",
    "Recommendations",
    "Virality Score",
];

/// Public URL for a video identifier.
#[must_use]
pub fn video_link(video_id: &str) -> String {
    format!("https://www.douyin.com/video/{video_id}")
}

/// One scored video joined with a snapshot of its creator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub creator_name: String,
    pub sec_uid: String,
    pub account_link: String,
    pub follower_count: u64,
    pub video_id: String,
    pub video_url: String,
    pub description: String,
    pub create_timestamp: i64,
    pub create_date: String,
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
    pub bookmarks: u64,
    pub recommendations: u64,
    pub virality_score: f64,
}

impl ReportRow {
    /// Score `video` for `creator` and build its report row.
    ///
    /// Returns `None` when the creator has no usable follower count or the
    /// video has no identifier to link to.
    #[must_use]
    pub fn build(creator: &Creator, video: &Video, now: i64) -> Option<Self> {
        let follower_count = creator.follower_count.filter(|n| *n > 0)?;
        let video_id = video.id.clone().filter(|id| !id.is_empty())?;
        let virality_score = composite_score(video, follower_count, now)?;
        let create_timestamp = video.create_time_or(now);

        Some(Self {
            creator_name: creator.name.clone(),
            sec_uid: creator.sec_uid.clone(),
            account_link: creator.account_link.clone(),
            follower_count,
            video_url: video_link(&video_id),
            video_id,
            description: video.description.clone().unwrap_or_default(),
            create_timestamp,
            create_date: format_date(create_timestamp),
            likes: video.stats.likes,
            comments: video.stats.comments,
            shares: video.stats.shares,
            bookmarks: video.stats.bookmarks,
            recommendations: video.stats.recommends,
            virality_score,
        })
    }

    /// Cells in [`REPORT_HEADERS`] order.
    #[must_use]
    pub fn to_row(&self) -> Vec<serde_json::Value> {
        vec![
            self.creator_name.clone().into(),
            self.sec_uid.clone().into(),
            self.account_link.clone().into(),
            self.follower_count.into(),
            self.video_id.clone().into(),
            self.video_url.clone().into(),
            self.description.clone().into(),
            self.create_timestamp.into(),
            self.create_date.clone().into(),
            self.likes.into(),
            self.comments.into(),
            self.shares.into(),
            self.bookmarks.into(),
            self.recommendations.into(),
            self.virality_score.into(),
        ]
    }
}

/// `%Y-%m-%d` in UTC; out-of-range timestamps render as an empty cell.
fn format_date(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}
