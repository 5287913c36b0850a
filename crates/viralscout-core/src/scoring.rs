//! Virality scoring.
//!
//! Two signals are computed per video:
//!
//! * **velocity**: weighted engagement per hour since posting. Used alone to
//!   rank search results during discovery.
//! * **composite score**: `0.4 × velocity + 0.6 × follower ratio`, where the
//!   follower ratio is a second engagement weighting divided by
//!   `ln(followers + 1)`. Used to rank a creator's recent videos in reports.
//!
//! Every function takes `now` explicitly; callers capture it once per batch
//! so all videos in one request are aged against the same clock.

use crate::video::{Video, VideoStats};

const SECONDS_PER_HOUR: f64 = 3600.0;

const VELOCITY_WEIGHT: f64 = 0.4;
const FOLLOWER_RATIO_WEIGHT: f64 = 0.6;

/// Hours since `create_time`, floored at one hour.
///
/// A missing creation time is treated as "just posted", which yields the
/// floor value of `1.0`.
#[must_use]
pub fn age_hours(create_time: Option<i64>, now: i64) -> f64 {
    let created = create_time.unwrap_or(now);
    #[allow(clippy::cast_precision_loss)]
    let elapsed = now.saturating_sub(created) as f64 / SECONDS_PER_HOUR;
    elapsed.max(1.0)
}

/// `0.5·likes + 1.5·comments + 2.0·shares + 1.0·bookmarks`
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn weighted_engagement(stats: &VideoStats) -> f64 {
    stats.likes as f64 * 0.5
        + stats.comments as f64 * 1.5
        + stats.shares as f64 * 2.0
        + stats.bookmarks as f64 * 1.0
}

/// `0.3·likes + 1.8·comments + 2.5·shares + 1.2·bookmarks + 3.0·recommends`
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn detailed_engagement(stats: &VideoStats) -> f64 {
    stats.likes as f64 * 0.3
        + stats.comments as f64 * 1.8
        + stats.shares as f64 * 2.5
        + stats.bookmarks as f64 * 1.2
        + stats.recommends as f64 * 3.0
}

/// Engagement per hour since posting.
#[must_use]
pub fn velocity(video: &Video, now: i64) -> f64 {
    weighted_engagement(&video.stats) / age_hours(video.create_time, now)
}

/// Detailed engagement damped by the log of the audience size.
///
/// Returns `None` for a zero follower count; such creators are excluded
/// from scoring entirely.
#[must_use]
pub fn follower_ratio(stats: &VideoStats, follower_count: u64) -> Option<f64> {
    if follower_count == 0 {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let damping = (follower_count as f64 + 1.0).ln();
    Some(detailed_engagement(stats) / damping)
}

/// Weighted blend of velocity and follower ratio, rounded to four decimals.
///
/// Returns `None` when `follower_count` is zero.
#[must_use]
pub fn composite_score(video: &Video, follower_count: u64, now: i64) -> Option<f64> {
    let ratio = follower_ratio(&video.stats, follower_count)?;
    let raw = VELOCITY_WEIGHT * velocity(video, now) + FOLLOWER_RATIO_WEIGHT * ratio;
    Some(round4(raw))
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
