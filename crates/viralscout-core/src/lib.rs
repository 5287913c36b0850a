//! Domain types, virality scoring and configuration shared by every
//! viralscout crate.

pub mod app_config;
pub mod config;
pub mod creator;
pub mod ranking;
pub mod report;
pub mod scoring;
pub mod video;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use creator::{profile_link, Creator, CREATOR_SHEET_HEADERS};
pub use ranking::rank_creators;
pub use report::{video_link, ReportRow, REPORT_HEADERS};
pub use scoring::{composite_score, follower_ratio, velocity};
pub use video::{AuthorMeta, Video, VideoStats};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
