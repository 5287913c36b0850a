//! Accumulate-and-report result types for the batch stages.

use serde::{Deserialize, Serialize};

/// Counters for a batch where each item can fail on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub checked: usize,
    pub updated: usize,
    pub failed: usize,
}

impl Tally {
    #[must_use]
    pub fn new(checked: usize) -> Self {
        Self {
            checked,
            ..Self::default()
        }
    }

    pub fn fail(&mut self) {
        self.failed += 1;
    }

    /// A batch write of `queued` items failed: none of them count as updated.
    pub fn fail_batch(&mut self, queued: usize) {
        self.failed += queued;
        self.updated = 0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Success,
    Failed,
}

/// Outcome for one item of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemResult {
    pub video_id: String,
    pub status: ItemStatus,
    pub drive_link: Option<String>,
    pub error_detail: Option<String>,
}

impl ItemResult {
    #[must_use]
    pub fn success(video_id: impl Into<String>, drive_link: Option<String>) -> Self {
        Self {
            video_id: video_id.into(),
            status: ItemStatus::Success,
            drive_link,
            error_detail: None,
        }
    }

    #[must_use]
    pub fn failed(video_id: impl Into<String>, error_detail: impl Into<String>) -> Self {
        Self {
            video_id: video_id.into(),
            status: ItemStatus::Failed,
            drive_link: None,
            error_detail: Some(error_detail.into()),
        }
    }
}
