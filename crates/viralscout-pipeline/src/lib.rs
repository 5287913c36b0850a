//! The four pipeline stages (discovery, enrichment, analysis, archival) and
//! the ports they talk to the outside world through.

pub mod adapters;
pub mod analyze;
pub mod archive;
pub mod discover;
pub mod enrich;
pub mod error;
pub mod outcome;
pub mod ports;
pub mod services;

#[cfg(any(test, feature = "test-support"))]
pub mod fakes;

pub use analyze::{analyze_and_report, AnalyzeRequest, AnalyzeResponse};
pub use archive::{archive_videos, ArchiveRequest, ArchiveResponse};
pub use discover::{discover_creators, DiscoverRequest, DiscoverResponse};
pub use enrich::{update_follower_counts, EnrichRequest, EnrichResponse};
pub use error::PipelineError;
pub use outcome::{ItemResult, ItemStatus, Tally};
pub use ports::{
    BlobStore, ProviderError, Record, StoreError, StoredObject, TabularStore, VideoProvider,
    VideoSearch,
};
pub use services::{PipelineSettings, Services};
