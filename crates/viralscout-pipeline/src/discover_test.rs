use std::sync::Arc;

use viralscout_core::{AuthorMeta, Video, VideoStats};

use super::*;
use crate::fakes::{FakeSearch, MemorySheets};
use crate::ports::ProviderError;

const NOW: i64 = 1_700_000_000;

fn video(id: &str, sec_uid: &str, name: &str, likes: u64) -> Video {
    Video {
        id: Some(id.to_owned()),
        create_time: Some(NOW - 3600),
        description: None,
        stats: VideoStats {
            likes,
            ..VideoStats::default()
        },
        author: Some(AuthorMeta {
            sec_uid: Some(sec_uid.to_owned()),
            name: Some(name.to_owned()),
        }),
    }
}

fn request(top: usize) -> DiscoverRequest {
    DiscoverRequest {
        search_terms: vec!["dance".to_owned()],
        spreadsheet_id: "sheet-1".to_owned(),
        sheet_name: "Creators".to_owned(),
        max_videos_per_term: 50,
        top_creators_to_rank: top,
    }
}

fn services(search: Arc<FakeSearch>, sheets: Arc<MemorySheets>) -> Services {
    Services {
        search: Some(search),
        store: Some(sheets),
        ..Services::default()
    }
}

fn sample_videos() -> Vec<Video> {
    vec![
        video("1", "uid_low", "low", 10),
        video("2", "uid_top", "top", 500),
        video("3", "uid_mid", "mid", 100),
        video("4", "uid_top", "top", 400),
    ]
}

#[tokio::test]
async fn creates_sheet_and_appends_ranked_creators() {
    let search = Arc::new(FakeSearch::returning(sample_videos()));
    let sheets = Arc::new(MemorySheets::new("sheet-1"));

    let svc = services(Arc::clone(&search), Arc::clone(&sheets));

    let out = discover_creators_at(&svc, &request(20), NOW).await.unwrap();

    assert_eq!(out.message, "Process complete. Identified 3 top creators.");
    assert_eq!(out.new_creators_added, 3);
    assert_eq!(out.top_ranked_sec_uids, vec!["uid_top", "uid_mid", "uid_low"]);
    assert_eq!(search.calls(), vec![(vec!["dance".to_owned()], 50)]);

    let rows = sheets.sheet("Creators").unwrap();
    assert_eq!(
        rows[0],
        vec!["Creator Name", "Creator SecUid", "Account Link", "Follower Count"]
    );
    assert_eq!(
        rows[1],
        vec!["top", "uid_top", "https://www.douyin.com/user/uid_top", ""]
    );
    assert_eq!(rows[2][1], "uid_mid");
    assert_eq!(rows[3][1], "uid_low");
}

#[tokio::test]
async fn second_run_adds_nothing() {
    let search = Arc::new(FakeSearch::returning(sample_videos()));
    let sheets = Arc::new(MemorySheets::new("sheet-1"));
    let svc = services(search, Arc::clone(&sheets));

    discover_creators_at(&svc, &request(20), NOW).await.unwrap();
    let again = discover_creators_at(&svc, &request(20), NOW).await.unwrap();

    assert_eq!(again.new_creators_added, 0);
    assert_eq!(again.top_ranked_sec_uids.len(), 3);
    assert_eq!(sheets.sheet("Creators").unwrap().len(), 4);
}

#[tokio::test]
async fn existing_creators_are_skipped_and_follower_counts_untouched() {
    let search = Arc::new(FakeSearch::returning(sample_videos()));
    let sheets = Arc::new(MemorySheets::new("sheet-1").with_sheet(
        "Creators",
        &[
            &["Creator Name", "Creator SecUid", "Account Link", "Follower Count"],
            &["top", "uid_top", "https://www.douyin.com/user/uid_top", "9000"],
        ],
    ));

    let out = discover_creators_at(&services(search, Arc::clone(&sheets)), &request(20), NOW)
        .await
        .unwrap();

    assert_eq!(out.new_creators_added, 2);
    let rows = sheets.sheet("Creators").unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[1][3], "9000");
    assert_eq!(rows[2][1], "uid_mid");
    assert_eq!(rows[3][1], "uid_low");
}

#[tokio::test]
async fn top_n_limits_ranked_creators() {
    let search = Arc::new(FakeSearch::returning(sample_videos()));
    let sheets = Arc::new(MemorySheets::new("sheet-1"));

    let out = discover_creators_at(&services(search, sheets), &request(1), NOW)
        .await
        .unwrap();

    assert_eq!(out.top_ranked_sec_uids, vec!["uid_top"]);
    assert_eq!(out.new_creators_added, 1);
}

#[tokio::test]
async fn empty_terms_are_rejected_before_searching() {
    let search = Arc::new(FakeSearch::returning(sample_videos()));
    let sheets = Arc::new(MemorySheets::new("sheet-1"));
    let mut req = request(20);
    req.search_terms.clear();

    let err = discover_creators_at(&services(Arc::clone(&search), sheets), &req, NOW)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::InvalidInput(_)));
    assert!(search.calls().is_empty());
}

#[tokio::test]
async fn search_failure_aborts_without_touching_the_sheet() {
    let search = Arc::new(FakeSearch::failing(402));
    let sheets = Arc::new(MemorySheets::new("sheet-1"));

    let err = discover_creators_at(&services(search, Arc::clone(&sheets)), &request(20), NOW)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Upstream {
            source: ProviderError::Status { status: 402, .. },
            ..
        }
    ));
    assert!(sheets.titles().is_empty());
}

#[tokio::test]
async fn unknown_spreadsheet_is_not_found() {
    let search = Arc::new(FakeSearch::returning(sample_videos()));
    let sheets = Arc::new(MemorySheets::new("other"));

    let err = discover_creators_at(&services(search, sheets), &request(20), NOW)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::NotFound(_)));
}

#[tokio::test]
async fn missing_search_provider_is_config_error() {
    let svc = Services {
        store: Some(Arc::new(MemorySheets::new("sheet-1"))),
        ..Services::default()
    };
    let err = discover_creators_at(&svc, &request(20), NOW).await.unwrap_err();
    assert!(matches!(err, PipelineError::Config(_)));
}

#[test]
fn request_defaults() {
    let req: DiscoverRequest = serde_json::from_value(serde_json::json!({
        "search_terms": ["a"],
        "spreadsheet_id": "s",
        "sheet_name": "Creators"
    }))
    .unwrap();
    assert_eq!(req.max_videos_per_term, 100);
    assert_eq!(req.top_creators_to_rank, 20);
}
