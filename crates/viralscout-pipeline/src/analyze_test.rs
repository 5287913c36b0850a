use std::sync::Arc;

use chrono::TimeZone;
use viralscout_core::{Video, VideoStats};
use viralscout_google::ValueInput;

use super::*;
use crate::fakes::{FakeProvider, MemorySheets};
use crate::ports::ProviderError;
use crate::services::PipelineSettings;

const HEADER: &[&str] = &["Creator Name", "Creator SecUid", "Account Link", "Follower Count"];

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
}

fn video(id: &str, likes: u64, shares: u64) -> Video {
    Video {
        id: Some(id.to_owned()),
        create_time: Some(now().timestamp() - 7200),
        description: Some(format!("clip {id}")),
        stats: VideoStats {
            likes,
            shares,
            ..VideoStats::default()
        },
        author: None,
    }
}

fn request() -> AnalyzeRequest {
    AnalyzeRequest {
        spreadsheet_id: "sheet-1".to_owned(),
        sheet_name: "Creators".to_owned(),
    }
}

fn services(provider: Arc<FakeProvider>, sheets: Arc<MemorySheets>, max_creators: usize) -> Services {
    Services {
        provider: Some(provider),
        store: Some(sheets),
        settings: PipelineSettings {
            max_creators,
            videos_per_creator: 5,
        },
        ..Services::default()
    }
}

fn creator_sheet() -> MemorySheets {
    MemorySheets::new("sheet-1").with_sheet(
        "Creators",
        &[
            HEADER,
            &["alpha", "uid_a", "https://www.douyin.com/user/uid_a", "1,000"],
            &["beta", "uid_b", "https://www.douyin.com/user/uid_b", "50"],
        ],
    )
}

#[tokio::test]
async fn writes_report_sorted_by_score() {
    let provider = Arc::new(
        FakeProvider::new()
            .with_videos("uid_a", vec![video("a1", 10, 0), video("a2", 5000, 40)])
            .with_videos("uid_b", vec![video("b1", 300, 2)]),
    );
    let sheets = Arc::new(creator_sheet());

    let svc = services(Arc::clone(&provider), Arc::clone(&sheets), 20);
    let out = analyze_and_report_at(&svc, &request(), now()).await.unwrap();

    let title = "VideoReport_20240309_140507";
    let sheet_id = sheets.sheet_id(title).unwrap();
    assert_eq!(out.message, "Successfully generated video virality report.");
    assert_eq!(out.videos_processed, 3);
    assert_eq!(
        out.report_sheet_url,
        format!("https://docs.google.com/spreadsheets/d/sheet-1/edit#gid={sheet_id}")
    );
    assert_eq!(
        provider.video_lookups(),
        vec![("uid_a".to_owned(), 5), ("uid_b".to_owned(), 5)]
    );

    let rows = sheets.sheet(title).unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0], REPORT_HEADERS.to_vec());
    assert_eq!(rows[1][4], "a2");
    assert_eq!(rows[1][3], "1000");
    assert_eq!(rows[1][5], "https://www.douyin.com/video/a2");

    let scores: Vec<f64> = rows[1..].iter().map(|r| r[14].parse().unwrap()).collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]), "{scores:?}");
}

#[tokio::test]
async fn each_creator_contributes_at_most_videos_per_creator() {
    let flood: Vec<Video> = (0..8).map(|i| video(&format!("a{i}"), 10 + i, 0)).collect();
    let provider = Arc::new(
        FakeProvider::new()
            .with_videos("uid_a", flood)
            .with_videos("uid_b", vec![video("b1", 10, 0)]),
    );
    let sheets = Arc::new(creator_sheet());
    let svc = Services {
        settings: PipelineSettings {
            max_creators: 20,
            videos_per_creator: 3,
        },
        ..services(provider, Arc::clone(&sheets), 20)
    };

    let out = analyze_and_report_at(&svc, &request(), now()).await.unwrap();

    assert_eq!(out.videos_processed, 4);
    let rows = sheets.sheet("VideoReport_20240309_140507").unwrap();
    let from_a = rows[1..].iter().filter(|r| r[1] == "uid_a").count();
    assert_eq!(from_a, 3);
}

#[tokio::test]
async fn report_is_written_raw() {
    let mut formula = video("7301234567890123456", 10, 0);
    formula.description = Some("=HYPERLINK(\"https://evil.test\")".to_owned());
    let provider = Arc::new(
        FakeProvider::new()
            .with_videos("uid_a", vec![formula])
            .with_videos("uid_b", Vec::new()),
    );
    let sheets = Arc::new(creator_sheet());

    let svc = services(provider, Arc::clone(&sheets), 20);
    analyze_and_report_at(&svc, &request(), now()).await.unwrap();

    assert_eq!(
        sheets.value_writes(),
        vec![
            ("A1".to_owned(), ValueInput::Raw),
            ("A2".to_owned(), ValueInput::Raw)
        ]
    );
    let rows = sheets.sheet("VideoReport_20240309_140507").unwrap();
    assert_eq!(rows[1][4], "7301234567890123456");
}

#[tokio::test]
async fn videos_without_ids_are_left_out_of_the_report() {
    let mut anonymous = video("x", 9000, 0);
    anonymous.id = None;
    let provider = Arc::new(
        FakeProvider::new()
            .with_videos("uid_a", vec![anonymous, video("a1", 10, 0)])
            .with_videos("uid_b", Vec::new()),
    );
    let sheets = Arc::new(creator_sheet());

    let svc = services(provider, Arc::clone(&sheets), 20);
    let out = analyze_and_report_at(&svc, &request(), now()).await.unwrap();

    assert_eq!(out.videos_processed, 1);
    let rows = sheets.sheet("VideoReport_20240309_140507").unwrap();
    assert_eq!(rows[1][5], "https://www.douyin.com/video/a1");
}

#[tokio::test]
async fn only_the_last_creators_are_analysed() {
    let provider = Arc::new(
        FakeProvider::new()
            .with_videos("uid_a", vec![video("a1", 10, 0)])
            .with_videos("uid_b", vec![video("b1", 10, 0)]),
    );
    let sheets = Arc::new(creator_sheet());

    let svc = services(Arc::clone(&provider), sheets, 1);
    let out = analyze_and_report_at(&svc, &request(), now()).await.unwrap();

    assert_eq!(out.videos_processed, 1);
    assert_eq!(provider.video_lookups(), vec![("uid_b".to_owned(), 5)]);
}

#[tokio::test]
async fn creators_without_usable_counts_are_skipped() {
    let provider = Arc::new(FakeProvider::new().with_videos("uid_ok", vec![video("v", 10, 0)]));
    let sheets = Arc::new(MemorySheets::new("sheet-1").with_sheet(
        "Creators",
        &[
            HEADER,
            &["blank", "uid_blank", "", ""],
            &["zero", "uid_zero", "", "0"],
            &["junk", "uid_junk", "", "lots"],
            &["no id", "", "", "100"],
            &["ok", "uid_ok", "", "100"],
        ],
    ));

    let svc = services(Arc::clone(&provider), sheets, 20);
    let out = analyze_and_report_at(&svc, &request(), now()).await.unwrap();

    assert_eq!(out.videos_processed, 1);
    assert_eq!(provider.video_lookups(), vec![("uid_ok".to_owned(), 5)]);
}

#[tokio::test]
async fn video_lookup_failure_aborts_before_writing() {
    let provider = Arc::new(FakeProvider::new().with_videos("uid_a", vec![video("a1", 10, 0)]));
    let sheets = Arc::new(creator_sheet());

    let svc = services(provider, Arc::clone(&sheets), 20);
    let err = analyze_and_report_at(&svc, &request(), now()).await.unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Upstream {
            source: ProviderError::Status { status: 404, .. },
            ..
        }
    ));
    assert_eq!(sheets.titles(), vec!["Creators"]);
}

#[tokio::test]
async fn empty_source_sheet_is_not_found() {
    let sheets = Arc::new(MemorySheets::new("sheet-1").with_sheet("Creators", &[HEADER]));

    let svc = services(Arc::new(FakeProvider::new()), sheets, 20);
    let err = analyze_and_report_at(&svc, &request(), now()).await.unwrap_err();

    assert_eq!(err.to_string(), "The source sheet contains no user data.");
}

#[tokio::test]
async fn no_videos_is_not_found() {
    let provider = Arc::new(
        FakeProvider::new()
            .with_videos("uid_a", Vec::new())
            .with_videos("uid_b", Vec::new()),
    );
    let sheets = Arc::new(creator_sheet());

    let svc = services(provider, Arc::clone(&sheets), 20);
    let err = analyze_and_report_at(&svc, &request(), now()).await.unwrap_err();

    assert!(matches!(err, PipelineError::NotFound(_)));
    assert_eq!(sheets.titles(), vec!["Creators"]);
}

#[tokio::test]
async fn report_write_failure_is_a_store_error() {
    let provider = Arc::new(
        FakeProvider::new()
            .with_videos("uid_a", vec![video("a1", 10, 0)])
            .with_videos("uid_b", vec![video("b1", 10, 0)]),
    );
    let sheets = Arc::new(creator_sheet().failing_writes());

    let svc = services(provider, sheets, 20);
    let err = analyze_and_report_at(&svc, &request(), now()).await.unwrap_err();

    assert!(matches!(err, PipelineError::Store { ref context, .. } if context.contains("report")));
}

#[tokio::test]
async fn unknown_spreadsheet_is_not_found() {
    let svc = services(Arc::new(FakeProvider::new()), Arc::new(creator_sheet()), 20);
    let req = AnalyzeRequest {
        spreadsheet_id: "missing".to_owned(),
        ..request()
    };

    let err = analyze_and_report_at(&svc, &req, now()).await.unwrap_err();

    assert_eq!(err.to_string(), "Spreadsheet with ID 'missing' not found.");
}
