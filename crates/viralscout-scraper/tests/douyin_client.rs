//! Integration tests for `DouyinClient` using wiremock HTTP mocks.

use viralscout_scraper::{DouyinClient, ScraperError};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> DouyinClient {
    DouyinClient::with_base_url("rapid-key", 30, 30, base_url)
        .expect("client construction should not fail")
}

#[tokio::test]
async fn follower_count_returns_user_count() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/social/douyin/web/user/detail"))
        .and(header("x-rapidapi-key", "rapid-key"))
        .and(header(
            "x-rapidapi-host",
            "douyin-media-no-watermark1.p.rapidapi.com",
        ))
        .and(body_json(serde_json::json!({ "sec_user_id": "MS4w_alice" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "user": { "follower_count": 12_345, "nickname": "alice" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let count = client.follower_count("MS4w_alice").await.unwrap();
    assert_eq!(count, 12_345);
}

#[tokio::test]
async fn follower_count_missing_user_is_missing_field() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/social/douyin/web/user/detail"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.follower_count("nobody").await.unwrap_err();
    assert!(matches!(
        err,
        ScraperError::MissingField { field: "follower_count", .. }
    ));
}

#[tokio::test]
async fn recent_videos_posts_cursor_and_maps_list() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/social/douyin/web/aweme/post"))
        .and(body_json(serde_json::json!({
            "sec_user_id": "MS4w_alice",
            "count": 10,
            "max_cursor": "0"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "aweme_list": [
                {
                    "aweme_id": "7301",
                    "desc": "first",
                    "create_time": 1_700_000_000,
                    "statistics": { "digg_count": 10, "recommend_count": 4 }
                },
                { "aweme_id": "7302" }
            ]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let videos = client.recent_videos("MS4w_alice", 10).await.unwrap();

    assert_eq!(videos.len(), 2);
    assert_eq!(videos[0].id.as_deref(), Some("7301"));
    assert_eq!(videos[0].stats.likes, 10);
    assert_eq!(videos[0].stats.recommends, 4);
    assert_eq!(videos[1].stats.likes, 0);
}

#[tokio::test]
async fn recent_videos_truncates_to_requested_count() {
    let server = MockServer::start().await;
    let list: Vec<_> = (0..8)
        .map(|i| serde_json::json!({ "aweme_id": format!("73{i:02}") }))
        .collect();

    Mock::given(method("POST"))
        .and(path("/v1/social/douyin/web/aweme/post"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "aweme_list": list })),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let videos = client.recent_videos("MS4w_alice", 3).await.unwrap();

    let ids: Vec<_> = videos.iter().filter_map(|v| v.id.as_deref()).collect();
    assert_eq!(ids, vec!["7300", "7301", "7302"]);
}

#[tokio::test]
async fn recent_videos_null_list_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/social/douyin/web/aweme/post"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "aweme_list": null })),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    assert!(client.recent_videos("x", 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn download_url_returns_first_play_address() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/social/douyin/web/aweme/detail"))
        .and(body_json(serde_json::json!({ "id": "7301" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "aweme_detail": {
                "video": { "play_addr": { "url_list": ["https://cdn.example/7301.mp4", "https://backup"] } }
            }
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let url = client.download_url("7301").await.unwrap();
    assert_eq!(url, "https://cdn.example/7301.mp4");
}

#[tokio::test]
async fn download_url_without_play_address_is_missing_field() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/social/douyin/web/aweme/detail"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "aweme_detail": { "video": {} }
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.download_url("7301").await.unwrap_err();
    assert!(matches!(err, ScraperError::MissingField { .. }));
}

#[tokio::test]
async fn provider_error_status_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/social/douyin/web/user/detail"))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    match client.follower_count("x").await.unwrap_err() {
        ScraperError::UnexpectedStatus { status, .. } => assert_eq!(status, 429),
        other => panic!("expected UnexpectedStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn download_fetches_raw_bytes() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/media/7301.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0_u8, 1, 2, 3]))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let bytes = client
        .download(&format!("{}/media/7301.mp4", server.uri()))
        .await
        .unwrap();
    assert_eq!(bytes, vec![0, 1, 2, 3]);
}

#[tokio::test]
async fn download_not_found_is_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/media/gone.mp4"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .download(&format!("{}/media/gone.mp4", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, ScraperError::UnexpectedStatus { status: 404, .. }));
}
