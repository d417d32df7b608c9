use pace_core::listing_contract::{run_listing_contract, ListingContractExpectations};
use pace_core::{ListingError, PageToken, PlaylistId, PlaylistListing, SongUrl, YoutubeConfig};
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};
use youtube_provider::YoutubeListing;

/// Matches requests for the first page of a playlist.
struct FirstPage;

impl Match for FirstPage {
    fn matches(&self, request: &Request) -> bool {
        !request.url.query_pairs().any(|(name, _)| name == "pageToken")
    }
}

fn items(ids: &[&str]) -> Value {
    let items: Vec<Value> = ids
        .iter()
        .map(|id| {
            json!({
                "kind": "youtube#playlistItem",
                "snippet": {"title": format!("Video {id}"), "resourceId": {"videoId": id}},
                "contentDetails": {"videoId": id}
            })
        })
        .collect();
    Value::Array(items)
}

fn page(ids: &[&str], next: Option<&str>, total: u32) -> Value {
    let mut body = json!({
        "kind": "youtube#playlistItemListResponse",
        "pageInfo": {"totalResults": total, "resultsPerPage": ids.len()},
        "items": items(ids),
    });
    if let Some(next) = next {
        body["nextPageToken"] = json!(next);
    }
    body
}

fn config_for(server: &MockServer) -> YoutubeConfig {
    YoutubeConfig {
        api_base_url: server.uri(),
        ..YoutubeConfig::default()
    }
}

async fn mount_three_page_playlist(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .and(query_param("playlistId", "PLdemo"))
        .and(query_param("key", "test-key"))
        .and(FirstPage)
        .respond_with(ResponseTemplate::new(200).set_body_json(page(&["a1", "a2"], Some("T2"), 5)))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .and(query_param("playlistId", "PLdemo"))
        .and(query_param("pageToken", "T2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(&["a3", "a4"], Some("T3"), 5)))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .and(query_param("playlistId", "PLdemo"))
        .and(query_param("pageToken", "T3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(&["a5"], None, 5)))
        .mount(server)
        .await;
}

async fn mount_error(server: &MockServer, playlist: &str, status: u16, message: &str) {
    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .and(query_param("playlistId", playlist))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({
            "error": {"code": status, "message": message, "errors": []}
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn youtube_listing_contract() {
    let server = MockServer::start().await;
    mount_three_page_playlist(&server).await;
    mount_error(&server, "PLmissing", 404, "The playlist identified with the request's playlistId parameter cannot be found.").await;

    let listing = YoutubeListing::new(&config_for(&server), "test-key").unwrap();
    let expectations = ListingContractExpectations {
        playlist_id: PlaylistId::from("PLdemo"),
        page_size: 2,
        expected_total_count: 5,
        expected_urls: ["a1", "a2", "a3", "a4", "a5"]
            .iter()
            .map(|id| SongUrl::new(format!("https://www.youtube.com/watch?v={id}")))
            .collect(),
        missing_playlist_id: PlaylistId::from("PLmissing"),
    };

    if let Err(e) = run_listing_contract(&listing, &expectations).await {
        panic!("Contract test failed: {}", e);
    }
}

#[tokio::test]
async fn page_carries_titles_and_token() {
    let server = MockServer::start().await;
    mount_three_page_playlist(&server).await;
    let listing = YoutubeListing::new(&config_for(&server), "test-key").unwrap();

    let first = listing
        .fetch_page(&PlaylistId::from("PLdemo"), None, 2)
        .await
        .unwrap();

    assert_eq!(first.total_count, 5);
    assert_eq!(first.next_page_token, Some(PageToken::from("T2")));
    assert_eq!(first.items[0].title.as_deref(), Some("Video a1"));
}

#[tokio::test]
async fn forbidden_playlist_maps_to_api_error() {
    let server = MockServer::start().await;
    mount_error(&server, "PLprivate", 403, "The request is not properly authorized to retrieve the specified playlist.").await;
    let listing = YoutubeListing::new(&config_for(&server), "test-key").unwrap();

    let err = listing
        .fetch_page(&PlaylistId::from("PLprivate"), None, 5)
        .await
        .unwrap_err();

    assert_eq!(err.http_status(), Some(403));
    assert!(matches!(err, ListingError::Api { ref message, .. } if message.contains("not properly authorized")));
}

#[tokio::test]
async fn non_json_error_body_still_reports_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&server)
        .await;
    let listing = YoutubeListing::new(&config_for(&server), "test-key").unwrap();

    let err = listing
        .fetch_page(&PlaylistId::from("PLdemo"), None, 5)
        .await
        .unwrap_err();

    assert_eq!(err, ListingError::api(503, "Service Unavailable"));
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
        .mount(&server)
        .await;
    let listing = YoutubeListing::new(&config_for(&server), "test-key").unwrap();

    let err = listing
        .fetch_page(&PlaylistId::from("PLdemo"), None, 5)
        .await
        .unwrap_err();

    assert!(matches!(err, ListingError::Decode { .. }));
}

#[tokio::test]
async fn unreachable_server_is_a_network_error_without_the_key() {
    let config = YoutubeConfig {
        api_base_url: "http://127.0.0.1:9/".into(),
        connect_timeout_secs: 2,
        request_timeout_secs: 2,
        ..YoutubeConfig::default()
    };
    let listing = YoutubeListing::new(&config, "super-secret").unwrap();

    let err = listing
        .fetch_page(&PlaylistId::from("PLdemo"), None, 5)
        .await
        .unwrap_err();

    match err {
        ListingError::Network { message } => assert!(!message.contains("super-secret")),
        other => panic!("expected network error, got {other:?}"),
    }
}
