//! End-to-end tests: the router in front of a mock search upstream.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

use axum::body::{Body, to_bytes};
use axum::extract::{Query, State};
use axum::http::{Request, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use hn_search::api::routes::create_router;
use hn_search::config::Config;
use hn_search::AppState;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower::ServiceExt;

const HEALTHY: u8 = 0;
const MALFORMED: u8 = 1;
const SERVER_ERROR: u8 = 2;

#[derive(Clone, Default)]
struct Upstream {
    mode: Arc<AtomicU8>,
    requests: Arc<AtomicUsize>,
    page_sizes: Arc<Mutex<Vec<Option<String>>>>,
}

impl Upstream {
    fn set_mode(&self, mode: u8) {
        self.mode.store(mode, Ordering::SeqCst);
    }

    fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// `hitsPerPage` of every request received, in order.
    fn page_sizes(&self) -> Vec<Option<String>> {
        self.page_sizes.lock().expect("page sizes").clone()
    }
}

async fn upstream_search(
    State(upstream): State<Upstream>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    upstream.requests.fetch_add(1, Ordering::SeqCst);
    upstream
        .page_sizes
        .lock()
        .expect("page sizes")
        .push(params.get("hitsPerPage").cloned());
    match upstream.mode.load(Ordering::SeqCst) {
        MALFORMED => return (StatusCode::OK, "{\"hits\": \"nope\"}").into_response(),
        SERVER_ERROR => return StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        _ => {}
    }

    let query = params.get("query").cloned().unwrap_or_default();
    let page: u32 = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(0);

    let hits = if query == "redux" {
        let title = if page == 0 { "Redux".to_string() } else { format!("Redux part {}", page + 1) };
        vec![json!({
            "objectID": (page + 1).to_string(),
            "title": title,
            "url": format!("https://example.com/redux/{}", page),
            "author": "dan",
            "num_comments": 3,
            "points": 10
        })]
    } else {
        vec![
            json!({ "objectID": format!("{}-{}-a", query, page), "title": format!("{} a", query), "url": "", "author": "x", "num_comments": 0, "points": 1 }),
            json!({ "objectID": format!("{}-{}-b", query, page), "title": format!("{} b", query), "url": "", "author": "y", "num_comments": 0, "points": 2 }),
        ]
    };

    axum::Json(json!({ "hits": hits, "page": page, "hitsPerPage": 50 })).into_response()
}

async fn setup() -> (Router, Upstream) {
    let upstream = Upstream::default();
    let mock = Router::new()
        .route("/api/v1/search", get(upstream_search))
        .with_state(upstream.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind mock upstream");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, mock).await.expect("mock upstream");
    });

    let config = Config::with_api_base(format!("http://{}/api/v1", addr));
    let state = AppState::new(config).expect("app state");
    (create_router(state), upstream)
}

async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let body = serde_json::from_slice(&bytes).expect("json body");
    (status, body)
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request");
    call(app, request).await
}

async fn get_uri(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).expect("request");
    call(app, request).await
}

fn ids(body: &Value) -> Vec<String> {
    body["data"]["items"]
        .as_array()
        .expect("items")
        .iter()
        .map(|item| item["id"].as_str().expect("id").to_string())
        .collect()
}

#[tokio::test]
async fn unknown_key_is_not_found() {
    let (app, upstream) = setup().await;

    let (status, body) = get_uri(&app, "/api/results?query=redux").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["meta"]["status"], "error");
    assert!(body["data"].is_null());
    assert_eq!(upstream.requests(), 0);
}

#[tokio::test]
async fn search_loads_first_page() {
    let (app, upstream) = setup().await;

    let (status, body) = post(&app, "/api/search", json!({ "query": "redux" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["status"], "success");
    assert_eq!(body["data"]["search_key"], "redux");
    assert_eq!(body["data"]["page_index"], 0);
    assert_eq!(
        body["data"]["items"],
        json!([{
            "id": "1",
            "title": "Redux",
            "url": "https://example.com/redux/0",
            "author": "dan",
            "comment_count": 3,
            "points": 10
        }])
    );

    let (status, stored) = get_uri(&app, "/api/results?query=redux").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored["data"], body["data"]);
    assert_eq!(upstream.page_sizes(), vec![Some("50".to_string())]);
}

#[tokio::test]
async fn resubmitting_a_key_does_not_refetch() {
    let (app, upstream) = setup().await;

    post(&app, "/api/search", json!({ "query": "rust" })).await;
    let (status, body) = post(&app, "/api/search", json!({ "query": "rust" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec!["rust-0-a", "rust-0-b"]);
    assert_eq!(upstream.requests(), 1);
}

#[tokio::test]
async fn more_accumulates_pages() {
    let (app, upstream) = setup().await;

    post(&app, "/api/search", json!({ "query": "redux" })).await;
    let (status, body) = post(&app, "/api/search/more", json!({ "query": "redux" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec!["1", "2"]);
    assert_eq!(body["data"]["page_index"], 1);
    assert_eq!(upstream.page_sizes(), vec![Some("50".to_string()); 2]);
}

#[tokio::test]
async fn keys_accumulate_separately() {
    let (app, _upstream) = setup().await;

    post(&app, "/api/search", json!({ "query": "redux" })).await;
    post(&app, "/api/search", json!({ "query": "rust" })).await;
    post(&app, "/api/search/more", json!({ "query": "rust" })).await;

    let (_, redux) = get_uri(&app, "/api/results?query=redux").await;
    let (_, rust) = get_uri(&app, "/api/results?query=rust").await;

    assert_eq!(ids(&redux), vec!["1"]);
    assert_eq!(ids(&rust), vec!["rust-0-a", "rust-0-b", "rust-1-a", "rust-1-b"]);
}

#[tokio::test]
async fn dismiss_removes_item_idempotently() {
    let (app, _upstream) = setup().await;
    post(&app, "/api/search", json!({ "query": "rust" })).await;

    let (status, body) = post(&app, "/api/results/dismiss", json!({ "query": "rust", "id": "rust-0-a" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["removed"], 1);
    assert_eq!(ids(&body), vec!["rust-0-b"]);

    let (status, again) = post(&app, "/api/results/dismiss", json!({ "query": "rust", "id": "rust-0-a" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again["data"]["removed"], 0);
    assert_eq!(ids(&again), vec!["rust-0-b"]);
}

#[tokio::test]
async fn dismiss_on_unknown_key_creates_nothing() {
    let (app, _upstream) = setup().await;

    let (status, _) = post(&app, "/api/results/dismiss", json!({ "query": "ghost", "id": "1" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get_uri(&app, "/api/results?query=ghost").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn filter_narrows_without_mutating() {
    let (app, _upstream) = setup().await;
    post(&app, "/api/search", json!({ "query": "redux" })).await;
    post(&app, "/api/search/more", json!({ "query": "redux" })).await;

    let (status, body) = get_uri(&app, "/api/results/filter?query=redux&term=PART").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec!["2"]);

    let (_, stored) = get_uri(&app, "/api/results?query=redux").await;
    assert_eq!(ids(&stored), vec!["1", "2"]);
}

#[tokio::test]
async fn decode_failure_keeps_previous_results() {
    let (app, upstream) = setup().await;
    post(&app, "/api/search", json!({ "query": "redux" })).await;

    upstream.set_mode(MALFORMED);
    let (status, body) = post(&app, "/api/search/more", json!({ "query": "redux" })).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["meta"]["message"].is_null());
    assert_eq!(ids(&body), vec!["1"]);
    assert_eq!(body["data"]["page_index"], 0);
}

#[tokio::test]
async fn upstream_error_on_first_search_stores_nothing() {
    let (app, upstream) = setup().await;
    upstream.set_mode(SERVER_ERROR);

    let (status, _) = post(&app, "/api/search", json!({ "query": "redux" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // the key was never stored, so the next submission fetches again
    upstream.set_mode(HEALTHY);
    let (status, body) = post(&app, "/api/search", json!({ "query": "redux" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec!["1"]);
    assert_eq!(upstream.requests(), 2);
}

#[tokio::test]
async fn health_reports_key_count() {
    let (app, _upstream) = setup().await;
    post(&app, "/api/search", json!({ "query": "rust" })).await;

    let (status, body) = get_uri(&app, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["search_keys"], 1);
}
