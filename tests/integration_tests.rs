use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use wisdom_api::{
    config::Config,
    handlers::AppState,
    rate_limit_config::RateLimitConfig,
    rate_limiter::{ManualClock, RateLimiter},
    server::{create_app, Server},
    RecordStore, WisdomRecord,
};

fn record(id: u64, text: &str, author: &str, source: &str, category: &str) -> WisdomRecord {
    WisdomRecord {
        id,
        text: text.to_string(),
        author: author.to_string(),
        source: source.to_string(),
        category: category.to_string(),
        language: "en".to_string(),
    }
}

fn sample_store() -> RecordStore {
    RecordStore::from_records(vec![
        record(1, "Happiness is not something ready made", "Dalai Lama", "The Art of Happiness", "wisdom"),
        record(2, "Be kind whenever possible", "Dalai Lama", "Public Talks", "compassion"),
        record(3, "Do not dwell in the past", "Gampopa", "Jewel Ornament of Liberation", "wisdom"),
    ])
    .unwrap()
}

fn app_with(store: RecordStore, limits: RateLimitConfig) -> (Router, ManualClock) {
    let clock = ManualClock::new();
    let limiter = RateLimiter::with_clock(limits, Arc::new(clock.clone()));
    (create_app(AppState::new(store, limiter)), clock)
}

fn app() -> Router {
    app_with(sample_store(), RateLimitConfig::default()).0
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).method("GET").body(Body::empty()).unwrap()
}

fn get_from(uri: &str, ip: [u8; 4]) -> Request<Body> {
    let mut request = get(uri);
    request
        .extensions_mut()
        .insert(ConnectInfo(SocketAddr::from((ip, 40000))));
    request
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn ids(body: &Value) -> Vec<u64> {
    body["wisdom"]
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w["id"].as_u64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_list_filtered_by_category() {
    let response = app().oneshot(get("/wisdom?category=Wisdom&per_page=10")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(ids(&body), vec![1, 3]);
    assert_eq!(body["total"], 2);
    assert_eq!(body["page"], 1);
    assert_eq!(body["per_page"], 10);
}

#[tokio::test]
async fn test_list_second_page() {
    let response = app().oneshot(get("/wisdom?page=2&per_page=2")).await.unwrap();
    let body = body_json(response).await;

    assert_eq!(ids(&body), vec![3]);
    assert_eq!(body["total"], 3);
    assert_eq!(body["page"], 2);
}

#[tokio::test]
async fn test_list_page_past_end_is_empty() {
    let response = app().oneshot(get("/wisdom?page=999999999")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert!(ids(&body).is_empty());
    assert_eq!(body["total"], 3);
}

#[tokio::test]
async fn test_list_rejects_out_of_bounds_pagination() {
    for uri in ["/wisdom?page=0", "/wisdom?per_page=101", "/wisdom?per_page=0", "/wisdom?page=abc"] {
        let response = app().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
        let body = body_json(response).await;
        assert_eq!(body["error"], "validation_error");
    }
}

#[tokio::test]
async fn test_search() {
    let response = app().oneshot(get("/wisdom/search?q=DALAI")).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(ids(&body), vec![1, 2]);
    assert_eq!(body["total"], 2);

    // category is not a search field
    let response = app().oneshot(get("/wisdom/search?q=compassion")).await.unwrap();
    assert_eq!(body_json(response).await["total"], 0);
}

#[tokio::test]
async fn test_search_empty_query_matches_all() {
    let response = app().oneshot(get("/wisdom/search?q=&per_page=50")).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(ids(&body), vec![1, 2, 3]);
}

#[tokio::test]
async fn test_search_validation() {
    let response = app().oneshot(get("/wisdom/search")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app().oneshot(get("/wisdom/search?q=a&per_page=51")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_by_id() {
    let response = app().oneshot(get("/wisdom/2")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"wisdom": {
            "id": 2,
            "text": "Be kind whenever possible",
            "author": "Dalai Lama",
            "source": "Public Talks",
            "category": "compassion",
            "language": "en"
        }})
    );

    let response = app().oneshot(get("/wisdom/42")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app().oneshot(get("/wisdom/not-a-number")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_out_of_range_ids_are_not_found() {
    for uri in ["/wisdom/-1", "/wisdom/99999999999999999999999"] {
        let response = app().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(body_json(response).await["message"], "Wisdom not found");
    }
}

#[tokio::test]
async fn test_random() {
    let response = app().oneshot(get("/wisdom/random")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let id = body_json(response).await["wisdom"]["id"].as_u64().unwrap();
    assert!((1..=3).contains(&id));
}

#[tokio::test]
async fn test_random_on_empty_store_is_not_found() {
    let (app, _) = app_with(RecordStore::empty(), RateLimitConfig::default());
    let response = app.oneshot(get("/wisdom/random")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_metadata_endpoints_are_sorted() {
    let response = app().oneshot(get("/wisdom/categories")).await.unwrap();
    assert_eq!(body_json(response).await, json!({"categories": ["compassion", "wisdom"]}));

    let response = app().oneshot(get("/wisdom/authors")).await.unwrap();
    assert_eq!(body_json(response).await, json!({"authors": ["Dalai Lama", "Gampopa"]}));

    let response = app().oneshot(get("/wisdom/sources")).await.unwrap();
    assert_eq!(body_json(response).await["sources"].as_array().unwrap().len(), 3);

    let response = app().oneshot(get("/info")).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["name"], "Tibetan Wisdom API");
    assert_eq!(body["total_wisdom"], 3);
}

#[tokio::test]
async fn test_health_and_landing() {
    let response = app().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["rate_limits"]["search"], "15/minute");

    let response = app().oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/html"));
}

#[tokio::test]
async fn test_rate_limit_exceeded() {
    let (app, clock) = app_with(sample_store(), RateLimitConfig::default());

    for i in 0..5u32 {
        let response = app.clone().oneshot(get_from("/health", [10, 0, 0, 1])).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["X-RateLimit-Limit"], "5");
        assert_eq!(response.headers()["X-RateLimit-Remaining"], (4 - i).to_string().as_str());
    }

    let response = app.clone().oneshot(get_from("/health", [10, 0, 0, 1])).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.headers()[header::RETRY_AFTER], "60");
    let body = body_json(response).await;
    assert_eq!(body["error"], "Rate limit exceeded");
    assert_eq!(body["retry_after"], 60);

    // another client is unaffected
    let response = app.clone().oneshot(get_from("/health", [10, 0, 0, 2])).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    clock.advance(Duration::from_secs(60));
    let response = app.oneshot(get_from("/health", [10, 0, 0, 1])).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_metadata_routes_are_limited_independently() {
    let (app, _) = app_with(sample_store(), RateLimitConfig::default());

    for _ in 0..10 {
        let response = app.clone().oneshot(get_from("/wisdom/categories", [1, 2, 3, 4])).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
    let response = app.clone().oneshot(get_from("/wisdom/categories", [1, 2, 3, 4])).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    for uri in ["/wisdom/authors", "/wisdom/sources", "/info"] {
        let response = app.clone().oneshot(get_from(uri, [1, 2, 3, 4])).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);
        assert_eq!(response.headers()["X-RateLimit-Remaining"], "9");
    }
}

#[tokio::test]
async fn test_id_lookups_have_their_own_window() {
    let (app, _) = app_with(sample_store(), RateLimitConfig::default());

    for _ in 0..30 {
        let response = app.clone().oneshot(get_from("/wisdom/random", [10, 0, 0, 9])).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
    let response = app.clone().oneshot(get_from("/wisdom/random", [10, 0, 0, 9])).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    // every id shares the one route window
    for i in 0..30u64 {
        let uri = format!("/wisdom/{}", i % 3 + 1);
        let response = app.clone().oneshot(get_from(&uri, [10, 0, 0, 9])).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
    let response = app.oneshot(get_from("/wisdom/2", [10, 0, 0, 9])).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_disabled_rate_limiting() {
    let (app, _) = app_with(sample_store(), RateLimitConfig::disabled());

    for _ in 0..10 {
        let response = app.clone().oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn test_server_loads_data_file() {
    let path = std::env::temp_dir().join(format!("wisdom-api-{}.json", uuid::Uuid::new_v4()));
    let document = json!({
        "tibetan_quotes_collection": {
            "metadata": {"total_quotes": 1},
            "quotes": [{
                "id": 10, "text": "Impermanence", "author": "Milarepa",
                "source": "Hundred Thousand Songs", "category": "impermanence", "language": "en"
            }]
        }
    });
    std::fs::write(&path, document.to_string()).unwrap();

    let config = Config {
        data_file: path.clone(),
        ..Config::default()
    };
    let server = Server::new(config);
    std::fs::remove_file(&path).unwrap();
    assert!(server.is_ok());

    let store = RecordStore::load(std::env::temp_dir().join(format!("wisdom-api-{}.json", uuid::Uuid::new_v4())));
    assert!(store.unwrap().is_empty());
}

#[tokio::test]
async fn test_server_rejects_malformed_data_file() {
    let path = std::env::temp_dir().join(format!("wisdom-api-{}.json", uuid::Uuid::new_v4()));
    std::fs::write(&path, r#"{"quotes": [{"id": 1}]}"#).unwrap();

    let config = Config {
        data_file: path.clone(),
        ..Config::default()
    };
    let result = Server::new(config);
    std::fs::remove_file(&path).unwrap();
    assert!(result.is_err());
}
