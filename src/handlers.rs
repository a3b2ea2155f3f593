use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use crate::error::{Result, WisdomError};
use crate::health::HealthChecker;
use crate::query::{ListFilters, QueryEngine};
use crate::rate_limiter::RateLimiter;
use crate::response::{
    AuthorsResponse, CategoriesResponse, InfoResponse, SourcesResponse, WisdomListResponse,
    WisdomResponse, API_DESCRIPTION, API_NAME,
};
use crate::store::RecordStore;
use crate::validation::{PageRequest, RequestValidator, MAX_LIST_PER_PAGE, MAX_SEARCH_PER_PAGE};

/// Shared application state
pub type SharedState = Arc<AppState>;

/// Application state containing the record store and rate limiter
pub struct AppState {
    pub store: Arc<RecordStore>,
    pub rate_limiter: RateLimiter,
    pub health: HealthChecker,
}

impl AppState {
    pub fn new(store: RecordStore, rate_limiter: RateLimiter) -> SharedState {
        Arc::new(Self {
            store: Arc::new(store),
            rate_limiter,
            health: HealthChecker::new(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub category: Option<String>,
    pub author: Option<String>,
    pub source: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

fn query_params<T>(params: std::result::Result<Query<T>, QueryRejection>) -> Result<T> {
    params
        .map(|Query(params)| params)
        .map_err(|rejection| WisdomError::Validation(rejection.body_text()))
}

const LANDING_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Tibetan Wisdom Quotes API</title>
</head>
<body>
    <h1>Tibetan Wisdom API</h1>
    <p>Profound wisdom from Tibetan Buddhist masters and traditional teachings.</p>
    <h2>Endpoints</h2>
    <ul>
        <li><code>GET /wisdom/random</code> a random piece of wisdom</li>
        <li><code>GET /wisdom?page=1&amp;per_page=10&amp;category=&amp;author=&amp;source=</code> paginated listing</li>
        <li><code>GET /wisdom/search?q=compassion</code> search text, author and source</li>
        <li><code>GET /wisdom/{id}</code> a specific piece of wisdom</li>
        <li><code>GET /wisdom/categories</code>, <code>/wisdom/authors</code>, <code>/wisdom/sources</code></li>
        <li><code>GET /info</code>, <code>GET /health</code></li>
    </ul>
</body>
</html>
"#;

/// Landing page
pub async fn landing_page() -> Html<&'static str> {
    Html(LANDING_PAGE)
}

/// API information and statistics
pub async fn api_info(State(state): State<SharedState>) -> Response {
    Json(InfoResponse {
        name: API_NAME,
        version: env!("CARGO_PKG_VERSION"),
        description: API_DESCRIPTION,
        total_wisdom: state.store.count(),
        categories: state.store.categories(),
        authors: state.store.authors(),
    })
    .into_response()
}

pub async fn random_wisdom(State(state): State<SharedState>) -> Result<Response> {
    let wisdom = QueryEngine::new(&state.store).random()?;
    debug!(id = wisdom.id, "Selected random wisdom");
    Ok(Json(WisdomResponse { wisdom }).into_response())
}

/// Paginated listing with optional category, author and source filters
pub async fn list_wisdom(
    State(state): State<SharedState>,
    params: std::result::Result<Query<ListParams>, QueryRejection>,
) -> Result<Response> {
    let params = query_params(params)?;
    let request = PageRequest::from_params(params.page, params.per_page, MAX_LIST_PER_PAGE)?;
    let filters = ListFilters::new(
        params.category.as_deref(),
        params.author.as_deref(),
        params.source.as_deref(),
    );

    let page = QueryEngine::new(&state.store).list(&filters, request);
    Ok(Json(WisdomListResponse::from(page)).into_response())
}

pub async fn search_wisdom(
    State(state): State<SharedState>,
    params: std::result::Result<Query<SearchParams>, QueryRejection>,
) -> Result<Response> {
    let params = query_params(params)?;
    let q = RequestValidator::validate_search_query(params.q)?;
    let request = PageRequest::from_params(params.page, params.per_page, MAX_SEARCH_PER_PAGE)?;

    let page = QueryEngine::new(&state.store).search(&q, request);
    debug!(query = %q, total = page.total, "Search completed");
    Ok(Json(WisdomListResponse::from(page)).into_response())
}

pub async fn list_categories(State(state): State<SharedState>) -> Response {
    Json(CategoriesResponse {
        categories: state.store.categories(),
    })
    .into_response()
}

pub async fn list_authors(State(state): State<SharedState>) -> Response {
    Json(AuthorsResponse {
        authors: state.store.authors(),
    })
    .into_response()
}

pub async fn list_sources(State(state): State<SharedState>) -> Response {
    Json(SourcesResponse {
        sources: state.store.sources(),
    })
    .into_response()
}

pub async fn wisdom_by_id(
    State(state): State<SharedState>,
    Path(raw_id): Path<String>,
) -> Result<Response> {
    let id = RequestValidator::validate_id(&raw_id)?;
    let wisdom = QueryEngine::new(&state.store).get(id)?;
    Ok(Json(WisdomResponse { wisdom }).into_response())
}

/// Health check with basic collection statistics
pub async fn health_check(State(state): State<SharedState>) -> impl IntoResponse {
    Json(
        state
            .health
            .check_health(&state.store, state.rate_limiter.config()),
    )
}
