use axum::{
    routing::{get, post},
    Router,
    extract::{Json, Query, State},
};
use serde_json::{json, Value};
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::TraceLayer;

use crate::error::{Result, AppError};
use crate::api::models::{
    DismissRequest, DismissResponse, FilterQuery, KeyQuery, ResultsResponse, SearchRequest,
};
use crate::api::response::{self, ApiResult};
use crate::AppState;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/results", get(results_handler))
        .route("/api/results/filter", get(filter_handler))
        .route("/api/results/dismiss", post(dismiss_handler))
        .route("/api/search", post(search_handler))
        .route("/api/search/more", post(more_handler))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state)
}

async fn health_handler(State(state): State<AppState>) -> ApiResult<Value> {
    response::success(json!({
        "status": "ok",
        "search_keys": state.coordinator.store().len(),
    }))
}

/// Reads the accumulated state for `key`, or 404s.
fn stored(state: &AppState, key: String) -> Result<ResultsResponse> {
    match state.coordinator.current_state(&key) {
        Some(results) => Ok(ResultsResponse { key, state: results }),
        None => Err(AppError::NotFound(key)),
    }
}

async fn results_handler(
    State(state): State<AppState>,
    Query(params): Query<KeyQuery>,
) -> Result<ApiResult<ResultsResponse>> {
    Ok(response::success(stored(&state, params.query)?))
}

async fn filter_handler(
    State(state): State<AppState>,
    Query(params): Query<FilterQuery>,
) -> Result<ApiResult<ResultsResponse>> {
    let results = state
        .coordinator
        .store()
        .filtered(&params.query, &params.term)
        .ok_or_else(|| AppError::NotFound(params.query.clone()))?;

    Ok(response::success(ResultsResponse { key: params.query, state: results }))
}

// A failed fetch is not reported: the caller just sees whatever was stored
// before, or a 404 if nothing ever was.
async fn search_handler(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<ApiResult<ResultsResponse>> {
    state.coordinator.submit(&req.query).await;
    Ok(response::success(stored(&state, req.query)?))
}

async fn more_handler(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<ApiResult<ResultsResponse>> {
    state.coordinator.load_more(&req.query).await;
    Ok(response::success(stored(&state, req.query)?))
}

async fn dismiss_handler(
    State(state): State<AppState>,
    Json(req): Json<DismissRequest>,
) -> Result<ApiResult<DismissResponse>> {
    let removed = state.coordinator.dismiss(&req.query, &req.id);
    let results = stored(&state, req.query)?;

    Ok(response::success(DismissResponse {
        key: results.key,
        removed,
        state: results.state,
    }))
}
