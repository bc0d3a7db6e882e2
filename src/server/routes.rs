use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use log::{debug, error};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use super::error::AppError;
use crate::api::SanctionRecord;
use crate::query::QueryService;
use crate::refresh::RefreshStatus;

/// Per-dataset routes, mounted under the dataset's prefix:
///
/// - GET  /list?force=true|false
/// - POST /search  `{query, limit?}`
/// - GET  /test-connection
pub fn router(service: Arc<QueryService>) -> Router {
    Router::new()
        .route("/list", get(list))
        .route("/search", post(search))
        .route("/test-connection", get(test_connection))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
struct ListParams {
    force: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse<'a> {
    success: bool,
    data: &'a [SanctionRecord],
    last_updated: Option<DateTime<Utc>>,
    count: usize,
    #[serde(rename = "_cached")]
    cached: bool,
    #[serde(rename = "_warning", skip_serializing_if = "Option::is_none")]
    warning: Option<String>,
}

async fn list(
    State(service): State<Arc<QueryService>>,
    Query(params): Query<ListParams>,
) -> Result<Response, AppError> {
    let force = params.force.as_deref() == Some("true");
    let outcome = service.list(force).await.map_err(|e| {
        error!("{} list error: {}", service.kind(), e);
        AppError::from(e)
    })?;

    let body = ListResponse {
        success: true,
        data: outcome.snapshot.records(),
        last_updated: outcome.snapshot.last_updated(),
        count: outcome.snapshot.count(),
        cached: outcome.cached,
        warning: outcome.warning,
    };
    Ok(Json(body).into_response())
}

/// `query` and `limit` arrive untyped so that wrong types become 400s
#[derive(Debug, Deserialize)]
struct SearchRequest {
    query: Option<Value>,
    limit: Option<Value>,
}

#[derive(Serialize)]
struct SearchResponse {
    success: bool,
    data: Vec<SanctionRecord>,
    count: usize,
    total: usize,
}

fn validate_search(request: SearchRequest) -> Result<(String, Option<usize>), AppError> {
    let query = match request.query {
        Some(Value::String(query)) if !query.is_empty() => query,
        _ => {
            return Err(AppError::Validation(
                "Search query is required and must be a string".to_string(),
            ))
        }
    };

    let limit = match request.limit {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) => match n.as_u64() {
            Some(limit) => Some(usize::try_from(limit).unwrap_or(usize::MAX)),
            None => {
                return Err(AppError::Validation(
                    "limit must be a non-negative integer".to_string(),
                ))
            }
        },
        Some(_) => {
            return Err(AppError::Validation(
                "limit must be a non-negative integer".to_string(),
            ))
        }
    };

    Ok((query, limit))
}

async fn search(
    State(service): State<Arc<QueryService>>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    let (query, limit) = validate_search(request)?;
    debug!("{} search for '{}' (limit {:?})", service.kind(), query, limit);

    let outcome = service.search(&query, limit).await?;
    Ok(Json(SearchResponse {
        success: true,
        data: outcome.data,
        count: outcome.count,
        total: outcome.total,
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConnectionResponse {
    success: bool,
    message: &'static str,
    dataset: &'static str,
    last_updated: Option<DateTime<Utc>>,
    entry_count: usize,
    refresh: RefreshStatus,
}

async fn test_connection(State(service): State<Arc<QueryService>>) -> Json<ConnectionResponse> {
    let snapshot = service.dataset().snapshot().await;
    Json(ConnectionResponse {
        success: true,
        message: "Server is running",
        dataset: service.kind().as_str(),
        last_updated: snapshot.last_updated(),
        entry_count: snapshot.count(),
        refresh: service.dataset().status().await,
    })
}
