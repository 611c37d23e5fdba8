use axum::{extract::State, Json};
use std::sync::Arc;

use catalog_query::search::translate;

use super::types::*;
use crate::api::ApiResponse;
use crate::state::AppState;

/// POST /api/search/parse - 只解析，不查询
pub async fn parse_query(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ParseRequest>,
) -> Json<ApiResponse<ParseResponse>> {
    match state.parser.parse(&req.query) {
        Ok(conditions) => {
            let filter = translate(&conditions, state.catalog_config.base_filter(), req.max_access_level);
            Json(ApiResponse::success(ParseResponse { conditions, filter }))
        }
        Err(e) => Json(ApiResponse::error(&e.to_string())),
    }
}

/// POST /api/search - 解析查询并检索目录
pub async fn search(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> Json<ApiResponse<SearchResponse>> {
    let conditions = match state.parser.parse(&req.query) {
        Ok(conditions) => conditions,
        Err(e) => {
            // 无法解析时返回空结果而不是报错
            tracing::warn!("搜索：无法解析查询 {:?}: {}", req.query, e);
            return Json(ApiResponse::success_with_message(SearchResponse::empty(), &e.to_string()));
        }
    };

    let predicate = translate(&conditions, state.catalog_config.base_filter(), req.max_access_level);
    let limit = state.catalog_config.clamp_limit(req.limit);

    let items = match state.catalog.search(&predicate, limit).await {
        Ok(items) => items,
        Err(e) => {
            tracing::error!("Catalog search failed: {}", e);
            return Json(ApiResponse::error("搜索失败"));
        }
    };

    let total = match state.catalog.count(&predicate).await {
        Ok(total) => total,
        Err(e) => {
            tracing::warn!("Catalog count failed: {}", e);
            items.len() as u64
        }
    };

    tracing::debug!("搜索：{:?} -> {} 条结果", req.query, items.len());
    Json(ApiResponse::success(SearchResponse { conditions, items, total }))
}
