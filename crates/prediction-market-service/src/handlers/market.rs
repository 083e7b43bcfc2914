//! 市场 HTTP 处理器

use axum::{
    Extension, Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use chrono::Utc;

use crate::auth::Claims;
use crate::dto::{
    ApiResponse, CreateMarketRequest, MarketListQuery, ResolveMarketRequest,
    ResolveMarketResponse,
};
use crate::error::Result;
use crate::models::{Market, MarketWithStats};
use crate::state::AppState;

/// 市场列表，可按状态过滤
///
/// GET /api/markets?status=open
pub async fn list_markets(
    State(state): State<AppState>,
    query: std::result::Result<Query<MarketListQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<MarketWithStats>>>> {
    let Query(query) = query?;
    let markets = state.market_service.list(query.status).await?;
    Ok(Json(ApiResponse::success(markets)))
}

/// GET /api/markets/{id}
pub async fn get_market(
    State(state): State<AppState>,
    path: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Json<ApiResponse<MarketWithStats>>> {
    let Path(id) = path?;
    let market = state.market_service.get(id).await?;
    Ok(Json(ApiResponse::success(market)))
}

/// 创建市场（管理员）
///
/// POST /api/markets
pub async fn create_market(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    payload: std::result::Result<Json<CreateMarketRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Market>>)> {
    let Json(req) = payload?;
    let market = state
        .market_service
        .create(claims.user_id()?, req, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(market))))
}

/// 结算市场（管理员）
///
/// POST /api/markets/{id}/resolve
pub async fn resolve_market(
    State(state): State<AppState>,
    path: std::result::Result<Path<i64>, PathRejection>,
    payload: std::result::Result<Json<ResolveMarketRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ResolveMarketResponse>>> {
    let Path(id) = path?;
    let Json(req) = payload?;
    let response = state.market_service.resolve(id, req.resolution).await?;
    Ok(Json(ApiResponse::success_with_message(response, "市场已结算")))
}
