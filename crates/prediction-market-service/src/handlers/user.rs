//! 排行榜与徽章墙 HTTP 处理器

use axum::{
    Extension, Json,
    extract::{Query, State, rejection::QueryRejection},
};

use crate::auth::Claims;
use crate::dto::{ApiResponse, LeaderboardQuery};
use crate::error::Result;
use crate::models::{BadgeWithEarned, LeaderboardEntry};
use crate::state::AppState;

/// GET /api/users/leaderboard?limit=50
pub async fn leaderboard(
    State(state): State<AppState>,
    query: std::result::Result<Query<LeaderboardQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<LeaderboardEntry>>>> {
    let Query(query) = query?;
    let entries = state.query_service.leaderboard(query.limit).await?;
    Ok(Json(ApiResponse::success(entries)))
}

/// 全部徽章及当前用户的获得时间
///
/// GET /api/users/badges
pub async fn badges(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<Vec<BadgeWithEarned>>>> {
    let badges = state.query_service.badges(claims.user_id()?).await?;
    Ok(Json(ApiResponse::success(badges)))
}
