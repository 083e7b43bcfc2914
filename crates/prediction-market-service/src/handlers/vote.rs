//! 投票 HTTP 处理器

use axum::{
    Extension, Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};

use crate::auth::Claims;
use crate::dto::{ApiResponse, CastVoteRequest, VoteHistoryResponse};
use crate::error::Result;
use crate::models::Vote;
use crate::state::AppState;

/// POST /api/votes
pub async fn cast_vote(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    payload: std::result::Result<Json<CastVoteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Vote>>)> {
    let Json(req) = payload?;
    let vote = state
        .vote_service
        .cast(claims.user_id()?, req.market_id, req.choice)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(vote, "投票成功")),
    ))
}

/// 当前用户在某市场的投票，未投票时 data 为 null
///
/// GET /api/votes/market/{market_id}
pub async fn my_vote(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    path: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Json<ApiResponse<Option<Vote>>>> {
    let Path(market_id) = path?;
    let vote = state
        .vote_service
        .my_vote(claims.user_id()?, market_id)
        .await?;
    Ok(Json(ApiResponse::success(vote)))
}

/// GET /api/votes/my-votes
pub async fn my_votes(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<VoteHistoryResponse>>> {
    let history = state.vote_service.history(claims.user_id()?).await?;
    Ok(Json(ApiResponse::success(history)))
}
