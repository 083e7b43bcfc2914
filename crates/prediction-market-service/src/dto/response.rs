//! 响应 DTO 定义

use serde::Serialize;

use crate::models::{Market, User, VoteHistoryRow, VoteResult, VoteStats};

/// API 统一响应
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub code: String,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// 创建成功响应
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            code: "SUCCESS".to_string(),
            message: "操作成功".to_string(),
            data: Some(data),
        }
    }

    /// 创建带自定义消息的成功响应
    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            code: "SUCCESS".to_string(),
            message: message.into(),
            data: Some(data),
        }
    }
}

/// 注册和登录的响应
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

/// 结算响应
#[derive(Debug, Serialize)]
pub struct ResolveMarketResponse {
    pub market: Market,
    pub points_awarded: i64,
}

/// 投票历史条目
#[derive(Debug, Serialize)]
pub struct VoteHistoryItem {
    #[serde(flatten)]
    pub vote: VoteHistoryRow,
    pub result: VoteResult,
}

impl From<VoteHistoryRow> for VoteHistoryItem {
    fn from(vote: VoteHistoryRow) -> Self {
        let result = vote.result();
        Self { vote, result }
    }
}

/// 投票历史
#[derive(Debug, Serialize)]
pub struct VoteHistoryResponse {
    pub votes: Vec<VoteHistoryItem>,
    pub stats: VoteStats,
}

impl VoteHistoryResponse {
    pub fn from_rows(rows: Vec<VoteHistoryRow>) -> Self {
        let votes: Vec<VoteHistoryItem> = rows.into_iter().map(Into::into).collect();
        let stats = VoteStats::from_results(votes.iter().map(|v| v.result));
        Self { votes, stats }
    }
}
