//! 预测市场实体

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{MarketStatus, VoteChoice};
use crate::error::ApiError;

/// 预测市场
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Market {
    pub id: i64,
    pub title: String,
    pub description: String,
    #[sqlx(default)]
    pub rules: Option<String>,
    pub close_time: DateTime<Utc>,
    pub status: MarketStatus,
    /// 仅在 resolved 状态下存在
    #[sqlx(default)]
    pub resolution: Option<VoteChoice>,
    pub show_totals: bool,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    #[sqlx(default)]
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Market {
    /// 投票前检查市场是否仍接受投票
    pub fn ensure_accepts_votes(&self) -> Result<(), ApiError> {
        if self.status == MarketStatus::Open {
            Ok(())
        } else {
            Err(ApiError::MarketNotOpen(self.id))
        }
    }

    /// 结算前检查市场状态
    pub fn ensure_resolvable(&self) -> Result<(), ApiError> {
        if self.status.can_transition_to(MarketStatus::Resolved) {
            return Ok(());
        }
        match self.status {
            MarketStatus::Resolved => Err(ApiError::MarketAlreadyResolved(self.id)),
            _ => Err(ApiError::MarketNotClosed(self.id)),
        }
    }
}

/// 新建市场参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMarket {
    pub title: String,
    pub description: String,
    pub rules: Option<String>,
    pub close_time: DateTime<Utc>,
    pub show_totals: bool,
    pub created_by: i64,
}

/// 带创建者名称和投票统计的市场视图
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MarketWithStats {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub market: Market,
    pub creator_name: String,
    /// 统计对调用者隐藏时为 None
    pub yes_count: Option<i64>,
    pub no_count: Option<i64>,
    pub total_votes: Option<i64>,
}

impl MarketWithStats {
    /// 统计对外可见：创建者允许公开，或市场已停止投票
    pub fn totals_visible(&self) -> bool {
        self.market.show_totals || self.market.status != MarketStatus::Open
    }

    /// 按可见性规则清除统计字段
    pub fn apply_visibility(mut self) -> Self {
        if !self.totals_visible() {
            self.yes_count = None;
            self.no_count = None;
            self.total_votes = None;
        }
        self
    }
}

/// 结算结果：更新后的市场和获得积分的用户
#[derive(Debug, Clone)]
pub struct ResolvedMarket {
    pub market: Market,
    pub winner_ids: Vec<i64>,
}
