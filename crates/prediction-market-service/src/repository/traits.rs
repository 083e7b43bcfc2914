//! 仓储 Trait 定义
//!
//! 服务层依赖这些抽象而非具体实现，支持 mock 测试

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{
    Badge, BadgeWithEarned, LeaderboardEntry, Market, MarketStatus, MarketWithStats, NewMarket,
    NewUser, ResolvedMarket, User, UserStats, Vote, VoteChoice, VoteHistoryRow,
};

/// 用户仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepositoryTrait: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn find_by_oauth(&self, provider: &str, oauth_id: &str) -> Result<Option<User>>;

    /// 邮箱重复时返回 `EmailAlreadyRegistered`
    async fn create(&self, user: &NewUser) -> Result<User>;

    /// 按积分、正确数倒序
    async fn leaderboard(&self, limit: i64) -> Result<Vec<LeaderboardEntry>>;
}

/// 市场仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketRepositoryTrait: Send + Sync {
    async fn get_with_stats(&self, id: i64) -> Result<Option<MarketWithStats>>;
    async fn list_with_stats(&self, status: Option<MarketStatus>) -> Result<Vec<MarketWithStats>>;
    async fn create(&self, market: &NewMarket) -> Result<Market>;

    /// 关闭所有已过截止时间的 open 市场，返回被关闭的市场 ID
    async fn close_expired(&self, now: DateTime<Utc>) -> Result<Vec<i64>>;

    /// 在同一事务内结算市场并为押中的投票者加分
    async fn resolve(
        &self,
        id: i64,
        resolution: VoteChoice,
        points_per_winner: i64,
    ) -> Result<ResolvedMarket>;
}

/// 投票仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VoteRepositoryTrait: Send + Sync {
    /// 锁定市场行后写入投票；市场不存在、非 open、重复投票均返回对应错误
    async fn cast(&self, market_id: i64, user_id: i64, choice: VoteChoice) -> Result<Vote>;
    async fn find(&self, market_id: i64, user_id: i64) -> Result<Option<Vote>>;
    /// 按投票时间倒序
    async fn history(&self, user_id: i64) -> Result<Vec<VoteHistoryRow>>;
}

/// 徽章仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BadgeRepositoryTrait: Send + Sync {
    /// 按门槛升序
    async fn list_badges(&self) -> Result<Vec<Badge>>;
    async fn user_stats(&self, user_id: i64) -> Result<UserStats>;
    /// 最近若干个已结算投票是否正确，按市场结算时间倒序
    async fn recent_resolved_outcomes(&self, user_id: i64, limit: i64) -> Result<Vec<bool>>;
    async fn owned_badge_ids(&self, user_id: i64) -> Result<Vec<i64>>;
    /// 幂等写入；已持有时返回 false
    async fn award(&self, user_id: i64, badge_id: i64) -> Result<bool>;
    async fn list_with_earned(&self, user_id: i64) -> Result<Vec<BadgeWithEarned>>;
}
