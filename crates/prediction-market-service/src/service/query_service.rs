//! 排行榜与徽章墙查询（只读）

use std::sync::Arc;

use crate::error::Result;
use crate::models::{BadgeWithEarned, LeaderboardEntry};
use crate::repository::{BadgeRepositoryTrait, UserRepositoryTrait};

pub const MAX_LEADERBOARD_LIMIT: i64 = 100;

pub struct QueryService<UR, BR>
where
    UR: UserRepositoryTrait,
    BR: BadgeRepositoryTrait,
{
    user_repo: Arc<UR>,
    badge_repo: Arc<BR>,
}

impl<UR, BR> QueryService<UR, BR>
where
    UR: UserRepositoryTrait,
    BR: BadgeRepositoryTrait,
{
    pub fn new(user_repo: Arc<UR>, badge_repo: Arc<BR>) -> Self {
        Self {
            user_repo,
            badge_repo,
        }
    }

    /// 未指定或超出范围的 limit 收敛到 1..=100
    pub async fn leaderboard(&self, limit: Option<i64>) -> Result<Vec<LeaderboardEntry>> {
        let limit = limit
            .unwrap_or(MAX_LEADERBOARD_LIMIT)
            .clamp(1, MAX_LEADERBOARD_LIMIT);
        self.user_repo.leaderboard(limit).await
    }

    pub async fn badges(&self, user_id: i64) -> Result<Vec<BadgeWithEarned>> {
        self.badge_repo.list_with_earned(user_id).await
    }
}
