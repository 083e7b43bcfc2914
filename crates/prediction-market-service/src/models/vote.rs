//! 投票实体

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{MarketStatus, VoteChoice, VoteResult};

/// 投票，一经创建不可修改
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Vote {
    pub id: i64,
    pub market_id: i64,
    pub user_id: i64,
    pub choice: VoteChoice,
    pub created_at: DateTime<Utc>,
}

/// 投票历史行：投票和所属市场的摘要
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct VoteHistoryRow {
    pub id: i64,
    pub market_id: i64,
    pub choice: VoteChoice,
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub description: String,
    pub status: MarketStatus,
    #[sqlx(default)]
    pub resolution: Option<VoteChoice>,
    pub close_time: DateTime<Utc>,
    #[sqlx(default)]
    pub resolved_at: Option<DateTime<Utc>>,
}

impl VoteHistoryRow {
    pub fn result(&self) -> VoteResult {
        VoteResult::derive(self.choice, self.resolution)
    }
}

/// 投票历史汇总
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteStats {
    pub total: u64,
    pub correct: u64,
    pub incorrect: u64,
    pub pending: u64,
}

impl VoteStats {
    pub fn from_results(results: impl IntoIterator<Item = VoteResult>) -> Self {
        results
            .into_iter()
            .fold(Self::default(), |mut stats, result| {
                stats.total += 1;
                match result {
                    VoteResult::Correct => stats.correct += 1,
                    VoteResult::Incorrect => stats.incorrect += 1,
                    VoteResult::Pending => stats.pending += 1,
                }
                stats
            })
    }
}
