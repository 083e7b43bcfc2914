//! 徽章目录及用户成就

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::RequirementType;

/// 徽章定义
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Badge {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub requirement_type: RequirementType,
    pub requirement_value: i64,
}

impl Badge {
    /// 判断用户当前统计是否满足徽章条件
    ///
    /// `recent_outcomes` 为用户在已结算市场上的投票结果，按结算时间倒序
    pub fn is_earned(&self, stats: &UserStats, recent_outcomes: &[bool]) -> bool {
        let threshold = self.requirement_value;
        match self.requirement_type {
            RequirementType::Votes => stats.total_votes >= threshold,
            RequirementType::Correct => stats.correct_votes >= threshold,
            RequirementType::Points => stats.points >= threshold,
            RequirementType::Streak => {
                let Ok(n) = usize::try_from(threshold) else {
                    return false;
                };
                n > 0 && recent_outcomes.len() >= n && recent_outcomes[..n].iter().all(|&c| c)
            }
        }
    }
}

/// 徽章评估所需的用户统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserStats {
    pub total_votes: i64,
    pub correct_votes: i64,
    pub points: i64,
}

/// 徽章目录条目，附带当前用户的获得时间
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BadgeWithEarned {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub badge: Badge,
    #[sqlx(default)]
    pub earned_at: Option<DateTime<Utc>>,
}
