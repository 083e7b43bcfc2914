//! 徽章评估器
//!
//! 重新计算用户的累计统计并发放新满足条件的徽章。
//! 每次投票和每次结算之后同步调用；发放只增不减，重复发放被唯一约束吸收。

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{info, instrument, warn};
use vote_shared::observability::metrics;

use crate::error::Result;
use crate::models::{Badge, RequirementType};
use crate::repository::BadgeRepositoryTrait;

pub struct BadgeEvaluator<BR>
where
    BR: BadgeRepositoryTrait,
{
    badge_repo: Arc<BR>,
}

impl<BR> BadgeEvaluator<BR>
where
    BR: BadgeRepositoryTrait,
{
    pub fn new(badge_repo: Arc<BR>) -> Self {
        Self { badge_repo }
    }

    /// 评估并发放徽章，返回本次新获得的徽章
    #[instrument(skip(self))]
    pub async fn evaluate(&self, user_id: i64) -> Result<Vec<Badge>> {
        let owned: HashSet<i64> = self
            .badge_repo
            .owned_badge_ids(user_id)
            .await?
            .into_iter()
            .collect();

        let candidates: Vec<Badge> = self
            .badge_repo
            .list_badges()
            .await?
            .into_iter()
            .filter(|b| !owned.contains(&b.id))
            .collect();

        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let stats = self.badge_repo.user_stats(user_id).await?;

        // 只取最长连胜门槛所需的窗口
        let streak_window = candidates
            .iter()
            .filter(|b| b.requirement_type == RequirementType::Streak)
            .map(|b| b.requirement_value)
            .max();
        let recent_outcomes = match streak_window {
            Some(window) => {
                self.badge_repo
                    .recent_resolved_outcomes(user_id, window)
                    .await?
            }
            None => Vec::new(),
        };

        let mut awarded = Vec::new();
        for badge in candidates {
            if !badge.is_earned(&stats, &recent_outcomes) {
                continue;
            }
            if self.badge_repo.award(user_id, badge.id).await? {
                info!(user_id, badge_id = badge.id, badge = %badge.name, "徽章已发放");
                metrics::record_badge_awarded(&badge.name);
                awarded.push(badge);
            }
        }

        Ok(awarded)
    }

    /// 评估失败只记录日志，不影响触发它的请求
    pub async fn evaluate_best_effort(&self, user_id: i64) -> Vec<Badge> {
        match self.evaluate(user_id).await {
            Ok(awarded) => awarded,
            Err(e) => {
                warn!(user_id, error = %e, "徽章评估失败");
                metrics::record_badge_evaluation_failure();
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::models::UserStats;
    use crate::repository::MockBadgeRepositoryTrait;
    use mockall::predicate::eq;

    fn catalog() -> Vec<Badge> {
        [
            (1, "First Vote", RequirementType::Votes, 1),
            (2, "Vote Enthusiast", RequirementType::Votes, 10),
            (4, "Predictor", RequirementType::Correct, 5),
            (6, "Winning Streak", RequirementType::Streak, 5),
            (7, "Points Hunter", RequirementType::Points, 100),
        ]
        .into_iter()
        .map(|(id, name, requirement_type, requirement_value)| Badge {
            id,
            name: name.into(),
            description: String::new(),
            icon: "🏅".into(),
            requirement_type,
            requirement_value,
        })
        .collect()
    }

    fn stats(total_votes: i64, correct_votes: i64, points: i64) -> UserStats {
        UserStats {
            total_votes,
            correct_votes,
            points,
        }
    }

    #[tokio::test]
    async fn test_awards_only_newly_qualified_badges() {
        let mut repo = MockBadgeRepositoryTrait::new();
        repo.expect_owned_badge_ids()
            .with(eq(42))
            .returning(|_| Ok(vec![1]));
        repo.expect_list_badges().returning(|| Ok(catalog()));
        repo.expect_user_stats()
            .returning(|_| Ok(stats(10, 2, 20)));
        repo.expect_recent_resolved_outcomes()
            .with(eq(42), eq(5))
            .returning(|_, _| Ok(vec![true, true]));
        repo.expect_award()
            .with(eq(42), eq(2))
            .times(1)
            .returning(|_, _| Ok(true));

        let evaluator = BadgeEvaluator::new(Arc::new(repo));
        let awarded = evaluator.evaluate(42).await.unwrap();

        let names: Vec<_> = awarded.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Vote Enthusiast"]);
    }

    #[tokio::test]
    async fn test_threshold_not_crossed_awards_nothing() {
        // 3 个已结算市场中押中 2 个：20 分，不足以获得 Predictor
        let mut repo = MockBadgeRepositoryTrait::new();
        repo.expect_owned_badge_ids().returning(|_| Ok(vec![1]));
        repo.expect_list_badges().returning(|| Ok(catalog()));
        repo.expect_user_stats().returning(|_| Ok(stats(3, 2, 20)));
        repo.expect_recent_resolved_outcomes()
            .returning(|_, _| Ok(vec![true, false, true]));
        repo.expect_award().never();

        let evaluator = BadgeEvaluator::new(Arc::new(repo));
        assert!(evaluator.evaluate(7).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_award_is_not_reported_twice() {
        let mut repo = MockBadgeRepositoryTrait::new();
        repo.expect_owned_badge_ids().returning(|_| Ok(vec![]));
        repo.expect_list_badges()
            .returning(|| Ok(catalog().into_iter().take(1).collect()));
        repo.expect_user_stats().returning(|_| Ok(stats(1, 0, 0)));
        // 另一请求已抢先写入
        repo.expect_award().returning(|_, _| Ok(false));

        let evaluator = BadgeEvaluator::new(Arc::new(repo));
        assert!(evaluator.evaluate(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_all_badges_owned_skips_stats() {
        let mut repo = MockBadgeRepositoryTrait::new();
        repo.expect_owned_badge_ids()
            .returning(|_| Ok(vec![1, 2, 4, 6, 7]));
        repo.expect_list_badges().returning(|| Ok(catalog()));
        repo.expect_user_stats().never();

        let evaluator = BadgeEvaluator::new(Arc::new(repo));
        assert!(evaluator.evaluate(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_best_effort_swallows_errors() {
        let mut repo = MockBadgeRepositoryTrait::new();
        repo.expect_owned_badge_ids()
            .returning(|_| Err(ApiError::Database(sqlx::Error::PoolTimedOut)));

        let evaluator = BadgeEvaluator::new(Arc::new(repo));
        assert!(evaluator.evaluate_best_effort(1).await.is_empty());
    }
}
