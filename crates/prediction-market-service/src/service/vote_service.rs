//! 投票服务

use std::sync::Arc;

use tracing::{info, instrument};
use vote_shared::observability::metrics;

use crate::dto::VoteHistoryResponse;
use crate::error::Result;
use crate::models::{Vote, VoteChoice};
use crate::repository::{BadgeRepositoryTrait, VoteRepositoryTrait};
use crate::service::BadgeEvaluator;

pub struct VoteService<VR, BR>
where
    VR: VoteRepositoryTrait,
    BR: BadgeRepositoryTrait,
{
    vote_repo: Arc<VR>,
    evaluator: Arc<BadgeEvaluator<BR>>,
}

impl<VR, BR> VoteService<VR, BR>
where
    VR: VoteRepositoryTrait,
    BR: BadgeRepositoryTrait,
{
    pub fn new(vote_repo: Arc<VR>, evaluator: Arc<BadgeEvaluator<BR>>) -> Self {
        Self {
            vote_repo,
            evaluator,
        }
    }

    /// 投票成功后评估投票者的徽章
    #[instrument(skip(self))]
    pub async fn cast(&self, user_id: i64, market_id: i64, choice: VoteChoice) -> Result<Vote> {
        let vote = self.vote_repo.cast(market_id, user_id, choice).await?;

        info!(vote_id = vote.id, "投票成功");
        metrics::record_vote_cast(choice.as_str());

        self.evaluator.evaluate_best_effort(user_id).await;
        Ok(vote)
    }

    pub async fn my_vote(&self, user_id: i64, market_id: i64) -> Result<Option<Vote>> {
        self.vote_repo.find(market_id, user_id).await
    }

    pub async fn history(&self, user_id: i64) -> Result<VoteHistoryResponse> {
        let rows = self.vote_repo.history(user_id).await?;
        Ok(VoteHistoryResponse::from_rows(rows))
    }
}
