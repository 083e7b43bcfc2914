//! 市场生命周期服务
//!
//! ## 状态流转
//!
//! - 创建：管理员创建，初始状态 open
//! - 关闭：后台任务在截止时间到达后批量置为 closed
//! - 结算：管理员对 closed 市场给出 YES/NO 结果，押中者各得 10 分
//!
//! 结算后对每个获得积分的用户执行徽章评估，评估失败不影响结算结果。

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, instrument};
use validator::Validate;
use vote_shared::observability::metrics;

use crate::dto::{CreateMarketRequest, ResolveMarketResponse};
use crate::error::{ApiError, Result};
use crate::models::{Market, MarketStatus, MarketWithStats, NewMarket, VoteChoice};
use crate::repository::{BadgeRepositoryTrait, MarketRepositoryTrait};
use crate::service::BadgeEvaluator;

/// 每个押中结果的投票获得的积分
pub const POINTS_PER_CORRECT_VOTE: i64 = 10;

pub struct MarketService<MR, BR>
where
    MR: MarketRepositoryTrait,
    BR: BadgeRepositoryTrait,
{
    market_repo: Arc<MR>,
    evaluator: Arc<BadgeEvaluator<BR>>,
}

impl<MR, BR> MarketService<MR, BR>
where
    MR: MarketRepositoryTrait,
    BR: BadgeRepositoryTrait,
{
    pub fn new(market_repo: Arc<MR>, evaluator: Arc<BadgeEvaluator<BR>>) -> Self {
        Self {
            market_repo,
            evaluator,
        }
    }

    #[instrument(skip(self, req), fields(title = %req.title))]
    pub async fn create(
        &self,
        created_by: i64,
        req: CreateMarketRequest,
        now: DateTime<Utc>,
    ) -> Result<Market> {
        let req = req.normalized();
        req.validate()?;

        if req.close_time <= now {
            return Err(ApiError::CloseTimeInPast);
        }

        let market = self
            .market_repo
            .create(&NewMarket {
                title: req.title,
                description: req.description,
                rules: req.rules,
                close_time: req.close_time,
                show_totals: req.show_totals,
                created_by,
            })
            .await?;

        info!(market_id = market.id, close_time = %market.close_time, "市场已创建");
        Ok(market)
    }

    /// 按创建时间倒序列出市场，统计字段按可见性规则处理
    pub async fn list(&self, status: Option<MarketStatus>) -> Result<Vec<MarketWithStats>> {
        let markets = self.market_repo.list_with_stats(status).await?;
        Ok(markets
            .into_iter()
            .map(MarketWithStats::apply_visibility)
            .collect())
    }

    pub async fn get(&self, id: i64) -> Result<MarketWithStats> {
        self.market_repo
            .get_with_stats(id)
            .await?
            .map(MarketWithStats::apply_visibility)
            .ok_or(ApiError::MarketNotFound(id))
    }

    #[instrument(skip(self))]
    pub async fn resolve(&self, id: i64, resolution: VoteChoice) -> Result<ResolveMarketResponse> {
        let resolved = self
            .market_repo
            .resolve(id, resolution, POINTS_PER_CORRECT_VOTE)
            .await?;

        let winners = resolved.winner_ids.len() as i64;
        let points_awarded = winners * POINTS_PER_CORRECT_VOTE;
        info!(
            market_id = id,
            resolution = %resolution,
            winners,
            points_awarded,
            "市场已结算"
        );
        metrics::record_market_resolution(resolution.as_str(), points_awarded as u64);

        for user_id in &resolved.winner_ids {
            self.evaluator.evaluate_best_effort(*user_id).await;
        }

        Ok(ResolveMarketResponse {
            market: resolved.market,
            points_awarded,
        })
    }

    /// 关闭截止时间已到的市场，返回关闭数量
    #[instrument(skip(self))]
    pub async fn close_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let closed = self.market_repo.close_expired(now).await?;
        let count = closed.len() as u64;
        if count > 0 {
            info!(count, market_ids = ?closed, "已关闭到期市场");
            metrics::record_markets_closed(count);
        }
        Ok(count)
    }
}
