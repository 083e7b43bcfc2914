//! 投票仓储

use async_trait::async_trait;
use sqlx::PgPool;
use vote_shared::error::is_unique_violation;

use super::traits::VoteRepositoryTrait;
use crate::error::{ApiError, Result};
use crate::models::{Market, Vote, VoteChoice, VoteHistoryRow};

pub struct VoteRepository {
    pool: PgPool,
}

impl VoteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VoteRepositoryTrait for VoteRepository {
    async fn cast(&self, market_id: i64, user_id: i64, choice: VoteChoice) -> Result<Vote> {
        let mut tx = self.pool.begin().await?;

        // 共享锁阻止自动关闭在投票期间修改状态
        let market = sqlx::query_as::<_, Market>(
            r#"
            SELECT id, title, description, rules, close_time, status, resolution,
                   show_totals, created_by, created_at, resolved_at
            FROM markets
            WHERE id = $1
            FOR SHARE
            "#,
        )
        .bind(market_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(ApiError::MarketNotFound(market_id))?;
        market.ensure_accepts_votes()?;

        let existing = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM votes WHERE market_id = $1 AND user_id = $2",
        )
        .bind(market_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;
        if existing.is_some() {
            return Err(ApiError::AlreadyVoted(market_id));
        }

        // 并发请求越过上面的检查时，由唯一索引兜底
        let vote = sqlx::query_as::<_, Vote>(
            r#"
            INSERT INTO votes (market_id, user_id, choice)
            VALUES ($1, $2, $3)
            RETURNING id, market_id, user_id, choice, created_at
            "#,
        )
        .bind(market_id)
        .bind(user_id)
        .bind(choice)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::AlreadyVoted(market_id)
            } else {
                ApiError::Database(e)
            }
        })?;

        tx.commit().await?;

        Ok(vote)
    }

    async fn find(&self, market_id: i64, user_id: i64) -> Result<Option<Vote>> {
        let vote = sqlx::query_as::<_, Vote>(
            r#"
            SELECT id, market_id, user_id, choice, created_at
            FROM votes
            WHERE market_id = $1 AND user_id = $2
            "#,
        )
        .bind(market_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(vote)
    }

    async fn history(&self, user_id: i64) -> Result<Vec<VoteHistoryRow>> {
        let rows = sqlx::query_as::<_, VoteHistoryRow>(
            r#"
            SELECT v.id, v.market_id, v.choice, v.created_at,
                   m.title, m.description, m.status, m.resolution,
                   m.close_time, m.resolved_at
            FROM votes v
            JOIN markets m ON m.id = v.market_id
            WHERE v.user_id = $1
            ORDER BY v.created_at DESC, v.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
