//! 市场仓储
//!
//! 结算在单个事务内完成：锁定市场行、更新状态、为押中的投票者加分

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use super::traits::MarketRepositoryTrait;
use crate::error::{ApiError, Result};
use crate::models::{
    Market, MarketStatus, MarketWithStats, NewMarket, ResolvedMarket, VoteChoice,
};

const MARKET_COLUMNS: &str = "id, title, description, rules, close_time, status, resolution, \
     show_totals, created_by, created_at, resolved_at";

/// 带创建者和投票统计的查询，WHERE 条件由调用方追加
const MARKET_WITH_STATS_SELECT: &str = r#"
    SELECT m.id, m.title, m.description, m.rules, m.close_time, m.status, m.resolution,
           m.show_totals, m.created_by, m.created_at, m.resolved_at,
           u.name AS creator_name,
           COUNT(v.id) FILTER (WHERE v.choice = 'YES') AS yes_count,
           COUNT(v.id) FILTER (WHERE v.choice = 'NO') AS no_count,
           COUNT(v.id) AS total_votes
    FROM markets m
    JOIN users u ON u.id = m.created_by
    LEFT JOIN votes v ON v.market_id = m.id
"#;

pub struct MarketRepository {
    pool: PgPool,
}

impl MarketRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 在事务中以排他锁读取市场
    async fn get_for_update(conn: &mut PgConnection, id: i64) -> Result<Option<Market>> {
        let market = sqlx::query_as::<_, Market>(&format!(
            "SELECT {MARKET_COLUMNS} FROM markets WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(market)
    }
}

#[async_trait]
impl MarketRepositoryTrait for MarketRepository {
    async fn get_with_stats(&self, id: i64) -> Result<Option<MarketWithStats>> {
        let market = sqlx::query_as::<_, MarketWithStats>(&format!(
            "{MARKET_WITH_STATS_SELECT} WHERE m.id = $1 GROUP BY m.id, u.name"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(market)
    }

    async fn list_with_stats(&self, status: Option<MarketStatus>) -> Result<Vec<MarketWithStats>> {
        let markets = sqlx::query_as::<_, MarketWithStats>(&format!(
            r#"
            {MARKET_WITH_STATS_SELECT}
            WHERE ($1::varchar IS NULL OR m.status = $1)
            GROUP BY m.id, u.name
            ORDER BY m.created_at DESC, m.id DESC
            "#
        ))
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(markets)
    }

    async fn create(&self, market: &NewMarket) -> Result<Market> {
        let created = sqlx::query_as::<_, Market>(&format!(
            r#"
            INSERT INTO markets (title, description, rules, close_time, show_totals, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {MARKET_COLUMNS}
            "#
        ))
        .bind(&market.title)
        .bind(&market.description)
        .bind(&market.rules)
        .bind(market.close_time)
        .bind(market.show_totals)
        .bind(market.created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn close_expired(&self, now: DateTime<Utc>) -> Result<Vec<i64>> {
        let ids = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE markets
            SET status = 'closed'
            WHERE status = 'open' AND close_time <= $1
            RETURNING id
            "#,
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn resolve(
        &self,
        id: i64,
        resolution: VoteChoice,
        points_per_winner: i64,
    ) -> Result<ResolvedMarket> {
        let mut tx = self.pool.begin().await?;

        let market = Self::get_for_update(&mut tx, id)
            .await?
            .ok_or(ApiError::MarketNotFound(id))?;
        market.ensure_resolvable()?;

        let market = sqlx::query_as::<_, Market>(&format!(
            r#"
            UPDATE markets
            SET status = 'resolved', resolution = $2, resolved_at = NOW()
            WHERE id = $1
            RETURNING {MARKET_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(resolution)
        .fetch_one(&mut *tx)
        .await?;

        let winner_ids = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE users
            SET points = points + $3
            WHERE id IN (SELECT user_id FROM votes WHERE market_id = $1 AND choice = $2)
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(resolution)
        .bind(points_per_winner)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(ResolvedMarket { market, winner_ids })
    }
}
