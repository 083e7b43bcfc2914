//! 徽章仓储

use async_trait::async_trait;
use sqlx::PgPool;

use super::traits::BadgeRepositoryTrait;
use crate::error::{ApiError, Result};
use crate::models::{Badge, BadgeWithEarned, UserStats};

pub struct BadgeRepository {
    pool: PgPool,
}

impl BadgeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BadgeRepositoryTrait for BadgeRepository {
    async fn list_badges(&self) -> Result<Vec<Badge>> {
        let badges = sqlx::query_as::<_, Badge>(
            r#"
            SELECT id, name, description, icon, requirement_type, requirement_value
            FROM badges
            ORDER BY requirement_value ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(badges)
    }

    async fn user_stats(&self, user_id: i64) -> Result<UserStats> {
        let stats = sqlx::query_as::<_, UserStats>(
            r#"
            SELECT u.points,
                   COUNT(v.id) AS total_votes,
                   COUNT(v.id) FILTER (
                       WHERE m.status = 'resolved' AND m.resolution = v.choice
                   ) AS correct_votes
            FROM users u
            LEFT JOIN votes v ON v.user_id = u.id
            LEFT JOIN markets m ON m.id = v.market_id
            WHERE u.id = $1
            GROUP BY u.id
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(ApiError::UserNotFound(user_id))?;

        Ok(stats)
    }

    async fn recent_resolved_outcomes(&self, user_id: i64, limit: i64) -> Result<Vec<bool>> {
        let outcomes = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT v.choice = m.resolution
            FROM votes v
            JOIN markets m ON m.id = v.market_id
            WHERE v.user_id = $1 AND m.status = 'resolved'
            ORDER BY m.resolved_at DESC, m.id DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(outcomes)
    }

    async fn owned_badge_ids(&self, user_id: i64) -> Result<Vec<i64>> {
        let ids = sqlx::query_scalar::<_, i64>("SELECT badge_id FROM user_badges WHERE user_id = $1")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(ids)
    }

    async fn award(&self, user_id: i64, badge_id: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO user_badges (user_id, badge_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, badge_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(badge_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_with_earned(&self, user_id: i64) -> Result<Vec<BadgeWithEarned>> {
        let badges = sqlx::query_as::<_, BadgeWithEarned>(
            r#"
            SELECT b.id, b.name, b.description, b.icon, b.requirement_type,
                   b.requirement_value, ub.earned_at
            FROM badges b
            LEFT JOIN user_badges ub ON ub.badge_id = b.id AND ub.user_id = $1
            ORDER BY b.requirement_value ASC, b.id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(badges)
    }
}
