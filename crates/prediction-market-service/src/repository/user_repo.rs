//! 用户仓储

use async_trait::async_trait;
use sqlx::PgPool;
use vote_shared::error::is_unique_violation;

use super::traits::UserRepositoryTrait;
use crate::error::{ApiError, Result};
use crate::models::{LeaderboardEntry, NewUser, User};

const USER_COLUMNS: &str =
    "id, email, password_hash, name, role, oauth_provider, oauth_id, points, created_at";

pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_oauth(&self, provider: &str, oauth_id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE oauth_provider = $1 AND oauth_id = $2"
        ))
        .bind(provider)
        .bind(oauth_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn create(&self, user: &NewUser) -> Result<User> {
        let created = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, password_hash, name, role, oauth_provider, oauth_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(user.role)
        .bind(&user.oauth_provider)
        .bind(&user.oauth_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::EmailAlreadyRegistered
            } else {
                ApiError::Database(e)
            }
        })?;

        Ok(created)
    }

    async fn leaderboard(&self, limit: i64) -> Result<Vec<LeaderboardEntry>> {
        // 子查询分别聚合，避免 votes 与 user_badges 连接后行数相乘
        let rows = sqlx::query_as::<_, LeaderboardEntry>(
            r#"
            SELECT u.id, u.name, u.points,
                   COALESCE(v.total_votes, 0) AS total_votes,
                   COALESCE(v.correct_votes, 0) AS correct_votes,
                   COALESCE(b.badge_count, 0) AS badge_count
            FROM users u
            LEFT JOIN (
                SELECT v.user_id,
                       COUNT(*) AS total_votes,
                       COUNT(*) FILTER (
                           WHERE m.status = 'resolved' AND m.resolution = v.choice
                       ) AS correct_votes
                FROM votes v
                JOIN markets m ON m.id = v.market_id
                GROUP BY v.user_id
            ) v ON v.user_id = u.id
            LEFT JOIN (
                SELECT user_id, COUNT(*) AS badge_count
                FROM user_badges
                GROUP BY user_id
            ) b ON b.user_id = u.id
            ORDER BY u.points DESC, correct_votes DESC, u.id ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
