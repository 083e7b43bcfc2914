//! 用户实体

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::UserRole;

/// 用户
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    /// OAuth 账号为空；永远不出现在响应中
    #[serde(skip_serializing, default)]
    #[sqlx(default)]
    pub password_hash: Option<String>,
    pub name: String,
    pub role: UserRole,
    #[sqlx(default)]
    pub oauth_provider: Option<String>,
    #[serde(skip_serializing, default)]
    #[sqlx(default)]
    pub oauth_id: Option<String>,
    pub points: i64,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// 新建用户参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub password_hash: Option<String>,
    pub name: String,
    pub role: UserRole,
    pub oauth_provider: Option<String>,
    pub oauth_id: Option<String>,
}

/// 排行榜条目
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LeaderboardEntry {
    pub id: i64,
    pub name: String,
    pub points: i64,
    pub total_votes: i64,
    pub correct_votes: i64,
    pub badge_count: i64,
}
