//! 枚举类型定义
//!
//! 所有枚举都支持数据库（sqlx）和 JSON（serde）序列化

use serde::{Deserialize, Serialize};

/// 用户角色
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

impl UserRole {
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// 市场状态
///
/// 只允许 open → closed → resolved 单向流转
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
pub enum MarketStatus {
    /// 接受投票
    #[default]
    Open,
    /// 已到截止时间，等待管理员结算
    Closed,
    /// 已结算，结果已公布
    Resolved,
}

impl MarketStatus {
    /// 是否允许流转到目标状态
    pub fn can_transition_to(&self, next: MarketStatus) -> bool {
        matches!(
            (self, next),
            (Self::Open, Self::Closed) | (Self::Closed, Self::Resolved)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Resolved => "resolved",
        }
    }
}

impl std::fmt::Display for MarketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 投票选项，同时也是市场的结算结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "varchar", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoteChoice {
    Yes,
    No,
}

impl VoteChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "YES",
            Self::No => "NO",
        }
    }
}

impl std::fmt::Display for VoteChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 徽章获取条件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
pub enum RequirementType {
    /// 累计投票数
    Votes,
    /// 累计预测正确数
    Correct,
    /// 最近连续预测正确数（按市场结算时间倒序）
    Streak,
    /// 累计积分
    Points,
}

/// 单笔投票的结果，由市场结算结果推导
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteResult {
    Correct,
    Incorrect,
    Pending,
}

impl VoteResult {
    pub fn derive(choice: VoteChoice, resolution: Option<VoteChoice>) -> Self {
        match resolution {
            Some(r) if r == choice => Self::Correct,
            Some(_) => Self::Incorrect,
            None => Self::Pending,
        }
    }
}
