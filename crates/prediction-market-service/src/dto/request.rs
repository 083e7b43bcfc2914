//! 请求 DTO 定义

use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

use crate::models::{MarketStatus, VoteChoice};

/// 注册请求
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "邮箱格式不正确"))]
    pub email: String,
    #[validate(length(min = 6, message = "密码至少 6 个字符"))]
    pub password: String,
    #[validate(length(min = 1, max = 100, message = "名称长度必须在1-100个字符之间"))]
    pub name: String,
}

/// 登录请求
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "邮箱格式不正确"))]
    pub email: String,
    #[validate(length(min = 1, message = "密码不能为空"))]
    pub password: String,
}

fn default_show_totals() -> bool {
    true
}

/// 创建市场请求
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateMarketRequest {
    #[validate(length(min = 1, max = 200, message = "标题长度必须在1-200个字符之间"))]
    pub title: String,
    #[validate(length(min = 1, message = "描述不能为空"))]
    pub description: String,
    pub rules: Option<String>,
    pub close_time: DateTime<Utc>,
    #[serde(default = "default_show_totals")]
    pub show_totals: bool,
}

impl CreateMarketRequest {
    /// 去除首尾空白，空的 rules 视为未提供
    pub fn normalized(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.description = self.description.trim().to_string();
        self.rules = self
            .rules
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        self
    }
}

/// 结算市场请求
#[derive(Debug, Clone, Deserialize)]
pub struct ResolveMarketRequest {
    pub resolution: VoteChoice,
}

/// 投票请求
#[derive(Debug, Clone, Deserialize)]
pub struct CastVoteRequest {
    pub market_id: i64,
    #[serde(alias = "vote")]
    pub choice: VoteChoice,
}

/// 市场列表过滤
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MarketListQuery {
    pub status: Option<MarketStatus>,
}

/// 排行榜查询参数
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<i64>,
}

/// Google 回调参数
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>,
}
