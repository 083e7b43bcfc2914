//! 服务层
//!
//! 实现业务规则，协调仓储层和徽章评估器。
//!
//! - `auth_service`: 注册、登录、Google 登录
//! - `market_service`: 市场创建、关闭、结算
//! - `vote_service`: 投票和投票历史
//! - `badge_evaluator`: 徽章评估与发放
//! - `query_service`: 排行榜和徽章墙

pub mod auth_service;
pub mod badge_evaluator;
pub mod market_service;
pub mod query_service;
pub mod vote_service;

pub use auth_service::AuthService;
pub use badge_evaluator::BadgeEvaluator;
pub use market_service::{MarketService, POINTS_PER_CORRECT_VOTE};
pub use query_service::{MAX_LEADERBOARD_LIMIT, QueryService};
pub use vote_service::VoteService;
