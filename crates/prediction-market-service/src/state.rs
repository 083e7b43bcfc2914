//! 应用状态定义
//!
//! 包含 Axum 路由共享的服务实例和基础设施

use std::sync::Arc;

use sqlx::PgPool;
use vote_shared::config::AppConfig;

use crate::auth::{GoogleOAuthClient, JwtConfig, JwtManager};
use crate::error::Result;
use crate::repository::{BadgeRepository, MarketRepository, UserRepository, VoteRepository};
use crate::service::{AuthService, BadgeEvaluator, MarketService, QueryService, VoteService};

pub type AppAuthService = AuthService<UserRepository>;
pub type AppMarketService = MarketService<MarketRepository, BadgeRepository>;
pub type AppVoteService = VoteService<VoteRepository, BadgeRepository>;
pub type AppQueryService = QueryService<UserRepository, BadgeRepository>;

/// Axum 应用共享状态
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub jwt_manager: Arc<JwtManager>,
    pub auth_service: Arc<AppAuthService>,
    pub market_service: Arc<AppMarketService>,
    pub vote_service: Arc<AppVoteService>,
    pub query_service: Arc<AppQueryService>,
    /// 未配置 Google 凭据时为 None
    pub google_oauth: Option<Arc<GoogleOAuthClient>>,
    /// OAuth 登录完成后重定向的前端地址
    pub client_url: String,
}

impl AppState {
    /// 基于连接池和配置装配所有服务
    pub fn new(pool: PgPool, config: &AppConfig) -> Result<Self> {
        let jwt_manager = Arc::new(JwtManager::new(JwtConfig::from(&config.auth)));

        let user_repo = Arc::new(UserRepository::new(pool.clone()));
        let market_repo = Arc::new(MarketRepository::new(pool.clone()));
        let vote_repo = Arc::new(VoteRepository::new(pool.clone()));
        let badge_repo = Arc::new(BadgeRepository::new(pool.clone()));

        let evaluator = Arc::new(BadgeEvaluator::new(badge_repo.clone()));

        let google_oauth = GoogleOAuthClient::from_config(&config.auth)?.map(Arc::new);

        Ok(Self {
            auth_service: Arc::new(AuthService::new(user_repo.clone(), jwt_manager.clone())),
            market_service: Arc::new(MarketService::new(market_repo, evaluator.clone())),
            vote_service: Arc::new(VoteService::new(vote_repo, evaluator)),
            query_service: Arc::new(QueryService::new(user_repo, badge_repo)),
            jwt_manager,
            google_oauth,
            client_url: config.auth.client_url.trim_end_matches('/').to_string(),
            pool,
        })
    }
}
