//! 路由配置模块
//!
//! 定义所有 REST API 端点并装配中间件栈

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use vote_shared::observability::middleware as obs_middleware;

use crate::{
    handlers,
    middleware::{auth_middleware, require_admin, security_headers},
    state::AppState,
};

/// 账号相关路由，除 /auth/me 外均为公开路由
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/me", get(handlers::auth::me))
        .route("/auth/google", get(handlers::auth::google_start))
        .route("/auth/google/callback", get(handlers::auth::google_callback))
}

/// 登录用户可访问的市场、投票和排行榜路由
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/markets", get(handlers::market::list_markets))
        .route("/markets/{id}", get(handlers::market::get_market))
        .route("/votes", post(handlers::vote::cast_vote))
        .route("/votes/market/{market_id}", get(handlers::vote::my_vote))
        .route("/votes/my-votes", get(handlers::vote::my_votes))
        .route("/users/leaderboard", get(handlers::user::leaderboard))
        .route("/users/badges", get(handlers::user::badges))
}

/// 管理员路由，非管理员返回 403
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/markets", post(handlers::market::create_market))
        .route("/markets/{id}/resolve", post(handlers::market::resolve_market))
        .route_layer(middleware::from_fn(require_admin))
}

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(auth_routes())
        .merge(user_routes())
        .merge(admin_routes())
        .route("/health", get(handlers::health::health_check))
}

/// 构建完整应用
///
/// 请求依次经过：request_id → http_tracing → CORS → 认证 → 安全头 → 路由
pub fn build_app(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .layer(cors)
        .layer(middleware::from_fn(obs_middleware::http_tracing))
        .layer(middleware::from_fn(obs_middleware::request_id))
        .with_state(state)
}
