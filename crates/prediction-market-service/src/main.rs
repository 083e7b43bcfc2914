//! 预测市场投票服务
//!
//! 提供注册登录、市场管理、投票、排行榜和徽章 REST API，
//! 并在后台定时关闭到期市场。

use std::sync::Arc;

use axum::http::HeaderValue;
use prediction_market::{MIGRATOR, routes, state::AppState, worker::MarketCloseWorker};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use vote_shared::{
    config::{AppConfig, DEFAULT_JWT_SECRET},
    database::Database,
    observability,
};

const SERVICE_NAME: &str = "prediction-market-service";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 配置解析失败直接退出，不回退到默认配置
    let config = AppConfig::load(SERVICE_NAME)?;

    let obs_config = config.observability.clone().with_service_name(&config.service_name);
    let _guard = observability::init(&obs_config).await?;

    info!("Starting {} on {}", SERVICE_NAME, config.server_addr());

    // 生产环境必须通过 VOTE_AUTH__JWT_SECRET 注入密钥
    if config.auth.jwt_secret == DEFAULT_JWT_SECRET {
        if config.is_production() {
            anyhow::bail!("VOTE_AUTH__JWT_SECRET must be set in production environment");
        }
        warn!("Using default JWT secret - set VOTE_AUTH__JWT_SECRET for production");
    }

    let db = Database::connect(&config.database).await?;
    db.run_migrations(&MIGRATOR).await?;

    let state = AppState::new(db.pool().clone(), &config)?;
    if state.google_oauth.is_none() {
        info!("Google OAuth not configured, /api/auth/google disabled");
    }

    // 启动市场自动关闭 Worker
    let market_service = Arc::clone(&state.market_service);
    let close_interval = config.market.close_interval_secs;
    tokio::spawn(async move {
        let worker = MarketCloseWorker::new(market_service, close_interval);
        worker.run().await;
    });

    let cors = build_cors(&config);
    let app = routes::build_app(state, cors);

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("Listening on {}", config.server_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");

    Ok(())
}

/// 根据逗号分隔的来源列表构造 CORS 层，"*" 表示任意来源
fn build_cors(config: &AppConfig) -> CorsLayer {
    let allowed_origins = config.server.cors_origins.trim();

    if allowed_origins == "*" {
        if config.is_production() {
            warn!("cors_origins=\"*\" 在生产环境中不安全，请设置为具体域名");
        }
        info!("CORS allowed_origins: * (all origins)");
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    info!("CORS allowed_origins: {}", allowed_origins);
    let origins: Vec<_> = allowed_origins
        .split(',')
        .filter_map(|s| s.trim().parse::<HeaderValue>().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// 监听 Ctrl+C 与 SIGTERM，任一到达即触发优雅关闭
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("注册 Ctrl+C 处理器失败: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("注册 SIGTERM 处理器失败: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}
