//! Prometheus 指标模块
//!
//! 基于 metrics crate 和 metrics-exporter-prometheus 实现指标收集与导出。
//! 指标通过独立的 HTTP 端口暴露，供 Prometheus 抓取。

use anyhow::Result;
use axum::{Router, routing::get};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info};

use super::ObservabilityConfig;

/// Metrics 资源守卫
pub struct MetricsHandle {
    _server_handle: tokio::task::JoinHandle<()>,
}

/// 初始化 Prometheus 指标导出
///
/// 启动一个独立的 HTTP 服务器在指定端口暴露 `/metrics` 端点。
pub async fn init(config: &ObservabilityConfig) -> Result<MetricsHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    register_common_metrics(&config.service_name);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.metrics_port));
    let server_handle = start_metrics_server(addr, handle).await?;

    Ok(MetricsHandle {
        _server_handle: server_handle,
    })
}

/// 注册业务指标描述，出现在 /metrics 的 HELP 注释中
fn register_common_metrics(service_name: &str) {
    metrics::describe_counter!("http_requests_total", "Total number of HTTP requests");
    metrics::describe_histogram!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds"
    );
    metrics::describe_counter!("votes_cast_total", "Total number of votes cast");
    metrics::describe_counter!("markets_closed_total", "Markets closed by the close worker");
    metrics::describe_counter!("markets_resolved_total", "Markets resolved by admins");
    metrics::describe_counter!("points_awarded_total", "Points credited to correct voters");
    metrics::describe_counter!("badges_awarded_total", "Badges awarded to users");
    metrics::describe_counter!(
        "badge_evaluation_failures_total",
        "Badge evaluations that failed and were skipped"
    );
    metrics::describe_gauge!(
        "worker_last_run_timestamp",
        "Unix timestamp of the last worker iteration"
    );

    metrics::counter!("service_starts_total", "service" => service_name.to_string()).increment(1);
}

/// 启动指标 HTTP 服务器
async fn start_metrics_server(
    addr: SocketAddr,
    handle: PrometheusHandle,
) -> Result<tokio::task::JoinHandle<()>> {
    let app = Router::new()
        .route("/metrics", get(move || std::future::ready(handle.render())))
        .route("/health", get(|| async { "OK" }));

    let listener = TcpListener::bind(addr).await?;
    info!("Metrics server listening on {}", addr);

    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Metrics server error: {}", e);
        }
    });

    Ok(server_handle)
}

// ============================================================================
// 指标记录函数
// ============================================================================

/// 记录 HTTP 请求
#[inline]
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let status_str = status.to_string();
    metrics::counter!(
        "http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status_str.clone()
    )
    .increment(1);

    metrics::histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status_str
    )
    .record(duration_secs);
}

/// 记录投票
#[inline]
pub fn record_vote_cast(choice: &str) {
    metrics::counter!("votes_cast_total", "choice" => choice.to_string()).increment(1);
}

/// 记录自动关闭的市场数量
#[inline]
pub fn record_markets_closed(count: u64) {
    metrics::counter!("markets_closed_total").increment(count);
}

/// 记录市场结算及发放的积分
#[inline]
pub fn record_market_resolution(resolution: &str, points_awarded: u64) {
    metrics::counter!("markets_resolved_total", "resolution" => resolution.to_string())
        .increment(1);
    metrics::counter!("points_awarded_total").increment(points_awarded);
}

/// 记录徽章授予
#[inline]
pub fn record_badge_awarded(badge_name: &str) {
    metrics::counter!("badges_awarded_total", "badge" => badge_name.to_string()).increment(1);
}

/// 记录徽章评估失败
#[inline]
pub fn record_badge_evaluation_failure() {
    metrics::counter!("badge_evaluation_failures_total").increment(1);
}

/// 记录 Worker 最近一次运行时间
#[inline]
pub fn set_worker_last_run(worker: &str) {
    metrics::gauge!("worker_last_run_timestamp", "worker" => worker.to_string())
        .set(chrono::Utc::now().timestamp() as f64);
}
