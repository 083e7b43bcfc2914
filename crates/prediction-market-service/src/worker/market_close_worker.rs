//! 市场自动关闭 Worker
//!
//! 以固定间隔执行一次批量条件更新，把截止时间已到的 open 市场置为 closed。
//! 单条 UPDATE 天然幂等，多实例并发运行也不会重复关闭。

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};
use vote_shared::observability::metrics;

use crate::error::Result;
use crate::repository::{BadgeRepositoryTrait, MarketRepositoryTrait};
use crate::service::MarketService;

const WORKER_NAME: &str = "market_close_worker";

pub struct MarketCloseWorker<MR, BR>
where
    MR: MarketRepositoryTrait,
    BR: BadgeRepositoryTrait,
{
    market_service: Arc<MarketService<MR, BR>>,
    poll_interval: Duration,
}

impl<MR, BR> MarketCloseWorker<MR, BR>
where
    MR: MarketRepositoryTrait,
    BR: BadgeRepositoryTrait,
{
    pub fn new(market_service: Arc<MarketService<MR, BR>>, poll_interval_secs: u64) -> Self {
        Self {
            market_service,
            poll_interval: Duration::from_secs(poll_interval_secs.max(1)),
        }
    }

    /// 主循环：启动时立即执行一次，之后按间隔执行，直到进程退出
    pub async fn run(&self) {
        info!(poll_interval = ?self.poll_interval, "MarketCloseWorker 已启动");

        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            if let Err(e) = self.run_once().await {
                error!(error = %e, "关闭到期市场出错");
            }

            metrics::set_worker_last_run(WORKER_NAME);
        }
    }

    /// 执行一轮关闭，返回关闭的市场数
    pub async fn run_once(&self) -> Result<u64> {
        self.market_service.close_expired(Utc::now()).await
    }
}
