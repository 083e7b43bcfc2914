//! 后台 Worker

pub mod market_close_worker;

pub use market_close_worker::MarketCloseWorker;
