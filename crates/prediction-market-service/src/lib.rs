//! 预测市场投票服务
//!
//! 用户对管理员创建的 YES/NO 问题投票，管理员在截止后公布结果，
//! 押中的用户获得积分和徽章。
//!
//! ## 模块结构
//!
//! - `auth`: JWT、密码哈希、Google OAuth
//! - `models`: 领域实体
//! - `repository`: PostgreSQL 数据访问
//! - `service`: 业务规则
//! - `handlers` / `routes`: HTTP API
//! - `worker`: 自动关闭到期市场

use sqlx::migrate::Migrator;

pub mod auth;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod service;
pub mod state;
pub mod worker;

pub use error::{ApiError, Result};
pub use state::AppState;

/// 内嵌的数据库迁移
pub static MIGRATOR: Migrator = sqlx::migrate!();
