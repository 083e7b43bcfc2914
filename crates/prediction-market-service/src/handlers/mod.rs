//! HTTP 处理器
//!
//! 处理器只负责提取参数和包装响应，业务规则在服务层

pub mod auth;
pub mod health;
pub mod market;
pub mod user;
pub mod vote;
