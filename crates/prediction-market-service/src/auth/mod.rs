//! 认证模块
//!
//! JWT Token、密码哈希和 Google OAuth

mod jwt;
mod oauth;
mod password;

pub use jwt::{Claims, JwtConfig, JwtManager};
pub use oauth::{GOOGLE_PROVIDER, GoogleOAuthClient, GoogleProfile};
pub use password::{hash_password, verify_password};
