//! Google OAuth 授权码流程
//!
//! 1. 将浏览器重定向到 Google 授权页
//! 2. 回调时用授权码换取 access token
//! 3. 用 access token 读取用户资料

use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;
use tracing::instrument;
use vote_shared::config::AuthConfig;

use crate::error::ApiError;

const AUTHORIZE_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const USERINFO_ENDPOINT: &str = "https://openidconnect.googleapis.com/v1/userinfo";
const SCOPES: &str = "openid profile email";

pub const GOOGLE_PROVIDER: &str = "google";

/// Google 返回的用户资料
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleProfile {
    /// Google 账号唯一 ID
    pub sub: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

pub struct GoogleOAuthClient {
    client_id: String,
    client_secret: String,
    redirect_url: String,
    http: reqwest::Client,
}

impl GoogleOAuthClient {
    /// 凭据不完整时返回 None，Google 登录入口随之关闭
    pub fn from_config(config: &AuthConfig) -> Result<Option<Self>, ApiError> {
        if !config.google_enabled() {
            return Ok(None);
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ApiError::Internal(format!("创建 HTTP 客户端失败: {e}")))?;

        Ok(Some(Self {
            client_id: config.google_client_id.clone().unwrap_or_default(),
            client_secret: config.google_client_secret.clone().unwrap_or_default(),
            redirect_url: config.google_redirect_url.clone().unwrap_or_default(),
            http,
        }))
    }

    /// Google 授权页地址
    pub fn authorize_url(&self) -> Result<Url, ApiError> {
        Url::parse_with_params(
            AUTHORIZE_ENDPOINT,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_url.as_str()),
                ("response_type", "code"),
                ("scope", SCOPES),
            ],
        )
        .map_err(|e| ApiError::Internal(format!("构造授权地址失败: {e}")))
    }

    /// 用授权码换取用户资料
    #[instrument(skip_all)]
    pub async fn exchange_code(&self, code: &str) -> Result<GoogleProfile, ApiError> {
        let token: TokenResponse = self
            .http
            .post(TOKEN_ENDPOINT)
            .form(&[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_url.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ApiError::ExternalService(format!("换取 Google token 失败: {e}")))?
            .json()
            .await
            .map_err(|e| ApiError::ExternalService(format!("解析 Google token 失败: {e}")))?;

        let profile: GoogleProfile = self
            .http
            .get(USERINFO_ENDPOINT)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ApiError::ExternalService(format!("获取 Google 用户资料失败: {e}")))?
            .json()
            .await
            .map_err(|e| ApiError::ExternalService(format!("解析 Google 用户资料失败: {e}")))?;

        Ok(profile)
    }
}

impl GoogleProfile {
    /// 没有公开邮箱时使用占位地址
    pub fn email_or_fallback(&self) -> String {
        match self.email.as_deref().map(str::trim) {
            Some(email) if !email.is_empty() => email.to_lowercase(),
            _ => format!("google_{}@oauth.local", self.sub),
        }
    }

    pub fn name_or_fallback(&self) -> String {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => "Google User".to_string(),
        }
    }
}
