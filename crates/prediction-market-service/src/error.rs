//! 预测市场服务错误类型定义
//!
//! 业务规则违反统一返回 400，资源缺失 404，认证失败 401，权限不足 403，
//! 存储层故障 500 且不向客户端暴露细节。

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// 预测市场服务错误类型
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    // 认证错误
    #[error("未授权: {0}")]
    Unauthorized(String),
    #[error("禁止访问: {0}")]
    Forbidden(String),
    #[error("邮箱或密码错误")]
    InvalidCredentials,
    #[error("该邮箱已注册")]
    EmailAlreadyRegistered,

    // 验证错误
    #[error("参数验证失败: {0}")]
    Validation(String),

    // 资源不存在
    #[error("市场不存在: {0}")]
    MarketNotFound(i64),
    #[error("用户不存在: {0}")]
    UserNotFound(i64),

    // 业务规则
    #[error("截止时间必须晚于当前时间")]
    CloseTimeInPast,
    #[error("市场 {0} 已停止投票")]
    MarketNotOpen(i64),
    #[error("已对市场 {0} 投过票")]
    AlreadyVoted(i64),
    #[error("市场 {0} 尚未截止，无法结算")]
    MarketNotClosed(i64),
    #[error("市场 {0} 已结算")]
    MarketAlreadyResolved(i64),

    // 外部依赖
    #[error("未配置 Google 登录")]
    OAuthNotConfigured,
    #[error("外部服务调用失败: {0}")]
    ExternalService(String),

    // 系统错误
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),
    #[error("内部错误: {0}")]
    Internal(String),
}

impl ApiError {
    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,

            Self::Validation(_)
            | Self::EmailAlreadyRegistered
            | Self::CloseTimeInPast
            | Self::MarketNotOpen(_)
            | Self::AlreadyVoted(_)
            | Self::MarketNotClosed(_)
            | Self::MarketAlreadyResolved(_) => StatusCode::BAD_REQUEST,

            Self::MarketNotFound(_)
            | Self::UserNotFound(_)
            | Self::OAuthNotConfigured => StatusCode::NOT_FOUND,

            Self::ExternalService(_) => StatusCode::BAD_GATEWAY,

            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 返回错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::EmailAlreadyRegistered => "EMAIL_ALREADY_REGISTERED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::MarketNotFound(_) => "MARKET_NOT_FOUND",
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::CloseTimeInPast => "CLOSE_TIME_IN_PAST",
            Self::MarketNotOpen(_) => "MARKET_NOT_OPEN",
            Self::AlreadyVoted(_) => "ALREADY_VOTED",
            Self::MarketNotClosed(_) => "MARKET_NOT_CLOSED",
            Self::MarketAlreadyResolved(_) => "MARKET_ALREADY_RESOLVED",
            Self::OAuthNotConfigured => "OAUTH_NOT_CONFIGURED",
            Self::ExternalService(_) => "EXTERNAL_SERVICE_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 系统级错误只返回通用提示，详细信息仅记录日志
        let message = match &self {
            Self::Database(e) => {
                tracing::error!(error = %e, "数据库操作失败");
                "服务内部错误，请稍后重试".to_string()
            }
            Self::Internal(e) => {
                tracing::error!(error = %e, "内部错误");
                "服务内部错误，请稍后重试".to_string()
            }
            Self::ExternalService(e) => {
                tracing::warn!(error = %e, "外部服务调用失败");
                "外部服务暂不可用，请稍后重试".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "success": false,
            "code": self.error_code(),
            "message": message,
            "data": serde_json::Value::Null
        });

        (status, axum::Json(body)).into_response()
    }
}

/// 从 validator 错误转换
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

/// 请求体无法解析为 JSON 或字段类型不符
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

/// 路径参数类型不符，如 /markets/abc
impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

/// 查询参数无法解析
impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

/// 服务层 Result 类型别名
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn all_error_variants() -> Vec<(ApiError, StatusCode, &'static str)> {
        vec![
            (ApiError::Unauthorized("token expired".into()), StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            (ApiError::Forbidden("admin only".into()), StatusCode::FORBIDDEN, "FORBIDDEN"),
            (ApiError::InvalidCredentials, StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
            (ApiError::EmailAlreadyRegistered, StatusCode::BAD_REQUEST, "EMAIL_ALREADY_REGISTERED"),
            (ApiError::Validation("title is required".into()), StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            (ApiError::MarketNotFound(1), StatusCode::NOT_FOUND, "MARKET_NOT_FOUND"),
            (ApiError::UserNotFound(2), StatusCode::NOT_FOUND, "USER_NOT_FOUND"),
            (ApiError::CloseTimeInPast, StatusCode::BAD_REQUEST, "CLOSE_TIME_IN_PAST"),
            (ApiError::MarketNotOpen(3), StatusCode::BAD_REQUEST, "MARKET_NOT_OPEN"),
            (ApiError::AlreadyVoted(4), StatusCode::BAD_REQUEST, "ALREADY_VOTED"),
            (ApiError::MarketNotClosed(5), StatusCode::BAD_REQUEST, "MARKET_NOT_CLOSED"),
            (ApiError::MarketAlreadyResolved(6), StatusCode::BAD_REQUEST, "MARKET_ALREADY_RESOLVED"),
            (ApiError::OAuthNotConfigured, StatusCode::NOT_FOUND, "OAUTH_NOT_CONFIGURED"),
            (ApiError::ExternalService("timeout".into()), StatusCode::BAD_GATEWAY, "EXTERNAL_SERVICE_ERROR"),
            (ApiError::Internal("unexpected state".into()), StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        ]
    }

    #[test]
    fn test_all_variants_status_code() {
        for (error, expected_status, label) in all_error_variants() {
            assert_eq!(
                error.status_code(),
                expected_status,
                "状态码不匹配: variant={label}"
            );
        }
    }

    #[test]
    fn test_all_variants_error_code() {
        for (error, _status, expected_code) in all_error_variants() {
            assert_eq!(error.error_code(), expected_code);
        }
    }

    #[test]
    fn test_display_contains_market_id() {
        assert!(ApiError::MarketNotFound(42).to_string().contains("42"));
        assert!(ApiError::MarketNotOpen(7).to_string().contains("7"));
        assert!(ApiError::AlreadyVoted(9).to_string().contains("9"));
        assert!(ApiError::MarketAlreadyResolved(11).to_string().contains("11"));
    }

    #[tokio::test]
    async fn test_into_response_body_structure() {
        for (error, expected_status, expected_code) in all_error_variants() {
            let label = format!("{:?}", error);
            let response = error.into_response();
            assert_eq!(response.status(), expected_status, "{label}");

            let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .expect("读取响应体失败");
            let body: serde_json::Value =
                serde_json::from_slice(&body_bytes).expect("响应体不是合法 JSON");

            assert_eq!(body["success"], json!(false), "{label}");
            assert_eq!(body["code"], json!(expected_code), "{label}");
            assert!(!body["message"].as_str().unwrap_or("").is_empty(), "{label}");
            assert!(body["data"].is_null(), "{label}");
        }
    }

    #[tokio::test]
    async fn test_system_errors_hide_internal_details() {
        let cases = vec![
            (ApiError::Database(sqlx::Error::PoolTimedOut), "pool timed out"),
            (ApiError::Internal("stack overflow at module X".into()), "stack overflow"),
        ];

        for (error, leaked_detail) in cases {
            let response = error.into_response();
            let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
            let message = body["message"].as_str().unwrap();

            assert!(!message.to_lowercase().contains(leaked_detail));
            assert!(message.contains("服务内部错误"));
        }
    }

    #[test]
    fn test_from_validation_errors() {
        use validator::{ValidationError, ValidationErrors};

        let mut errors = ValidationErrors::new();
        errors.add("email", ValidationError::new("email"));

        let err: ApiError = errors.into();
        match &err {
            ApiError::Validation(msg) => assert!(msg.contains("email")),
            other => panic!("期望 Validation 变体，实际: {:?}", other),
        }
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_from_sqlx_error() {
        let err = ApiError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, ApiError::Database(_)));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_code(), "DATABASE_ERROR");
    }
}
