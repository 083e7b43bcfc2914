//! 认证相关的 HTTP 处理器
//!
//! 注册、登录、当前用户和 Google OAuth 跳转

use axum::{
    Extension, Json,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::Redirect,
};
use tracing::warn;

use crate::auth::Claims;
use crate::dto::{ApiResponse, AuthResponse, LoginRequest, OAuthCallbackQuery, RegisterRequest};
use crate::error::{ApiError, Result};
use crate::models::User;
use crate::state::AppState;

/// 邮箱注册
///
/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>)> {
    let Json(req) = payload?;
    let response = state.auth_service.register(req).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(response, "注册成功")),
    ))
}

/// 邮箱登录
///
/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<AuthResponse>>> {
    let Json(req) = payload?;
    let response = state.auth_service.login(req).await?;
    Ok(Json(ApiResponse::success_with_message(response, "登录成功")))
}

/// 当前用户（从数据库读取最新积分）
///
/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<User>>> {
    let user = state.auth_service.current_user(claims.user_id()?).await?;
    Ok(Json(ApiResponse::success(user)))
}

/// 跳转到 Google 授权页
///
/// GET /api/auth/google
pub async fn google_start(State(state): State<AppState>) -> Result<Redirect> {
    let client = state
        .google_oauth
        .as_ref()
        .ok_or(ApiError::OAuthNotConfigured)?;
    Ok(Redirect::to(client.authorize_url()?.as_str()))
}

/// Google 回调：换取资料、登录或建号，然后携带 Token 跳回前端
///
/// GET /api/auth/google/callback
pub async fn google_callback(
    State(state): State<AppState>,
    Query(query): Query<OAuthCallbackQuery>,
) -> Result<Redirect> {
    let client = state
        .google_oauth
        .as_ref()
        .ok_or(ApiError::OAuthNotConfigured)?;

    let failure = Redirect::to(&format!("{}/login", state.client_url));

    let code = match (query.code, query.error) {
        (Some(code), None) => code,
        (_, error) => {
            warn!(error = ?error, "Google 授权被拒绝或缺少授权码");
            return Ok(failure);
        }
    };

    let outcome = match client.exchange_code(&code).await {
        Ok(profile) => state.auth_service.oauth_login(&profile).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(auth) => Ok(Redirect::to(&format!(
            "{}/auth/callback?token={}",
            state.client_url, auth.token
        ))),
        Err(e) => {
            warn!(error = %e, "Google 登录失败");
            Ok(failure)
        }
    }
}
