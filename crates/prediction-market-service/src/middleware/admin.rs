//! 管理员权限中间件
//!
//! 必须挂在 `auth_middleware` 之后，依赖其注入的 Claims

use axum::{
    body::Body,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::auth::Claims;
use crate::error::ApiError;

/// 非管理员返回 403
///
/// ```ignore
/// Router::new()
///     .route("/api/markets", post(create_market))
///     .route_layer(axum::middleware::from_fn(require_admin))
/// ```
pub async fn require_admin(request: Request<Body>, next: Next) -> Response {
    let Some(claims) = request.extensions().get::<Claims>() else {
        return ApiError::Unauthorized("未认证".to_string()).into_response();
    };

    if claims.is_admin() {
        return next.run(request).await;
    }

    ApiError::Forbidden("需要管理员权限".to_string()).into_response()
}
