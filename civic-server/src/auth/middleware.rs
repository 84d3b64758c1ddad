//! 认证中间件
//!
//! 全局注册：验证 Bearer 令牌并注入 [`CurrentUser`]。
//! 公共路由 (登录/注册/健康检查/实时流) 直接放行。

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use super::extractor::CurrentUser;
use super::jwt::JwtError;
use crate::core::ServerState;
use crate::utils::AppError;

/// 无需令牌即可访问的路径前缀
const PUBLIC_PREFIXES: &[&str] = &[
    "/health",
    "/api/auth/login",
    "/api/auth/signup",
    "/api/live/",
];

fn is_public(path: &str) -> bool {
    PUBLIC_PREFIXES
        .iter()
        .any(|prefix| path == prefix.trim_end_matches('/') || path.starts_with(prefix))
}

/// 认证中间件入口
pub async fn require_auth(
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if is_public(request.uri().path()) {
        return Ok(next.run(request).await);
    }

    let token = request
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(AppError::Unauthorized)?;

    let claims = state
        .jwt_service
        .verify_token(token)
        .map_err(|e| match e {
            JwtError::ExpiredToken => AppError::TokenExpired,
            _ => AppError::InvalidToken,
        })?;

    let user = CurrentUser::from_claims(&claims)?;
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_paths() {
        assert!(is_public("/health"));
        assert!(is_public("/health/detailed"));
        assert!(is_public("/api/auth/login"));
        assert!(is_public("/api/live/events"));
        assert!(!is_public("/api/complaints/tickets"));
        assert!(!is_public("/api/admin/inspector-actions"));
    }
}
