//! 认证模块
//!
//! JWT + Argon2 认证体系：
//! - [`JwtService`] - 令牌生成与验证
//! - [`CurrentUser`] - 已认证用户上下文 (中间件注入)
//! - [`require_auth`] - 全局认证中间件

pub mod extractor;
pub mod jwt;
pub mod middleware;

pub use extractor::CurrentUser;
pub use jwt::{Claims, JwtConfig, JwtError, JwtService};
pub use middleware::require_auth;
