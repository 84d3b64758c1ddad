//! Civic Grid Server - 市政投诉处理节点
//!
//! # 架构概述
//!
//! 本模块是投诉服务的主入口，提供以下核心功能：
//!
//! - **HTTP API** (`api`): 工单、账号、管理端、督察端、实时流接口
//! - **数据库** (`db`): 嵌入式 SurrealDB 存储
//! - **认证** (`auth`): JWT + Argon2 认证体系
//! - **分诊管线** (`triage`): 扁平化、归一化、部门分类、SLA 评估、统计
//! - **服务** (`services`): 地理编码、外部检测、去重、事件总线、入库工作流
//!
//! # 模块结构
//!
//! ```text
//! civic-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # JWT 认证
//! ├── api/           # HTTP 路由和处理器
//! ├── triage/        # 工单分诊管线 (纯函数)
//! ├── services/      # 地理编码、检测、去重、入库
//! ├── db/            # 数据库层
//! └── utils/         # 工具函数
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod services;
pub mod triage;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use triage::{FlattenedRow, Scope, SlaStatus, SlaTable, TicketStats};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{cleanup_old_logs, init_logger, init_logger_with_file};

pub fn print_banner() {
    println!(
        r#"
   ______ _         _         ______       _     __
  / ____/(_)_   __ (_)____   / ____/_____ (_)___/ /
 / /    / /| | / // // ___/  / / __ / ___// // __  /
/ /___ / / | |/ // // /__   / /_/ // /   / // /_/ /
\____//_/  |___//_/ \___/   \____//_/   /_/ \__,_/
    "#
    );
}
