use std::path::PathBuf;

use crate::auth::JwtConfig;
use crate::services::dedup::DedupConfig;

/// 服务器配置 - 市政投诉节点的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | /var/lib/civic/grid | 工作目录 |
/// | HTTP_PORT | 8000 | HTTP 服务端口 |
/// | DETECTOR_URL | http://localhost:8600 | 检测服务地址 |
/// | GEOCODE_URL | https://nominatim.openstreetmap.org | 反向地理编码地址 |
/// | ENVIRONMENT | development | 运行环境 |
/// | REQUEST_TIMEOUT_MS | 30000 | 上游请求超时(毫秒) |
/// | MAX_UPLOAD_BYTES | 52428800 | 单文件上传上限 |
/// | DEDUP_DISTANCE_M | 50 | 去重距离阈值(米) |
/// | DEDUP_HASH_THRESHOLD | 5 | 去重感知哈希阈值 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/civic HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、媒体文件、日志
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 检测服务 (YOLO) URL
    pub detector_url: String,
    /// 反向地理编码服务 URL
    pub geocode_url: String,
    /// 上游请求超时 (毫秒)
    pub request_timeout_ms: u64,
    /// 单文件上传上限 (字节)
    pub max_upload_bytes: usize,
    /// 去重阈值
    pub dedup: DedupConfig,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/civic/grid".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            jwt: JwtConfig::default(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            detector_url: std::env::var("DETECTOR_URL")
                .unwrap_or_else(|_| "http://localhost:8600".into()),
            geocode_url: std::env::var("GEOCODE_URL")
                .unwrap_or_else(|_| "https://nominatim.openstreetmap.org".into()),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(30000),
            max_upload_bytes: std::env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(50 * 1024 * 1024),
            dedup: DedupConfig {
                distance_threshold_m: std::env::var("DEDUP_DISTANCE_M")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(50.0),
                hash_threshold: std::env::var("DEDUP_HASH_THRESHOLD")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(5),
            },
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    pub fn media_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("media")
    }

    pub fn logs_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// 确保工作目录结构存在
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(self.media_dir())?;
        std::fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
