use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::services::{DetectionBus, Detector, GeocodeService, IngestService, YoloClient};

/// 服务器状态 - 持有所有服务的单例引用
///
/// ServerState 是投诉节点的核心数据结构，持有所有服务的共享引用。
/// 使用 Arc 实现浅拷贝，克隆成本极低。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | Surreal<Db> | 嵌入式数据库 |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
/// | geocode | GeocodeService | 反向地理编码 |
/// | detector | Arc<dyn Detector> | 外部检测服务客户端 |
/// | detection_bus | DetectionBus | 实时检测事件总线 |
/// | ingest | IngestService | 投诉入库工作流 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 嵌入式数据库 (SurrealDB)
    pub db: Surreal<Db>,
    /// JWT 认证服务
    pub jwt_service: Arc<JwtService>,
    /// 反向地理编码服务
    pub geocode: GeocodeService,
    /// 外部检测服务
    pub detector: Arc<dyn Detector>,
    /// 实时检测事件总线
    pub detection_bus: DetectionBus,
    /// 投诉入库工作流
    pub ingest: IngestService,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构 (确保目录存在)
    /// 2. 数据库 (work_dir/database/civic.db)
    /// 3. 各服务 (JWT, Geocode, Detector, DetectionBus, Ingest)
    ///
    /// # Panics
    ///
    /// 工作目录或数据库初始化失败时 panic
    pub async fn initialize(config: &Config) -> Self {
        config
            .ensure_work_dir_structure()
            .expect("Failed to create work directory structure");

        let db_path = config.database_dir().join("civic.db");
        let db_service = DbService::new(&db_path.to_string_lossy())
            .await
            .expect("Failed to initialize database");
        let db = db_service.db;

        let jwt_service = Arc::new(JwtService::new(config.jwt.clone()));
        let geocode = GeocodeService::new(config.geocode_url.clone(), config.request_timeout_ms);
        let detector: Arc<dyn Detector> = Arc::new(YoloClient::new(
            config.detector_url.clone(),
            config.request_timeout_ms,
        ));
        let detection_bus = DetectionBus::new();
        let ingest = IngestService::new(
            db.clone(),
            geocode.clone(),
            detector.clone(),
            detection_bus.clone(),
            config.media_dir(),
            config.dedup,
        );

        Self {
            config: config.clone(),
            db,
            jwt_service,
            geocode,
            detector,
            detection_bus,
            ingest,
        }
    }

    /// 获取数据库实例
    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }

    /// 获取 JWT 服务
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }
}
