// ==========================================
// 船舶遥测数据系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::api::{IngestApi, TelemetryApi};
use crate::config::ConfigManager;
use crate::db::{ensure_schema, open_sqlite_connection};
use crate::importer::{TelemetryImporterImpl, UniversalWorkbookReader, WorkbookReader};
use crate::repository::{
    ReadingRepository, StreamLatestRepository, TelemetryImportRepositoryImpl, UploadRepository,
    VesselRepository,
};

/// 应用状态
///
/// 包含所有API实例和共享资源，所有组件共享同一个数据库连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 导入API
    pub ingest_api: Arc<IngestApi>,

    /// 查询API
    pub telemetry_api: Arc<TelemetryApi>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 返回
    /// - Ok(AppState): 应用状态实例
    /// - Err(String): 初始化错误
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        ensure_schema(&conn).map_err(|e| format!("建表失败: {}", e))?;

        Self::from_connection(
            db_path,
            Arc::new(Mutex::new(conn)),
            Box::new(UniversalWorkbookReader),
        )
    }

    /// 基于已有连接装配（表结构由调用方负责）
    ///
    /// # 参数
    /// - reader: 工作簿读取器（测试中可替换为内存实现）
    pub fn from_connection(
        db_path: String,
        conn: Arc<Mutex<Connection>>,
        reader: Box<dyn WorkbookReader>,
    ) -> Result<Self, String> {
        // ==========================================
        // 初始化Repository层
        // ==========================================
        let vessel_repo = Arc::new(VesselRepository::new(conn.clone()));
        let upload_repo = Arc::new(UploadRepository::new(conn.clone()));
        let reading_repo = Arc::new(ReadingRepository::new(conn.clone()));
        let stream_latest_repo = Arc::new(StreamLatestRepository::new(conn.clone()));

        // 配置管理器
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        // ==========================================
        // 初始化导入器
        // ==========================================
        let importer = Arc::new(TelemetryImporterImpl::new(
            TelemetryImportRepositoryImpl::from_connection(conn),
            reader,
        ));

        // ==========================================
        // 初始化API层
        // ==========================================
        let ingest_api = Arc::new(IngestApi::new(importer, config_manager.clone()));
        let telemetry_api = Arc::new(TelemetryApi::new(
            vessel_repo,
            upload_repo,
            reading_repo,
            stream_latest_repo,
            config_manager.clone(),
        ));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            ingest_api,
            telemetry_api,
            config_manager,
        })
    }
}

// ==========================================
// 辅助函数
// ==========================================

/// 获取默认数据库路径
///
/// # 返回
/// - 环境变量 VESSEL_TELEMETRY_DB_PATH（非空时）
/// - 用户数据目录/vessel-telemetry/vessel_telemetry.db
/// - 无法获取数据目录时: ./vessel_telemetry.db
pub fn get_default_db_path() -> String {
    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var("VESSEL_TELEMETRY_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let Some(data_dir) = dirs::data_dir() else {
        return "./vessel_telemetry.db".to_string();
    };

    let dir = data_dir.join("vessel-telemetry");
    // 目录创建失败时 open 会报错，这里不拦截
    std::fs::create_dir_all(&dir).ok();
    dir.join("vessel_telemetry.db").to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
    }

    #[test]
    fn test_new_creates_schema() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_string_lossy().to_string();

        let state = AppState::new(path).unwrap();
        let health = state.telemetry_api.health().unwrap();
        assert_eq!(health.vessels, 0);
        assert_eq!(health.status, "healthy");
    }
}
