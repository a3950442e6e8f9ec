// ==========================================
// 船舶遥测数据系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 船舶遥测工作簿导入 + 时间序列查询
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 工作簿解析与落库
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 组件装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{IngestStatus, Stream};

// 领域实体
pub use domain::{IngestResponse, StoredReading, Upload, Vessel, VesselOverview};

// API
pub use api::{ApiError, IngestApi, TelemetryApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "船舶遥测数据系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
