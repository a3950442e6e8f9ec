// ==========================================
// 船舶遥测数据系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod error;
pub mod reading_repo;
pub mod stream_latest_repo;
pub mod telemetry_import_repo;
pub mod telemetry_import_repo_impl;
pub mod ts_codec;
pub mod upload_repo;
pub mod vessel_repo;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use reading_repo::{ReadingQuery, ReadingRepository};
pub use stream_latest_repo::StreamLatestRepository;
pub use telemetry_import_repo::TelemetryImportRepository;
pub use telemetry_import_repo_impl::TelemetryImportRepositoryImpl;
pub use upload_repo::UploadRepository;
pub use vessel_repo::VesselRepository;
