// ==========================================
// 船舶遥测数据系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供 CLI / 上层服务调用
// ==========================================

pub mod cursor;
pub mod error;
pub mod ingest_api;
pub mod telemetry_api;

// 重导出核心类型
pub use cursor::Cursor;
pub use error::{ApiError, ApiResult};
pub use ingest_api::IngestApi;
pub use telemetry_api::{HealthStatus, ReadingListParams, ReadingPage, TelemetryApi};
