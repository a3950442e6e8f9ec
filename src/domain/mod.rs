// ==========================================
// 船舶遥测数据系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体与类型
// 红线: 不含数据访问逻辑,不含导入逻辑
// ==========================================

pub mod ingest;
pub mod reading;
pub mod types;
pub mod vessel;

// 重导出核心类型
pub use ingest::{IngestRequest, IngestResponse, SheetOutcome};
pub use reading::{
    CctvValues, EngineValues, FuelTankValues, GeneratorValues, ImpactValues, LocationValues,
    NewReading, ReadingValues, StoredReading,
};
pub use types::{IngestStatus, Stream};
pub use vessel::{
    NewUpload, StreamLatest, Upload, UploadInsertOutcome, Vessel, VesselOverview, VesselProfile,
};
