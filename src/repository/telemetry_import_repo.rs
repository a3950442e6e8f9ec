// ==========================================
// 船舶遥测数据系统 - 遥测导入 Repository Trait
// ==========================================
// 职责: 定义导入流程所需的数据访问接口
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::domain::reading::NewReading;
use crate::domain::vessel::{
    NewUpload, StreamLatest, Upload, UploadInsertOutcome, Vessel, VesselProfile,
};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// TelemetryImportRepository Trait
// ==========================================
// 实现者: TelemetryImportRepositoryImpl（使用 rusqlite）
#[async_trait]
pub trait TelemetryImportRepository: Send + Sync {
    // ===== 文件级幂等 =====

    /// 按文件哈希查找已有上传记录
    async fn find_upload_by_hash(&self, file_hash: &str) -> RepositoryResult<Option<Upload>>;

    /// 写入上传记录
    ///
    /// # 返回
    /// - `Inserted(id)`: 写入成功
    /// - `Duplicate(upload)`: 并发写入中落败，返回胜出者记录
    async fn insert_upload(&self, upload: NewUpload) -> RepositoryResult<UploadInsertOutcome>;

    // ===== 船舶 =====

    async fn find_vessel_by_imo(&self, imo: &str) -> RepositoryResult<Option<Vessel>>;

    /// 插入船舶，IMO 冲突时返回 UniqueConstraintViolation
    async fn insert_vessel(&self, profile: &VesselProfile) -> RepositoryResult<i64>;

    /// 覆盖船名/船旗/船型
    async fn update_vessel_profile(&self, id: i64, profile: &VesselProfile)
        -> RepositoryResult<()>;

    // ===== 读数 =====

    /// 写入读数（唯一冲突静默忽略）
    ///
    /// # 返回
    /// - `Ok(n)`: 实际新写入的行数
    async fn insert_readings(&self, readings: &[NewReading]) -> RepositoryResult<usize>;

    async fn upsert_stream_latest(&self, latest: StreamLatest) -> RepositoryResult<()>;
}
