// ==========================================
// 船舶遥测数据系统 - 遥测导入 Repository 实现
// ==========================================
// 职责: 组合各表仓储，共享同一个连接
// ==========================================

use crate::db::{ensure_schema, open_sqlite_connection};
use crate::domain::reading::NewReading;
use crate::domain::vessel::{
    NewUpload, StreamLatest, Upload, UploadInsertOutcome, Vessel, VesselProfile,
};
use crate::repository::error::RepositoryResult;
use crate::repository::reading_repo::ReadingRepository;
use crate::repository::stream_latest_repo::StreamLatestRepository;
use crate::repository::telemetry_import_repo::TelemetryImportRepository;
use crate::repository::upload_repo::UploadRepository;
use crate::repository::vessel_repo::VesselRepository;
use async_trait::async_trait;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

// ==========================================
// TelemetryImportRepositoryImpl
// ==========================================
pub struct TelemetryImportRepositoryImpl {
    vessels: VesselRepository,
    uploads: UploadRepository,
    readings: ReadingRepository,
    stream_latest: StreamLatestRepository,
}

impl TelemetryImportRepositoryImpl {
    /// 打开数据库并确保表结构存在
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        ensure_schema(&conn)?;
        Ok(Self::from_connection(Arc::new(Mutex::new(conn))))
    }

    /// 复用已有连接（表结构由调用方负责）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            vessels: VesselRepository::new(conn.clone()),
            uploads: UploadRepository::new(conn.clone()),
            readings: ReadingRepository::new(conn.clone()),
            stream_latest: StreamLatestRepository::new(conn),
        }
    }
}

#[async_trait]
impl TelemetryImportRepository for TelemetryImportRepositoryImpl {
    async fn find_upload_by_hash(&self, file_hash: &str) -> RepositoryResult<Option<Upload>> {
        self.uploads.find_by_hash(file_hash)
    }

    async fn insert_upload(&self, upload: NewUpload) -> RepositoryResult<UploadInsertOutcome> {
        self.uploads.insert(&upload)
    }

    async fn find_vessel_by_imo(&self, imo: &str) -> RepositoryResult<Option<Vessel>> {
        self.vessels.find_by_imo(imo)
    }

    async fn insert_vessel(&self, profile: &VesselProfile) -> RepositoryResult<i64> {
        self.vessels.insert(profile)
    }

    async fn update_vessel_profile(
        &self,
        id: i64,
        profile: &VesselProfile,
    ) -> RepositoryResult<()> {
        self.vessels.update_profile(id, profile)
    }

    async fn insert_readings(&self, readings: &[NewReading]) -> RepositoryResult<usize> {
        self.readings.insert_many(readings)
    }

    async fn upsert_stream_latest(&self, latest: StreamLatest) -> RepositoryResult<()> {
        self.stream_latest.upsert(&latest)
    }
}
