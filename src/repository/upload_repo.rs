// ==========================================
// 船舶遥测数据系统 - 上传记录仓储
// ==========================================
// 对齐: uploads 表
// 约束: file_hash 唯一（文件级幂等键）
// ==========================================

use crate::domain::vessel::{NewUpload, Upload, UploadInsertOutcome};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::ts_codec::{format_db_ts, read_ts};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex, MutexGuard};

const UPLOAD_COLUMNS: &str = "id, vessel_id, source_filename, file_hash, uploaded_at, note";

pub struct UploadRepository {
    conn: Arc<Mutex<Connection>>,
}

impl UploadRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 写入上传记录
    ///
    /// # 返回
    /// - `Inserted(id)`: 写入成功
    /// - `Duplicate(upload)`: 相同 file_hash 已存在，返回已存在的记录
    pub fn insert(&self, upload: &NewUpload) -> RepositoryResult<UploadInsertOutcome> {
        let inserted = {
            let conn = self.get_conn()?;
            conn.execute(
                r#"
                INSERT INTO uploads (vessel_id, source_filename, file_hash, uploaded_at, note)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![
                    upload.vessel_id,
                    upload.source_filename,
                    upload.file_hash,
                    format_db_ts(&upload.uploaded_at),
                    upload.note
                ],
            )
            .map(|_| conn.last_insert_rowid())
        };

        match inserted {
            Ok(id) => Ok(UploadInsertOutcome::Inserted(id)),
            Err(e) => match RepositoryError::from(e) {
                RepositoryError::UniqueConstraintViolation(msg) => {
                    match self.find_by_hash(&upload.file_hash)? {
                        Some(existing) => Ok(UploadInsertOutcome::Duplicate(existing)),
                        None => Err(RepositoryError::UniqueConstraintViolation(msg)),
                    }
                }
                other => Err(other),
            },
        }
    }

    pub fn find_by_hash(&self, file_hash: &str) -> RepositoryResult<Option<Upload>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM uploads WHERE file_hash = ?1", UPLOAD_COLUMNS);

        let upload = conn
            .query_row(&sql, params![file_hash], Self::map_row)
            .optional()?;
        Ok(upload)
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Upload>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM uploads WHERE id = ?1", UPLOAD_COLUMNS);

        let upload = conn
            .query_row(&sql, params![id], Self::map_row)
            .optional()?;
        Ok(upload)
    }

    fn map_row(row: &Row<'_>) -> SqliteResult<Upload> {
        Ok(Upload {
            id: row.get(0)?,
            vessel_id: row.get(1)?,
            source_filename: row.get(2)?,
            file_hash: row.get(3)?,
            uploaded_at: read_ts(row, 4)?,
            note: row.get(5)?,
        })
    }
}
