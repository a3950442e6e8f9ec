// ==========================================
// 船舶遥测数据系统 - 船舶主数据仓储
// ==========================================
// 对齐: vessels 表
// 红线: Repository 不做业务逻辑,只做数据映射
// ==========================================

use crate::domain::vessel::{Vessel, VesselProfile};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::ts_codec::{format_db_ts, read_ts};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex, MutexGuard};

const VESSEL_COLUMNS: &str = "id, imo, name, flag, type, created_at, updated_at";

pub struct VesselRepository {
    conn: Arc<Mutex<Connection>>,
}

impl VesselRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 插入船舶
    ///
    /// # 返回
    /// - `Ok(id)`: 新船舶 ID
    /// - `Err(UniqueConstraintViolation)`: IMO 已被其他写入占用
    pub fn insert(&self, profile: &VesselProfile) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let now = format_db_ts(&Utc::now());

        conn.execute(
            r#"
            INSERT INTO vessels (imo, name, flag, type, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            "#,
            params![
                profile.imo,
                profile.name,
                profile.flag,
                profile.vessel_type,
                now
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// 覆盖船名/船旗/船型（IMO 不变），刷新 updated_at
    pub fn update_profile(&self, id: i64, profile: &VesselProfile) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let rows = conn.execute(
            r#"
            UPDATE vessels
            SET name = ?1, flag = ?2, type = ?3, updated_at = ?4
            WHERE id = ?5
            "#,
            params![
                profile.name,
                profile.flag,
                profile.vessel_type,
                format_db_ts(&Utc::now()),
                id
            ],
        )?;

        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Vessel".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    // ==========================================
    // 查询操作
    // ==========================================

    pub fn find_by_imo(&self, imo: &str) -> RepositoryResult<Option<Vessel>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM vessels WHERE imo = ?1", VESSEL_COLUMNS);

        let vessel = conn
            .query_row(&sql, params![imo], Self::map_row)
            .optional()?;
        Ok(vessel)
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Vessel>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM vessels WHERE id = ?1", VESSEL_COLUMNS);

        let vessel = conn
            .query_row(&sql, params![id], Self::map_row)
            .optional()?;
        Ok(vessel)
    }

    /// 全部船舶（按船名升序）
    pub fn list_all(&self) -> RepositoryResult<Vec<Vessel>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM vessels ORDER BY name, id", VESSEL_COLUMNS);

        let mut stmt = conn.prepare(&sql)?;
        let vessels = stmt
            .query_map([], Self::map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(vessels)
    }

    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM vessels", [], |row| row.get(0))?;
        Ok(count)
    }

    fn map_row(row: &Row<'_>) -> SqliteResult<Vessel> {
        Ok(Vessel {
            id: row.get(0)?,
            imo: row.get(1)?,
            name: row.get(2)?,
            flag: row.get(3)?,
            vessel_type: row.get(4)?,
            created_at: read_ts(row, 5)?,
            updated_at: read_ts(row, 6)?,
        })
    }
}
