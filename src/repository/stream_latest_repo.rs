// ==========================================
// 船舶遥测数据系统 - 每船每流最新时间仓储
// ==========================================
// 对齐: vessel_stream_latest 表
// 约束: 每个 (vessel_id, stream) 至多一行
// ==========================================

use crate::domain::types::Stream;
use crate::domain::vessel::StreamLatest;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::ts_codec::{format_db_ts, read_ts};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Result as SqliteResult};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

pub struct StreamLatestRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StreamLatestRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 覆盖写入最新时间（不与旧值比较）
    pub fn upsert(&self, latest: &StreamLatest) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO vessel_stream_latest (vessel_id, stream, latest_ts)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(vessel_id, stream) DO UPDATE SET latest_ts = excluded.latest_ts
            "#,
            params![
                latest.vessel_id,
                latest.stream.as_str(),
                format_db_ts(&latest.latest_ts)
            ],
        )?;
        Ok(())
    }

    pub fn list_for_vessel(
        &self,
        vessel_id: i64,
    ) -> RepositoryResult<BTreeMap<Stream, DateTime<Utc>>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT stream, latest_ts FROM vessel_stream_latest WHERE vessel_id = ?1",
        )?;

        let rows = stmt
            .query_map(params![vessel_id], |row| {
                let raw: String = row.get(0)?;
                let stream = raw.parse::<Stream>().map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(0, Type::Text, e.into())
                })?;
                Ok((stream, read_ts(row, 1)?))
            })?
            .collect::<SqliteResult<BTreeMap<_, _>>>()?;

        Ok(rows)
    }
}
