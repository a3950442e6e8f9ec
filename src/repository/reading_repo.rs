// ==========================================
// 船舶遥测数据系统 - 遥测读数仓储
// ==========================================
// 对齐: 六张 *_readings 表
// 约束: (vessel_id, ts, row_hash) 唯一，冲突写入静默忽略
// 分页: 稳定排序 (ts, id)，游标为上一页最后一条的 (ts, id)
// ==========================================

use crate::domain::reading::{
    CctvValues, EngineValues, FuelTankValues, GeneratorValues, ImpactValues, LocationValues,
    NewReading, ReadingValues, StoredReading,
};
use crate::domain::types::Stream;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::ts_codec::{format_db_ts, read_ts};
use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex, MutexGuard};

/// 公共列数（id, vessel_id, ts, row_hash, extra_json, created_at）
const BASE_COLUMNS: usize = 6;

/// 各流的数值/文本列（顺序与 ReadingValues 字段一致）
fn value_columns(stream: Stream) -> &'static [&'static str] {
    match stream {
        Stream::Engines => &["engine_no", "rpm", "temp_c", "oil_pressure_bar", "alarms"],
        Stream::Fuel => &["tank_no", "level_percent", "volume_liters", "temp_c"],
        Stream::Generators => &["gen_no", "load_kw", "voltage_v", "frequency_hz", "fuel_rate_lph"],
        Stream::Cctv => &["cam_id", "status", "uptime_percent"],
        Stream::Impact => &["sensor_id", "accel_g", "shock_g", "notes"],
        Stream::Location => &["latitude", "longitude", "course_degrees", "speed_knots", "status"],
    }
}

fn opt<T: Into<Value>>(v: Option<T>) -> Value {
    v.map(Into::into).unwrap_or(Value::Null)
}

fn value_params(values: &ReadingValues) -> Vec<Value> {
    match values {
        ReadingValues::Engine(v) => vec![
            opt(v.engine_no),
            opt(v.rpm),
            opt(v.temp_c),
            opt(v.oil_pressure_bar),
            opt(v.alarms.clone()),
        ],
        ReadingValues::Fuel(v) => vec![
            opt(v.tank_no),
            opt(v.level_percent),
            opt(v.volume_liters),
            opt(v.temp_c),
        ],
        ReadingValues::Generator(v) => vec![
            opt(v.gen_no),
            opt(v.load_kw),
            opt(v.voltage_v),
            opt(v.frequency_hz),
            opt(v.fuel_rate_lph),
        ],
        ReadingValues::Cctv(v) => vec![
            opt(v.cam_id.clone()),
            opt(v.status.clone()),
            opt(v.uptime_percent),
        ],
        ReadingValues::Impact(v) => vec![
            opt(v.sensor_id.clone()),
            opt(v.accel_g),
            opt(v.shock_g),
            opt(v.notes.clone()),
        ],
        ReadingValues::Location(v) => vec![
            opt(v.latitude),
            opt(v.longitude),
            opt(v.course_degrees),
            opt(v.speed_knots),
            opt(v.status.clone()),
        ],
    }
}

fn map_values(stream: Stream, row: &Row<'_>) -> SqliteResult<ReadingValues> {
    let c = BASE_COLUMNS;
    let values = match stream {
        Stream::Engines => ReadingValues::Engine(EngineValues {
            engine_no: row.get(c)?,
            rpm: row.get(c + 1)?,
            temp_c: row.get(c + 2)?,
            oil_pressure_bar: row.get(c + 3)?,
            alarms: row.get(c + 4)?,
        }),
        Stream::Fuel => ReadingValues::Fuel(FuelTankValues {
            tank_no: row.get(c)?,
            level_percent: row.get(c + 1)?,
            volume_liters: row.get(c + 2)?,
            temp_c: row.get(c + 3)?,
        }),
        Stream::Generators => ReadingValues::Generator(GeneratorValues {
            gen_no: row.get(c)?,
            load_kw: row.get(c + 1)?,
            voltage_v: row.get(c + 2)?,
            frequency_hz: row.get(c + 3)?,
            fuel_rate_lph: row.get(c + 4)?,
        }),
        Stream::Cctv => ReadingValues::Cctv(CctvValues {
            cam_id: row.get(c)?,
            status: row.get(c + 1)?,
            uptime_percent: row.get(c + 2)?,
        }),
        Stream::Impact => ReadingValues::Impact(ImpactValues {
            sensor_id: row.get(c)?,
            accel_g: row.get(c + 1)?,
            shock_g: row.get(c + 2)?,
            notes: row.get(c + 3)?,
        }),
        Stream::Location => ReadingValues::Location(LocationValues {
            latitude: row.get(c)?,
            longitude: row.get(c + 1)?,
            course_degrees: row.get(c + 2)?,
            speed_knots: row.get(c + 3)?,
            status: row.get(c + 4)?,
        }),
    };
    Ok(values)
}

fn map_row(stream: Stream, row: &Row<'_>) -> SqliteResult<StoredReading> {
    let raw_extra: String = row.get(4)?;
    let extra_json = serde_json::from_str(&raw_extra).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(StoredReading {
        id: row.get(0)?,
        vessel_id: row.get(1)?,
        ts: read_ts(row, 2)?,
        row_hash: row.get(3)?,
        extra_json,
        created_at: read_ts(row, 5)?,
        values: map_values(stream, row)?,
    })
}

fn select_sql(stream: Stream) -> String {
    format!(
        "SELECT id, vessel_id, ts, row_hash, extra_json, created_at, {} FROM {}",
        value_columns(stream).join(", "),
        stream.table_name()
    )
}

// ==========================================
// ReadingQuery - 读数查询条件
// ==========================================
#[derive(Debug, Clone)]
pub struct ReadingQuery {
    pub vessel_id: i64,
    pub stream: Stream,
    /// 流内过滤值（列由 Stream::filter_column 决定）
    pub filter: Option<Value>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    /// 严格位于该 (ts, id) 之后
    pub after: Option<(DateTime<Utc>, i64)>,
}

impl ReadingQuery {
    pub fn new(vessel_id: i64, stream: Stream) -> Self {
        Self {
            vessel_id,
            stream,
            filter: None,
            from: None,
            to: None,
            after: None,
        }
    }

    /// 拼接 WHERE 子句与参数
    fn where_clause(&self) -> RepositoryResult<(String, Vec<Value>)> {
        let mut clauses = vec!["vessel_id = ?".to_string()];
        let mut params: Vec<Value> = vec![Value::Integer(self.vessel_id)];

        if let Some(filter) = &self.filter {
            let column = self.stream.filter_column().ok_or_else(|| {
                RepositoryError::FieldValueError {
                    field: "filter".to_string(),
                    message: format!("数据流 {} 不支持过滤", self.stream),
                }
            })?;
            clauses.push(format!("{} = ?", column));
            params.push(filter.clone());
        }

        if let Some(from) = &self.from {
            clauses.push("ts >= ?".to_string());
            params.push(Value::Text(format_db_ts(from)));
        }

        if let Some(to) = &self.to {
            clauses.push("ts <= ?".to_string());
            params.push(Value::Text(format_db_ts(to)));
        }

        if let Some((ts, id)) = &self.after {
            let ts = format_db_ts(ts);
            clauses.push("(ts > ? OR (ts = ? AND id > ?))".to_string());
            params.push(Value::Text(ts.clone()));
            params.push(Value::Text(ts));
            params.push(Value::Integer(*id));
        }

        Ok((clauses.join(" AND "), params))
    }
}

pub struct ReadingRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ReadingRepository {
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

    /// 逐行写入读数（INSERT OR IGNORE）
    ///
    /// 每行独立提交，中途失败时已写入的行保留，重试安全。
    ///
    /// # 返回
    /// - `Ok(n)`: 实际新写入的行数（唯一冲突的行不计）
    pub fn insert_many(&self, readings: &[NewReading]) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let mut inserted = 0;

        for reading in readings {
            let stream = reading.stream();
            let columns = value_columns(stream);
            let placeholders = vec!["?"; columns.len() + 4].join(", ");
            let sql = format!(
                "INSERT OR IGNORE INTO {} (vessel_id, ts, row_hash, extra_json, {}) VALUES ({})",
                stream.table_name(),
                columns.join(", "),
                placeholders
            );

            let mut params = vec![
                Value::Integer(reading.vessel_id),
                Value::Text(format_db_ts(&reading.ts)),
                Value::Text(reading.row_hash.clone()),
                Value::Text(reading.extra_json.clone()),
            ];
            params.extend(value_params(&reading.values));

            let mut stmt = conn.prepare_cached(&sql)?;
            inserted += stmt.execute(params_from_iter(params))?;
        }

        Ok(inserted)
    }

    // ==========================================
    // 查询操作
    // ==========================================

    /// 按 (ts, id) 升序取至多 limit 条
    pub fn find_page(
        &self,
        query: &ReadingQuery,
        limit: usize,
    ) -> RepositoryResult<Vec<StoredReading>> {
        let (where_sql, mut params) = query.where_clause()?;
        let sql = format!(
            "{} WHERE {} ORDER BY ts, id LIMIT ?",
            select_sql(query.stream),
            where_sql
        );
        params.push(Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));

        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let stream = query.stream;
        let readings = stmt
            .query_map(params_from_iter(params), |row| map_row(stream, row))?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(readings)
    }

    /// 最新一条（ts 降序，同 ts 取 id 最大）；游标条件被忽略
    pub fn find_latest(&self, query: &ReadingQuery) -> RepositoryResult<Option<StoredReading>> {
        let query = ReadingQuery {
            after: None,
            ..query.clone()
        };
        let (where_sql, params) = query.where_clause()?;
        let sql = format!(
            "{} WHERE {} ORDER BY ts DESC, id DESC LIMIT 1",
            select_sql(query.stream),
            where_sql
        );

        let conn = self.get_conn()?;
        let stream = query.stream;
        let reading = conn
            .query_row(&sql, params_from_iter(params), |row| map_row(stream, row))
            .optional()?;

        Ok(reading)
    }

    /// 指定船舶某流的读数总数
    pub fn count(&self, vessel_id: i64, stream: Stream) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE vessel_id = ?1",
            stream.table_name()
        );
        let count = conn.query_row(&sql, [vessel_id], |row| row.get(0))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn setup() -> ReadingRepository {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::ensure_schema(&conn).unwrap();
        conn.execute("INSERT INTO vessels (name) VALUES ('A')", []).unwrap();
        ReadingRepository::new(Arc::new(Mutex::new(conn)))
    }

    fn ts(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 8, hour, 0, 0).unwrap()
    }

    fn engine(hour: u32, engine_no: i64, hash: &str) -> NewReading {
        NewReading {
            vessel_id: 1,
            ts: ts(hour),
            values: ReadingValues::Engine(EngineValues {
                engine_no: Some(engine_no),
                rpm: Some(720.0),
                ..Default::default()
            }),
            row_hash: hash.to_string(),
            extra_json: r#"{"Shift":"A"}"#.to_string(),
        }
    }

    #[test]
    fn test_insert_ignores_duplicates() {
        let repo = setup();
        let readings = vec![engine(10, 1, "h1"), engine(10, 2, "h2")];

        assert_eq!(repo.insert_many(&readings).unwrap(), 2);
        assert_eq!(repo.insert_many(&readings).unwrap(), 0);
        assert_eq!(repo.count(1, Stream::Engines).unwrap(), 2);
    }

    #[test]
    fn test_round_trip_values_and_extra_json() {
        let repo = setup();
        repo.insert_many(&[engine(10, 1, "h1")]).unwrap();

        let page = repo
            .find_page(&ReadingQuery::new(1, Stream::Engines), 10)
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].ts, ts(10));
        assert_eq!(page[0].extra_json, serde_json::json!({"Shift": "A"}));
        assert_eq!(
            page[0].values,
            ReadingValues::Engine(EngineValues {
                engine_no: Some(1),
                rpm: Some(720.0),
                ..Default::default()
            })
        );
    }

    #[test]
    fn test_page_ordering_cursor_and_filters() {
        let repo = setup();
        repo.insert_many(&[
            engine(12, 1, "c"),
            engine(10, 1, "a"),
            engine(11, 2, "b"),
            engine(10, 2, "a2"),
        ])
        .unwrap();

        let all = repo
            .find_page(&ReadingQuery::new(1, Stream::Engines), 10)
            .unwrap();
        let order: Vec<&str> = all.iter().map(|r| r.row_hash.as_str()).collect();
        assert_eq!(order, vec!["a", "a2", "b", "c"]);

        let mut query = ReadingQuery::new(1, Stream::Engines);
        query.after = Some((all[1].ts, all[1].id));
        let rest = repo.find_page(&query, 10).unwrap();
        assert_eq!(rest.len(), 2);
        assert_eq!(rest[0].row_hash, "b");

        let mut filtered = ReadingQuery::new(1, Stream::Engines);
        filtered.filter = Some(Value::Integer(1));
        filtered.from = Some(ts(11));
        let page = repo.find_page(&filtered, 10).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].row_hash, "c");
    }

    #[test]
    fn test_latest_prefers_highest_id_on_tie() {
        let repo = setup();
        repo.insert_many(&[engine(10, 1, "a"), engine(12, 1, "b"), engine(12, 2, "c")])
            .unwrap();

        let latest = repo
            .find_latest(&ReadingQuery::new(1, Stream::Engines))
            .unwrap()
            .unwrap();
        assert_eq!(latest.row_hash, "c");

        let mut by_engine = ReadingQuery::new(1, Stream::Engines);
        by_engine.filter = Some(Value::Integer(1));
        let latest = repo.find_latest(&by_engine).unwrap().unwrap();
        assert_eq!(latest.row_hash, "b");

        assert!(repo
            .find_latest(&ReadingQuery::new(1, Stream::Fuel))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_location_filter_rejected() {
        let repo = setup();
        let mut query = ReadingQuery::new(1, Stream::Location);
        query.filter = Some(Value::Text("x".to_string()));

        assert!(matches!(
            repo.find_page(&query, 10),
            Err(RepositoryError::FieldValueError { .. })
        ));
    }
}
