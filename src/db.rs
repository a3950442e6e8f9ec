// ==========================================
// 船舶遥测数据系统 - SQLite 连接初始化与建表
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键 / busy_timeout）
// - 幂等建表（CREATE IF NOT EXISTS），不做迁移
// ==========================================
// 时间列统一存储为 RFC3339 UTC 文本（定长微秒精度，以 Z 结尾），
// 字符串序即时间序，分页可直接按 ts 比较。
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前 schema 版本
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要"每个连接"单独开启
/// - busy_timeout 需要"每个连接"单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// 幂等建表（所有表 + 索引 + global scope + schema_version）
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);

-- ===== 配置 =====
CREATE TABLE IF NOT EXISTS config_scope (
    scope_id TEXT PRIMARY KEY,
    scope_type TEXT NOT NULL,
    scope_key TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    UNIQUE(scope_type, scope_key)
);

INSERT OR IGNORE INTO config_scope (scope_id, scope_type, scope_key)
VALUES ('global', 'GLOBAL', 'global');

CREATE TABLE IF NOT EXISTS config_kv (
    scope_id TEXT NOT NULL REFERENCES config_scope(scope_id) ON DELETE CASCADE,
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    PRIMARY KEY (scope_id, key)
);

-- ===== 船舶 / 上传 =====
CREATE TABLE IF NOT EXISTS vessels (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    imo TEXT UNIQUE,
    name TEXT NOT NULL,
    flag TEXT,
    type TEXT,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);

CREATE TABLE IF NOT EXISTS uploads (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    vessel_id INTEGER NOT NULL REFERENCES vessels(id),
    source_filename TEXT NOT NULL,
    file_hash TEXT NOT NULL UNIQUE,
    uploaded_at TEXT NOT NULL,
    note TEXT
);

CREATE INDEX IF NOT EXISTS idx_uploads_vessel ON uploads(vessel_id);

-- ===== 遥测读数 =====
CREATE TABLE IF NOT EXISTS engine_readings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    vessel_id INTEGER NOT NULL REFERENCES vessels(id),
    engine_no INTEGER,
    ts TEXT NOT NULL,
    rpm REAL,
    temp_c REAL,
    oil_pressure_bar REAL,
    alarms TEXT,
    row_hash TEXT NOT NULL,
    extra_json TEXT NOT NULL DEFAULT '{}',
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    UNIQUE(vessel_id, ts, row_hash)
);

CREATE INDEX IF NOT EXISTS idx_engine_readings_vessel_ts ON engine_readings(vessel_id, ts, id);

CREATE TABLE IF NOT EXISTS fuel_tank_readings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    vessel_id INTEGER NOT NULL REFERENCES vessels(id),
    tank_no INTEGER,
    ts TEXT NOT NULL,
    level_percent REAL,
    volume_liters REAL,
    temp_c REAL,
    row_hash TEXT NOT NULL,
    extra_json TEXT NOT NULL DEFAULT '{}',
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    UNIQUE(vessel_id, ts, row_hash)
);

CREATE INDEX IF NOT EXISTS idx_fuel_tank_readings_vessel_ts ON fuel_tank_readings(vessel_id, ts, id);

CREATE TABLE IF NOT EXISTS generator_readings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    vessel_id INTEGER NOT NULL REFERENCES vessels(id),
    gen_no INTEGER,
    ts TEXT NOT NULL,
    load_kw REAL,
    voltage_v REAL,
    frequency_hz REAL,
    fuel_rate_lph REAL,
    row_hash TEXT NOT NULL,
    extra_json TEXT NOT NULL DEFAULT '{}',
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    UNIQUE(vessel_id, ts, row_hash)
);

CREATE INDEX IF NOT EXISTS idx_generator_readings_vessel_ts ON generator_readings(vessel_id, ts, id);

CREATE TABLE IF NOT EXISTS cctv_status_readings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    vessel_id INTEGER NOT NULL REFERENCES vessels(id),
    cam_id TEXT,
    ts TEXT NOT NULL,
    status TEXT,
    uptime_percent REAL,
    row_hash TEXT NOT NULL,
    extra_json TEXT NOT NULL DEFAULT '{}',
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    UNIQUE(vessel_id, ts, row_hash)
);

CREATE INDEX IF NOT EXISTS idx_cctv_status_readings_vessel_ts ON cctv_status_readings(vessel_id, ts, id);

CREATE TABLE IF NOT EXISTS impact_vibration_readings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    vessel_id INTEGER NOT NULL REFERENCES vessels(id),
    sensor_id TEXT,
    ts TEXT NOT NULL,
    accel_g REAL,
    shock_g REAL,
    notes TEXT,
    row_hash TEXT NOT NULL,
    extra_json TEXT NOT NULL DEFAULT '{}',
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    UNIQUE(vessel_id, ts, row_hash)
);

CREATE INDEX IF NOT EXISTS idx_impact_vibration_readings_vessel_ts ON impact_vibration_readings(vessel_id, ts, id);

CREATE TABLE IF NOT EXISTS location_readings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    vessel_id INTEGER NOT NULL REFERENCES vessels(id),
    ts TEXT NOT NULL,
    latitude REAL,
    longitude REAL,
    course_degrees REAL,
    speed_knots REAL,
    status TEXT,
    row_hash TEXT NOT NULL,
    extra_json TEXT NOT NULL DEFAULT '{}',
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    UNIQUE(vessel_id, ts, row_hash)
);

CREATE INDEX IF NOT EXISTS idx_location_readings_vessel_ts ON location_readings(vessel_id, ts, id);

-- ===== 每船每流最新时间 =====
CREATE TABLE IF NOT EXISTS vessel_stream_latest (
    vessel_id INTEGER NOT NULL REFERENCES vessels(id),
    stream TEXT NOT NULL,
    latest_ts TEXT NOT NULL,
    PRIMARY KEY (vessel_id, stream)
);
"#;
