// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 临时数据库、内存工作簿读取器、组件装配
// ==========================================

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use std::error::Error;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;
use vessel_telemetry::app::AppState;
use vessel_telemetry::db::{ensure_schema, open_sqlite_connection};
use vessel_telemetry::importer::{ImportResult, TelemetryImporterImpl, Workbook, WorkbookReader};
use vessel_telemetry::repository::TelemetryImportRepositoryImpl;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().unwrap().to_string();

    let conn = open_sqlite_connection(&db_path)?;
    ensure_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 忽略文件内容、始终返回预置工作簿的读取器
///
/// 不同字节 → 不同文件哈希，同一工作簿内容
pub struct StaticWorkbookReader(pub Workbook);

impl WorkbookReader for StaticWorkbookReader {
    fn read_workbook(&self, _bytes: &[u8], _filename: &str) -> ImportResult<Workbook> {
        Ok(self.0.clone())
    }
}

/// 表格字面量 → 行
pub fn rows(items: &[&[&str]]) -> Vec<Vec<String>> {
    items
        .iter()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect()
}

/// 默认参考时间戳
pub fn reference_ts() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 8, 1, 0, 0, 0).unwrap()
}

pub fn ts(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw).unwrap().with_timezone(&Utc)
}

/// 导入器（直接面向 TelemetryImporter 接口）
pub fn create_test_importer(
    db_path: &str,
    workbook: Workbook,
) -> TelemetryImporterImpl<TelemetryImportRepositoryImpl> {
    let repo = TelemetryImportRepositoryImpl::new(db_path).unwrap();
    TelemetryImporterImpl::new(repo, Box::new(StaticWorkbookReader(workbook)))
}

/// 完整应用状态（内存工作簿）
pub fn create_test_state(db_path: &str, workbook: Workbook) -> AppState {
    let conn = open_sqlite_connection(db_path).unwrap();
    AppState::from_connection(
        db_path.to_string(),
        Arc::new(Mutex::new(conn)),
        Box::new(StaticWorkbookReader(workbook)),
    )
    .unwrap()
}

// ==========================================
// 常用工作簿
// ==========================================

pub fn ship_info_sheet(imo: &str, name: &str, flag: &str) -> Vec<Vec<String>> {
    rows(&[
        &["IMO", "Name", "Flag", "Type", "Latitude", "Longitude", "Course", "Speed", "Status"],
        &[imo, name, flag, "Bulk Carrier", "1.25", "103.8", "90", "12.5", "Underway"],
    ])
}

pub fn engines_sheet() -> Vec<Vec<String>> {
    rows(&[
        &["Timestamp", "Engine", "RPM", "Temp", "Oil Pressure", "Alarms"],
        &["2025-08-08T10:00:00Z", "1", "720", "85.5", "4.2", ""],
        &["2025-08-08T10:00:00Z", "2", "715", "86.0", "4.1", "HIGH TEMP"],
        &["2025-08-08T11:00:00Z", "1", "730", "85.9", "4.3", ""],
    ])
}

/// Ship Info + Engines + Fuel Tanks + Generators
pub fn sample_workbook(imo: &str, name: &str) -> Workbook {
    Workbook::new()
        .with_sheet("Ship Info", ship_info_sheet(imo, name, "PA"))
        .with_sheet("Engines", engines_sheet())
        .with_sheet(
            "Fuel Tanks",
            rows(&[
                &["Timestamp", "Tank", "Capacity", "Current", "Temp"],
                &["2025-08-08T10:00:00Z", "1", "1000", "250", "30"],
            ]),
        )
        .with_sheet(
            "Generators",
            rows(&[
                &["Timestamp", "Generator", "Load", "Voltage", "Frequency", "Fuel Rate"],
                &["2025-08-08T10:00:00Z", "1", "450", "440", "60", "95"],
            ]),
        )
}
