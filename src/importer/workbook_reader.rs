// ==========================================
// 船舶遥测数据系统 - 工作簿读取器实现
// ==========================================
// 支持: Excel (.xlsx/.xlsm) / CSV (.csv)
// 输出: 工作表名 + 行（单元格文本），首行视为表头
// 约束: 单表读取失败不影响其他表（记录在 WorkbookSheet.rows 中）
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::telemetry_importer_trait::WorkbookReader;
use calamine::{Data, DataType, Reader, Xlsx};
use csv::ReaderBuilder;
use std::io::Cursor;
use std::path::Path;

// ==========================================
// Workbook - 内存中的工作簿
// ==========================================

#[derive(Debug, Clone, PartialEq)]
pub struct WorkbookSheet {
    pub name: String,
    /// Err 为该表的读取错误描述
    pub rows: Result<Vec<Vec<String>>, String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    pub sheets: Vec<WorkbookSheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一张工作表（构建器风格）
    pub fn with_sheet<S: Into<String>>(mut self, name: S, rows: Vec<Vec<String>>) -> Self {
        self.sheets.push(WorkbookSheet {
            name: name.into(),
            rows: Ok(rows),
        });
        self
    }

    /// 追加一张读取失败的工作表
    pub fn with_unreadable_sheet<S: Into<String>>(mut self, name: S, message: &str) -> Self {
        self.sheets.push(WorkbookSheet {
            name: name.into(),
            rows: Err(message.to_string()),
        });
        self
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    /// 查找 Ship Info 表（名称同时包含 "ship" 与 "info"，大小写不敏感）
    pub fn ship_info_sheet(&self) -> Option<&WorkbookSheet> {
        self.sheets.iter().find(|sheet| is_ship_info_sheet(&sheet.name))
    }
}

pub fn is_ship_info_sheet(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("ship") && lower.contains("info")
}

// ==========================================
// Excel Reader 实现
// ==========================================
pub struct XlsxWorkbookReader;

impl WorkbookReader for XlsxWorkbookReader {
    fn read_workbook(&self, bytes: &[u8], _filename: &str) -> ImportResult<Workbook> {
        // 打开工作簿容器（失败即整体失败）
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes.to_vec()))?;

        let sheet_names = workbook.sheet_names();
        if sheet_names.is_empty() {
            return Err(ImportError::ExcelParseError("Excel 文件无工作表".to_string()));
        }

        let mut sheets = Vec::with_capacity(sheet_names.len());
        for name in sheet_names {
            // 单表失败降级为该表的错误描述
            let rows = workbook
                .worksheet_range(&name)
                .map(|range| {
                    range
                        .rows()
                        .map(|row| row.iter().map(cell_to_string).collect())
                        .collect()
                })
                .map_err(|e| e.to_string());

            sheets.push(WorkbookSheet { name, rows });
        }

        Ok(Workbook { sheets })
    }
}

/// 单元格 → 文本
///
/// 日期单元格格式化为 `YYYY-MM-DD HH:MM:SS`，以便时间戳解析器识别。
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
        Data::DateTime(_) => cell
            .as_datetime()
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| cell.to_string()),
        other => other.to_string(),
    }
}

// ==========================================
// CSV Reader 实现
// ==========================================
// 单表工作簿，表名取文件名主干（engines.csv → "engines"）
pub struct CsvWorkbookReader;

impl WorkbookReader for CsvWorkbookReader {
    fn read_workbook(&self, bytes: &[u8], filename: &str) -> ImportResult<Workbook> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true) // 允许行长度不一致
            .from_reader(bytes);

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            rows.push(record.iter().map(|v| v.trim().to_string()).collect());
        }

        let sheet_name = Path::new(filename)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| filename.to_string());

        Ok(Workbook::new().with_sheet(sheet_name, rows))
    }
}

// ==========================================
// Universal Reader（按扩展名分派）
// ==========================================
pub struct UniversalWorkbookReader;

impl WorkbookReader for UniversalWorkbookReader {
    fn read_workbook(&self, bytes: &[u8], filename: &str) -> ImportResult<Workbook> {
        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "xlsx" | "xlsm" => XlsxWorkbookReader.read_workbook(bytes, filename),
            "csv" => CsvWorkbookReader.read_workbook(bytes, filename),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}
