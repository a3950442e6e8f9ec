// ==========================================
// 工作表处理器 - 公共结构
// ==========================================
// SheetTable: 表头 + 数据行视图
// Column:     已解析的列（原始表头 + 列下标），每表只解析一次
// SheetRow:   单行视图，行号为工作表行号（表头为第 1 行）
// ==========================================

use crate::domain::reading::{NewReading, ReadingValues};
use crate::domain::types::Stream;
use crate::importer::error::ImportResult;
use crate::importer::extra_fields::build_extra_json;
use crate::importer::fingerprint::row_hash;
use crate::importer::header_mapper::HeaderMapper;
use crate::importer::value_parser::{
    extract_ordinal, non_empty, parse_float, parse_timestamp,
};
use crate::importer::workbook_reader::WorkbookSheet;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

// ==========================================
// SheetRows - 处理器输出
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetRows {
    pub readings: Vec<NewReading>,
    pub warnings: Vec<String>,
}

// ==========================================
// Column
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub header: String,
    pub index: usize,
}

// ==========================================
// SheetTable
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct SheetTable<'a> {
    pub name: &'a str,
    pub headers: &'a [String],
    pub data: &'a [Vec<String>],
}

impl<'a> SheetTable<'a> {
    pub fn new(name: &'a str, headers: &'a [String], data: &'a [Vec<String>]) -> Self {
        Self {
            name,
            headers,
            data,
        }
    }

    /// 从工作表构建视图
    ///
    /// # 返回
    /// - Err: 读取失败或少于 2 行（仅表头 / 空表），内容为失败原因
    pub fn from_sheet(sheet: &'a WorkbookSheet) -> Result<Self, String> {
        let rows = sheet.rows.as_ref().map_err(|e| e.clone())?;
        if rows.len() < 2 {
            return Err(format!("数据行不足（共 {} 行）", rows.len()));
        }

        Ok(Self {
            name: &sheet.name,
            headers: &rows[0],
            data: &rows[1..],
        })
    }

    pub fn mapper(&self) -> HeaderMapper {
        HeaderMapper::new(self.headers)
    }

    /// 按候选词解析列
    ///
    /// 同名表头取最后一列（与行映射的后写覆盖一致）。
    pub fn column(&self, mapper: &HeaderMapper, patterns: &[&str]) -> Option<Column> {
        let header = mapper.find(patterns)?;
        self.locate(header)
    }

    pub fn timestamp_column(&self, mapper: &HeaderMapper) -> Option<Column> {
        let header = mapper.find_timestamp()?;
        self.locate(header)
    }

    fn locate(&self, header: &str) -> Option<Column> {
        let index = self.headers.iter().rposition(|h| h == header)?;
        Some(Column {
            header: header.to_string(),
            index,
        })
    }

    /// 第一条数据行（不跳过空行）
    pub fn first_row(&self) -> Option<SheetRow<'a>> {
        self.data.first().map(|cells| SheetRow {
            number: 2,
            headers: self.headers,
            cells,
        })
    }

    /// 数据行迭代（跳过全空行，行号保持工作表行号）
    pub fn rows(&self) -> impl Iterator<Item = SheetRow<'a>> + 'a {
        let headers = self.headers;
        let data = self.data;
        data.iter()
            .enumerate()
            .filter(|(_, cells)| cells.iter().any(|c| !c.is_empty()))
            .map(move |(i, cells)| SheetRow {
                number: i + 2,
                headers,
                cells,
            })
    }
}

// ==========================================
// SheetRow
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct SheetRow<'a> {
    pub number: usize,
    headers: &'a [String],
    cells: &'a [String],
}

impl<'a> SheetRow<'a> {
    /// 列缺失或行长度不足 → ""
    pub fn cell(&self, column: Option<&Column>) -> &'a str {
        column
            .and_then(|c| self.cells.get(c.index))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// 可选数值字段：无法解析时留空（不报错）
    pub fn float(&self, column: Option<&Column>) -> Option<f64> {
        parse_float(self.cell(column)).ok().flatten()
    }

    pub fn ordinal(&self, column: Option<&Column>) -> Option<i64> {
        extract_ordinal(self.cell(column))
    }

    pub fn text(&self, column: Option<&Column>) -> Option<String> {
        non_empty(self.cell(column))
    }

    /// 行时间戳：列缺失或无法解析时回退到参考时间
    pub fn timestamp(&self, column: Option<&Column>, reference: DateTime<Utc>) -> DateTime<Utc> {
        if column.is_none() {
            return reference;
        }
        parse_timestamp(self.cell(column)).unwrap_or(reference)
    }

    /// 原始表头 → 单元格文本（超出表头宽度的单元格丢弃）
    pub fn to_map(&self) -> HashMap<String, String> {
        self.headers
            .iter()
            .zip(self.cells.iter())
            .map(|(h, c)| (h.clone(), c.clone()))
            .collect()
    }
}

// ==========================================
// 辅助函数
// ==========================================

/// 已消费的原始表头列表
pub fn mapped_headers<'c>(columns: &[&'c Option<Column>]) -> Vec<&'c str> {
    columns
        .iter()
        .copied()
        .filter_map(|c| c.as_ref())
        .map(|c| c.header.as_str())
        .collect()
}

/// 行级警告：`row {n} {stream}: w1, w2`
pub fn row_warning(number: usize, stream: Stream, warnings: &[String]) -> String {
    format!("row {} {}: {}", number, stream, warnings.join(", "))
}

/// 组装待写入读数（extra_json + 行指纹）
///
/// # 参数
/// - tag: 流内标识键（如 `engine_no:1`），缺失时不参与指纹
/// - mapped: 已消费的原始表头，其余非空列进入 extra_json
pub fn finish_reading(
    row: &SheetRow<'_>,
    vessel_id: i64,
    ts: DateTime<Utc>,
    tag: Option<String>,
    mapped: &[&str],
    values: ReadingValues,
) -> ImportResult<NewReading> {
    let extra_json = build_extra_json(&row.to_map(), mapped)?;

    let mut keys = Vec::with_capacity(2);
    if let Some(tag) = tag {
        keys.push(tag);
    }
    keys.push(extra_json.clone());

    let row_hash = row_hash(vessel_id, &ts, values.stream(), &keys);

    Ok(NewReading {
        vessel_id,
        ts,
        values,
        row_hash,
        extra_json,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_from_sheet_requires_data_row() {
        let sheet = WorkbookSheet {
            name: "Engines".to_string(),
            rows: Ok(vec![strings(&["Timestamp", "RPM"])]),
        };
        assert!(SheetTable::from_sheet(&sheet).is_err());

        let sheet = WorkbookSheet {
            name: "Engines".to_string(),
            rows: Err("zip error".to_string()),
        };
        assert_eq!(SheetTable::from_sheet(&sheet).unwrap_err(), "zip error");
    }

    #[test]
    fn test_rows_skip_blank_and_keep_sheet_numbers() {
        let headers = strings(&["Timestamp", "RPM"]);
        let data = vec![
            strings(&["2025-08-08", "1"]),
            strings(&["", ""]),
            strings(&["2025-08-09", "2"]),
        ];
        let table = SheetTable::new("Engines", &headers, &data);

        let numbers: Vec<usize> = table.rows().map(|r| r.number).collect();
        assert_eq!(numbers, vec![2, 4]);
    }

    #[test]
    fn test_duplicate_header_resolves_to_last_column() {
        let headers = strings(&["RPM", "RPM"]);
        let data = vec![strings(&["100", "200"])];
        let table = SheetTable::new("Engines", &headers, &data);
        let mapper = table.mapper();

        let column = table.column(&mapper, &["rpm"]).unwrap();
        assert_eq!(column.index, 1);
        let row = table.first_row().unwrap();
        assert_eq!(row.float(Some(&column)), Some(200.0));
        assert_eq!(row.to_map().get("RPM").map(String::as_str), Some("200"));
    }

    #[test]
    fn test_short_row_reads_empty_cells() {
        let headers = strings(&["Timestamp", "RPM", "Alarms"]);
        let data = vec![strings(&["2025-08-08"])];
        let table = SheetTable::new("Engines", &headers, &data);
        let mapper = table.mapper();
        let alarms = table.column(&mapper, &["alarm"]);

        let row = table.first_row().unwrap();
        assert_eq!(row.cell(alarms.as_ref()), "");
        assert_eq!(row.text(alarms.as_ref()), None);
    }

    #[test]
    fn test_timestamp_falls_back_to_reference() {
        let reference = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let headers = strings(&["Timestamp"]);
        let data = vec![strings(&["garbage"]), strings(&["2025-08-08T10:00:00Z"])];
        let table = SheetTable::new("Engines", &headers, &data);
        let ts = table.timestamp_column(&table.mapper());

        let rows: Vec<_> = table.rows().collect();
        assert_eq!(rows[0].timestamp(ts.as_ref(), reference), reference);
        assert_eq!(
            rows[1].timestamp(ts.as_ref(), reference),
            Utc.with_ymd_and_hms(2025, 8, 8, 10, 0, 0).unwrap()
        );
        assert_eq!(rows[1].timestamp(None, reference), reference);
    }

    #[test]
    fn test_row_warning_format() {
        let warnings = vec!["negative rpm".to_string(), "negative oil pressure".to_string()];
        assert_eq!(
            row_warning(3, Stream::Engines, &warnings),
            "row 3 engines: negative rpm, negative oil pressure"
        );
    }
}
