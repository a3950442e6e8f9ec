// ==========================================
// 船舶遥测数据系统 - 时间列编解码
// ==========================================
// 存储格式: RFC3339 UTC，定长微秒精度，以 Z 结尾
// 约束: 字符串序 = 时间序（0000-9999 年）
// ==========================================

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::Row;

pub fn format_db_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// 解析时间列（兼容 SQLite 默认值 `strftime('%Y-%m-%dT%H:%M:%fZ')`）
pub fn parse_db_ts(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw).map(|ts| ts.with_timezone(&Utc))
}

/// 从结果行读取时间列
pub fn read_ts(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_db_ts(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_is_fixed_width() {
        let a = Utc.with_ymd_and_hms(2025, 8, 8, 10, 0, 0).unwrap();
        let b = a + chrono::Duration::microseconds(1500);
        assert_eq!(format_db_ts(&a), "2025-08-08T10:00:00.000000Z");
        assert_eq!(format_db_ts(&b), "2025-08-08T10:00:00.001500Z");
        assert!(format_db_ts(&a) < format_db_ts(&b));
    }

    #[test]
    fn test_parse_sqlite_default() {
        let ts = parse_db_ts("2025-08-08T10:00:00.123Z").unwrap();
        assert_eq!(format_db_ts(&ts), "2025-08-08T10:00:00.123000Z");
    }
}
