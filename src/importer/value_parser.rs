// ==========================================
// 船舶遥测数据系统 - 单元格值解析
// ==========================================
// 职责: 原始单元格字符串 → 类型化 Option
// 约束: 纯函数，无副作用
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};
use regex::Regex;
use std::sync::OnceLock;

/// 不带时区的日期时间格式（按顺序尝试，均按 UTC 解释）
const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// 仅时间格式（日期落在 0000-01-01）
const TIME_ONLY_FORMATS: [&str; 2] = ["%H:%M:%S", "%H:%M"];

/// 解析浮点数
///
/// - 空串 → Ok(None)
/// - 非空但无法解析 → Err
pub fn parse_float(raw: &str) -> ImportResult<Option<f64>> {
    if raw.is_empty() {
        return Ok(None);
    }

    raw.trim()
        .parse::<f64>()
        .map(Some)
        .map_err(|_| ImportError::InvalidNumber(format!("无法解析为浮点数: {}", raw)))
}

/// 解析整数（规则同 parse_float）
pub fn parse_int(raw: &str) -> ImportResult<Option<i64>> {
    if raw.is_empty() {
        return Ok(None);
    }

    raw.trim()
        .parse::<i64>()
        .map(Some)
        .map_err(|_| ImportError::InvalidNumber(format!("无法解析为整数: {}", raw)))
}

/// 解析时间戳，依次尝试 RFC3339 / 日期时间 / 纯日期 / 纯时间
pub fn parse_timestamp(raw: &str) -> ImportResult<DateTime<Utc>> {
    if raw.is_empty() {
        return Err(ImportError::InvalidTimestamp("空时间戳".to_string()));
    }

    let value = raw.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    for format in TIME_ONLY_FORMATS {
        if let Ok(time) = NaiveTime::parse_from_str(value, format) {
            if let Some(epoch_day) = NaiveDate::from_ymd_opt(0, 1, 1) {
                return Ok(epoch_day.and_time(time).and_utc());
            }
        }
    }

    Err(ImportError::InvalidTimestamp(format!(
        "无法识别的时间格式: {}",
        value
    )))
}

/// 提取编号：取字符串中第一段连续数字（"Engine #2 (Port)" → 2）
///
/// 无数字或溢出时返回 None，不报错。
pub fn extract_ordinal(raw: &str) -> Option<i64> {
    static DIGITS: OnceLock<Regex> = OnceLock::new();
    let re = DIGITS.get_or_init(|| Regex::new(r"[0-9]+").expect("数字正则"));

    re.find(raw).and_then(|m| m.as_str().parse::<i64>().ok())
}

/// 非空原始文本 → Some
pub fn non_empty(raw: &str) -> Option<String> {
    if raw.is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}

/// RFC3339（秒精度，UTC 以 Z 结尾），用于行指纹
pub fn format_rfc3339(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}
