// ==========================================
// 船舶遥测数据系统 - 表头映射器
// ==========================================
// 职责: 语义字段 → 原始表头（规范化后精确匹配 / 子串匹配）
// 规范化: trim + 小写 + 空格/连字符 → 下划线
// ==========================================

use std::collections::HashMap;

/// 时间戳列同义词（按优先级）
pub const TIMESTAMP_PATTERNS: [&str; 17] = [
    "timestamp",
    "ts",
    "time",
    "date",
    "datetime",
    "date_time",
    "time_stamp",
    "record_time",
    "log_time",
    "created_at",
    "recorded_at",
    "sample_time",
    "measurement_time",
    "utc",
    "local_time",
    "system_time",
    "event_time",
];

pub struct HeaderMapper {
    /// 规范化表头 → 原始表头（同名后写覆盖）
    headers: HashMap<String, String>,
    /// 规范化表头首次出现顺序，子串匹配按此顺序扫描
    order: Vec<String>,
}

impl HeaderMapper {
    pub fn new<S: AsRef<str>>(headers: &[S]) -> Self {
        let mut map = HashMap::with_capacity(headers.len());
        let mut order = Vec::with_capacity(headers.len());

        for header in headers {
            let original = header.as_ref();
            let normalized = normalize_header(original);
            if !map.contains_key(&normalized) {
                order.push(normalized.clone());
            }
            map.insert(normalized, original.to_string());
        }

        Self {
            headers: map,
            order,
        }
    }

    /// 按候选词顺序查找表头
    ///
    /// 每个候选词先精确匹配，再子串匹配；首个命中的候选词即返回。
    /// 多个表头包含同一候选词时，取列顺序最靠前者。
    pub fn find(&self, patterns: &[&str]) -> Option<&str> {
        for pattern in patterns {
            if let Some(original) = self.headers.get(*pattern) {
                return Some(original.as_str());
            }

            let hit = self
                .order
                .iter()
                .find(|normalized| normalized.contains(*pattern));
            if let Some(normalized) = hit {
                return self.headers.get(normalized).map(String::as_str);
            }
        }
        None
    }

    pub fn find_timestamp(&self) -> Option<&str> {
        self.find(&TIMESTAMP_PATTERNS)
    }
}

pub fn normalize_header(header: &str) -> String {
    header
        .trim()
        .to_lowercase()
        .replace(' ', "_")
        .replace('-', "_")
}
