// ==========================================
// 船舶遥测数据系统 - 导入请求/结果模型
// ==========================================

use crate::domain::types::{IngestStatus, Stream};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

// ==========================================
// IngestRequest - 导入入口参数
// ==========================================
#[derive(Debug, Clone)]
pub struct IngestRequest<'a> {
    /// 原始文件字节（文件哈希的输入）
    pub bytes: &'a [u8],
    pub filename: &'a str,
    /// 显式 IMO，优先级高于 Ship Info 表中的 IMO
    pub imo: Option<&'a str>,
    pub vessel_name: Option<&'a str>,
    /// 参考时间戳：缺少行时间戳时的默认值，也是 stream_latest 的写入值
    pub reference_ts: DateTime<Utc>,
}

// ==========================================
// IngestResponse - 导入结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestResponse {
    pub status: IngestStatus,
    pub upload_id: Option<i64>,
    pub vessel_id: Option<i64>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub rows_inserted: BTreeMap<Stream, usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl IngestResponse {
    pub fn already_ingested(upload_id: i64, vessel_id: i64) -> Self {
        Self {
            status: IngestStatus::AlreadyIngested,
            upload_id: Some(upload_id),
            vessel_id: Some(vessel_id),
            rows_inserted: BTreeMap::new(),
            warnings: Vec::new(),
        }
    }

    /// 指定流的写入行数（未出现视为 0）
    pub fn inserted(&self, stream: Stream) -> usize {
        self.rows_inserted.get(&stream).copied().unwrap_or(0)
    }
}

// ==========================================
// SheetOutcome - 单表处理结果
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetOutcome {
    pub inserted: usize,
    pub warnings: Vec<String>,
}

impl SheetOutcome {
    pub fn failed(warning: String) -> Self {
        Self {
            inserted: 0,
            warnings: vec![warning],
        }
    }
}
