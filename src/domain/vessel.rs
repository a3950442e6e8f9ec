// ==========================================
// 船舶遥测数据系统 - 船舶/上传领域模型
// ==========================================
// 用途: 导入层写入，查询层只读
// 对齐: vessels / uploads / vessel_stream_latest 表
// ==========================================

use crate::domain::types::Stream;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// Vessel - 船舶主数据
// ==========================================
// 约束: imo 非空时全局唯一
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vessel {
    pub id: i64,
    pub imo: Option<String>,
    pub name: String,
    pub flag: Option<String>,
    #[serde(rename = "type")]
    pub vessel_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ==========================================
// VesselProfile - 导入时解析出的船舶身份
// ==========================================
// 生命周期: 仅在导入流程内（ResolveVessel 阶段产出）
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VesselProfile {
    pub imo: Option<String>,
    pub name: String,
    pub flag: Option<String>,
    pub vessel_type: Option<String>,
}

// ==========================================
// Upload - 上传记录
// ==========================================
// 约束: file_hash 唯一（文件级幂等键）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Upload {
    pub id: i64,
    pub vessel_id: i64,
    pub source_filename: String,
    pub file_hash: String,
    pub uploaded_at: DateTime<Utc>,
    pub note: Option<String>,
}

/// 待写入的上传记录
#[derive(Debug, Clone)]
pub struct NewUpload {
    pub vessel_id: i64,
    pub source_filename: String,
    pub file_hash: String,
    pub uploaded_at: DateTime<Utc>,
    pub note: Option<String>,
}

/// 上传记录写入结果
///
/// 相同 file_hash 的并发写入只会有一个成功，失败方拿到胜出者的记录。
#[derive(Debug, Clone, PartialEq)]
pub enum UploadInsertOutcome {
    Inserted(i64),
    Duplicate(Upload),
}

// ==========================================
// StreamLatest - 每船每流最新时间指针
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamLatest {
    pub vessel_id: i64,
    pub stream: Stream,
    pub latest_ts: DateTime<Utc>,
}

// ==========================================
// VesselOverview - 船舶 + 各流最新时间（查询视图）
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct VesselOverview {
    #[serde(flatten)]
    pub vessel: Vessel,
    pub latest: BTreeMap<Stream, DateTime<Utc>>,
}
