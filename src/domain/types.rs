// ==========================================
// 船舶遥测数据系统 - 领域类型定义
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 遥测数据流 (Stream)
// ==========================================
// 序列化格式: 小写（与 rows_inserted / vessel_stream_latest.stream 一致）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stream {
    Engines,
    Fuel,
    Generators,
    Cctv,
    Impact,
    Location,
}

impl Stream {
    pub const ALL: [Stream; 6] = [
        Stream::Engines,
        Stream::Fuel,
        Stream::Generators,
        Stream::Cctv,
        Stream::Impact,
        Stream::Location,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stream::Engines => "engines",
            Stream::Fuel => "fuel",
            Stream::Generators => "generators",
            Stream::Cctv => "cctv",
            Stream::Impact => "impact",
            Stream::Location => "location",
        }
    }

    /// 对应的读数表名
    pub fn table_name(&self) -> &'static str {
        match self {
            Stream::Engines => "engine_readings",
            Stream::Fuel => "fuel_tank_readings",
            Stream::Generators => "generator_readings",
            Stream::Cctv => "cctv_status_readings",
            Stream::Impact => "impact_vibration_readings",
            Stream::Location => "location_readings",
        }
    }

    /// 分页查询支持的流内过滤列（location 无）
    pub fn filter_column(&self) -> Option<&'static str> {
        match self {
            Stream::Engines => Some("engine_no"),
            Stream::Fuel => Some("tank_no"),
            Stream::Generators => Some("gen_no"),
            Stream::Cctv => Some("cam_id"),
            Stream::Impact => Some("sensor_id"),
            Stream::Location => None,
        }
    }

    /// 工作表名分类（大小写不敏感子串匹配，按顺序首个命中）
    ///
    /// Ship Info 表不在此处分类，由编排器单独处理。
    pub fn classify_sheet(sheet_name: &str) -> Option<Stream> {
        let lower = sheet_name.to_lowercase();
        if lower.contains("engine") {
            Some(Stream::Engines)
        } else if lower.contains("fuel") {
            Some(Stream::Fuel)
        } else if lower.contains("generator") {
            Some(Stream::Generators)
        } else if lower.contains("cctv") {
            Some(Stream::Cctv)
        } else if lower.contains("impact") || lower.contains("vibration") {
            Some(Stream::Impact)
        } else {
            None
        }
    }
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stream {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "engines" => Ok(Stream::Engines),
            "fuel" => Ok(Stream::Fuel),
            "generators" => Ok(Stream::Generators),
            "cctv" => Ok(Stream::Cctv),
            "impact" => Ok(Stream::Impact),
            "location" => Ok(Stream::Location),
            other => Err(format!("未知数据流: {}", other)),
        }
    }
}

// ==========================================
// 导入状态 (Ingest Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestStatus {
    Ingested,
    AlreadyIngested,
}

impl fmt::Display for IngestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestStatus::Ingested => write!(f, "ingested"),
            IngestStatus::AlreadyIngested => write!(f, "already_ingested"),
        }
    }
}
