// ==========================================
// 船舶遥测数据系统 - 遥测读数领域模型
// ==========================================
// 红线: 所有数值/文本字段均为 Option，区分"源表缺失"与"值为 0/空"
// 约束: (vessel_id, ts, row_hash) 唯一，冲突写入静默忽略
// 对齐: 六张 *_readings 表
// ==========================================

use crate::domain::types::Stream;
use chrono::{DateTime, Utc};
use serde::Serialize;

// ==========================================
// 各流字段
// ==========================================

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct EngineValues {
    pub engine_no: Option<i64>,
    pub rpm: Option<f64>,
    pub temp_c: Option<f64>,
    pub oil_pressure_bar: Option<f64>,
    pub alarms: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FuelTankValues {
    pub tank_no: Option<i64>,
    pub level_percent: Option<f64>,
    pub volume_liters: Option<f64>,
    pub temp_c: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct GeneratorValues {
    pub gen_no: Option<i64>,
    pub load_kw: Option<f64>,
    pub voltage_v: Option<f64>,
    pub frequency_hz: Option<f64>,
    pub fuel_rate_lph: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CctvValues {
    pub cam_id: Option<String>,
    pub status: Option<String>,
    pub uptime_percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ImpactValues {
    pub sensor_id: Option<String>,
    pub accel_g: Option<f64>,
    pub shock_g: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct LocationValues {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub course_degrees: Option<f64>,
    pub speed_knots: Option<f64>,
    pub status: Option<String>,
}

/// 按流区分的读数字段
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReadingValues {
    Engine(EngineValues),
    Fuel(FuelTankValues),
    Generator(GeneratorValues),
    Cctv(CctvValues),
    Impact(ImpactValues),
    Location(LocationValues),
}

impl ReadingValues {
    pub fn stream(&self) -> Stream {
        match self {
            ReadingValues::Engine(_) => Stream::Engines,
            ReadingValues::Fuel(_) => Stream::Fuel,
            ReadingValues::Generator(_) => Stream::Generators,
            ReadingValues::Cctv(_) => Stream::Cctv,
            ReadingValues::Impact(_) => Stream::Impact,
            ReadingValues::Location(_) => Stream::Location,
        }
    }
}

// ==========================================
// NewReading - 待写入读数（表处理器产出）
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct NewReading {
    pub vessel_id: i64,
    pub ts: DateTime<Utc>,
    pub values: ReadingValues,
    pub row_hash: String,
    /// 未映射列的 JSON（无剩余列时为 "{}"）
    pub extra_json: String,
}

impl NewReading {
    pub fn stream(&self) -> Stream {
        self.values.stream()
    }
}

// ==========================================
// StoredReading - 已落库读数（查询层输出）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredReading {
    pub id: i64,
    pub vessel_id: i64,
    pub ts: DateTime<Utc>,
    #[serde(flatten)]
    pub values: ReadingValues,
    pub row_hash: String,
    pub extra_json: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
