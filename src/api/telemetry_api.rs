// ==========================================
// 船舶遥测数据系统 - 遥测查询 API
// ==========================================
// 职责: 船舶/上传/读数查询，分页游标，健康检查
// 分页: (ts, id) 升序，多取一条判断是否还有下一页
// ==========================================

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Value;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::cursor::Cursor;
use crate::api::error::{ApiError, ApiResult};
use crate::config::IngestConfigReader;
use crate::domain::reading::StoredReading;
use crate::domain::types::Stream;
use crate::domain::vessel::{Upload, Vessel, VesselOverview};
use crate::repository::{
    ReadingQuery, ReadingRepository, StreamLatestRepository, UploadRepository, VesselRepository,
};

// ==========================================
// 请求/响应 DTO
// ==========================================

/// 读数查询参数（均为原始文本，由 API 层校验）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReadingListParams {
    /// 流内过滤值（engine_no / tank_no / gen_no / cam_id / sensor_id）
    pub filter: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub cursor: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReadingPage {
    pub items: Vec<StoredReading>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: String,
    pub database: String,
    pub vessels: i64,
}

// ==========================================
// 参数解析
// ==========================================

fn non_blank(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// 流内过滤值：编号类为整数，其余为文本
fn parse_filter(stream: Stream, raw: Option<&str>) -> ApiResult<Option<Value>> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    match stream {
        Stream::Engines | Stream::Fuel | Stream::Generators => raw
            .parse::<i64>()
            .map(|v| Some(Value::Integer(v)))
            .map_err(|_| ApiError::InvalidInput(format!("过滤值必须为整数: {}", raw))),
        Stream::Cctv | Stream::Impact => Ok(Some(Value::Text(raw.to_string()))),
        Stream::Location => Err(ApiError::InvalidInput(
            "location 数据流不支持过滤".to_string(),
        )),
    }
}

fn parse_bound(name: &str, raw: Option<&str>) -> ApiResult<Option<DateTime<Utc>>> {
    raw.map(|raw| {
        DateTime::parse_from_rfc3339(raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(|_| ApiError::InvalidInput(format!("{} 必须为 RFC3339 时间: {}", name, raw)))
    })
    .transpose()
}

fn parse_stream(raw: &str) -> ApiResult<Stream> {
    raw.parse::<Stream>().map_err(ApiError::InvalidInput)
}

/// 非法（≤0 或超过上限）的 limit 回落到默认值
pub fn clamp_limit(requested: Option<i64>, default: usize, max: usize) -> usize {
    match requested {
        Some(l) if l > 0 && (l as u64) <= max as u64 => l as usize,
        _ => default,
    }
}

// ==========================================
// TelemetryApi
// ==========================================
pub struct TelemetryApi {
    vessel_repo: Arc<VesselRepository>,
    upload_repo: Arc<UploadRepository>,
    reading_repo: Arc<ReadingRepository>,
    stream_latest_repo: Arc<StreamLatestRepository>,
    config: Arc<dyn IngestConfigReader>,
}

impl TelemetryApi {
    pub fn new(
        vessel_repo: Arc<VesselRepository>,
        upload_repo: Arc<UploadRepository>,
        reading_repo: Arc<ReadingRepository>,
        stream_latest_repo: Arc<StreamLatestRepository>,
        config: Arc<dyn IngestConfigReader>,
    ) -> Self {
        Self {
            vessel_repo,
            upload_repo,
            reading_repo,
            stream_latest_repo,
            config,
        }
    }

    // ==========================================
    // 船舶 / 上传
    // ==========================================

    fn overview(&self, vessel: Vessel) -> ApiResult<VesselOverview> {
        let latest = self.stream_latest_repo.list_for_vessel(vessel.id)?;
        Ok(VesselOverview { vessel, latest })
    }

    /// 全部船舶（按船名），附各流最新时间
    pub fn list_vessels(&self) -> ApiResult<Vec<VesselOverview>> {
        self.vessel_repo
            .list_all()?
            .into_iter()
            .map(|vessel| self.overview(vessel))
            .collect()
    }

    pub fn get_vessel(&self, vessel_id: i64) -> ApiResult<VesselOverview> {
        let vessel = self
            .vessel_repo
            .find_by_id(vessel_id)?
            .ok_or_else(|| ApiError::NotFound(format!("船舶(id={})不存在", vessel_id)))?;
        self.overview(vessel)
    }

    pub fn get_upload(&self, upload_id: i64) -> ApiResult<Upload> {
        self.upload_repo
            .find_by_id(upload_id)?
            .ok_or_else(|| ApiError::NotFound(format!("上传记录(id={})不存在", upload_id)))
    }

    /// 健康检查：数据库可查询 + 船舶数
    pub fn health(&self) -> ApiResult<HealthStatus> {
        let vessels = self.vessel_repo.count()?;
        Ok(HealthStatus {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            database: "connected".to_string(),
            vessels,
        })
    }

    // ==========================================
    // 读数
    // ==========================================

    fn build_query(
        &self,
        vessel_id: i64,
        stream: Stream,
        params: &ReadingListParams,
    ) -> ApiResult<ReadingQuery> {
        let mut query = ReadingQuery::new(vessel_id, stream);
        query.filter = parse_filter(stream, non_blank(&params.filter))?;
        query.from = parse_bound("from", non_blank(&params.from))?;
        query.to = parse_bound("to", non_blank(&params.to))?;
        Ok(query)
    }

    /// 分页查询读数
    ///
    /// # 参数
    /// - stream: 数据流名（engines / fuel / generators / cctv / impact / location）
    /// - params: 过滤 / 时间范围 / 游标 / 条数
    ///
    /// # 返回
    /// - items 按 (ts, id) 升序；还有下一页时给出 next_cursor
    pub async fn list_readings(
        &self,
        vessel_id: i64,
        stream: &str,
        params: &ReadingListParams,
    ) -> ApiResult<ReadingPage> {
        let stream = parse_stream(stream)?;
        let mut query = self.build_query(vessel_id, stream, params)?;

        let cursor = Cursor::decode(params.cursor.as_deref().unwrap_or("").trim())?;
        query.after = cursor.as_lower_bound();

        let default_limit = self
            .config
            .default_page_limit()
            .await
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;
        let max_limit = self
            .config
            .max_page_limit()
            .await
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;
        let limit = clamp_limit(params.limit, default_limit, max_limit);

        let mut items = self.reading_repo.find_page(&query, limit.saturating_add(1))?;
        let next_cursor = if items.len() > limit {
            items.truncate(limit);
            items.last().map(|last| Cursor::new(last.ts, last.id).encode())
        } else {
            None
        };

        debug!(
            vessel_id = vessel_id,
            stream = %stream,
            returned = items.len(),
            has_more = next_cursor.is_some(),
            "读数分页查询"
        );

        Ok(ReadingPage { items, next_cursor })
    }

    /// 某流最新一条读数（同样支持过滤 / 时间范围）
    pub fn latest_reading(
        &self,
        vessel_id: i64,
        stream: &str,
        params: &ReadingListParams,
    ) -> ApiResult<Option<StoredReading>> {
        let stream = parse_stream(stream)?;
        let query = self.build_query(vessel_id, stream, params)?;
        Ok(self.reading_repo.find_latest(&query)?)
    }
}
