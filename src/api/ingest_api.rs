// ==========================================
// 船舶遥测数据系统 - 导入 API
// ==========================================
// 职责: 参数校验 + 调用导入器 + 重复上传策略
// ==========================================

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::config::IngestConfigReader;
use crate::domain::ingest::{IngestRequest, IngestResponse};
use crate::domain::types::IngestStatus;
use crate::importer::TelemetryImporter;

/// 导入API
pub struct IngestApi {
    importer: Arc<dyn TelemetryImporter>,
    config: Arc<dyn IngestConfigReader>,
}

impl IngestApi {
    pub fn new(importer: Arc<dyn TelemetryImporter>, config: Arc<dyn IngestConfigReader>) -> Self {
        Self { importer, config }
    }

    /// 导入遥测工作簿
    ///
    /// # 参数
    /// - bytes / filename: 上传文件
    /// - imo / vessel_name: 至少提供一个
    /// - period_start: 参考时间戳，缺省为当前时间
    ///
    /// # 返回
    /// - Ok(IngestResponse): ingested；或开启重复容忍时的 already_ingested
    /// - Err(DuplicateUpload): 文件已导入且未开启重复容忍
    /// - Err(InvalidInput): 缺少船舶标识 / 格式不支持
    pub async fn ingest(
        &self,
        bytes: &[u8],
        filename: &str,
        imo: Option<&str>,
        vessel_name: Option<&str>,
        period_start: Option<DateTime<Utc>>,
    ) -> ApiResult<IngestResponse> {
        let imo = imo.map(str::trim).filter(|s| !s.is_empty());
        let vessel_name = vessel_name.map(str::trim).filter(|s| !s.is_empty());
        if imo.is_none() && vessel_name.is_none() {
            return Err(ApiError::InvalidInput(
                "必须提供 imo 或 vessel_name".to_string(),
            ));
        }

        let request = IngestRequest {
            bytes,
            filename,
            imo,
            vessel_name,
            reference_ts: period_start.unwrap_or_else(Utc::now),
        };
        let response = self.importer.process_file(request).await?;

        if response.status == IngestStatus::AlreadyIngested {
            let allow = self
                .config
                .allow_unsafe_duplicate_ingest()
                .await
                .map_err(|e| ApiError::ConfigError(e.to_string()))?;

            if !allow {
                warn!(filename = %filename, upload_id = ?response.upload_id, "拒绝重复上传");
                return Err(ApiError::DuplicateUpload {
                    upload_id: response.upload_id.unwrap_or_default(),
                    vessel_id: response.vessel_id.unwrap_or_default(),
                });
            }
            info!(filename = %filename, "重复上传（已开启容忍）");
        }

        Ok(response)
    }
}
