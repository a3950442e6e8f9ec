// ==========================================
// 船舶遥测数据系统 - 遥测导入器实现
// ==========================================
// 职责: 整合导入流程，从文件字节到数据库
// 流程: 文件哈希 → 重复检查 → 打开工作簿 → 船舶身份
//       → 船位 + 各遥测表 → stream_latest → 上传记录
// ==========================================
// 并发: 仅依赖 uploads.file_hash 与读数表 (vessel_id, ts, row_hash) 唯一约束
// ==========================================

use crate::domain::ingest::{IngestRequest, IngestResponse, SheetOutcome};
use crate::domain::types::{IngestStatus, Stream};
use crate::domain::vessel::{NewUpload, StreamLatest, UploadInsertOutcome, VesselProfile};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::fingerprint::file_hash;
use crate::importer::sheet_processor::{
    extract_location, processor_for, read_ship_info, ShipInfo, SheetRows, SheetTable,
};
use crate::importer::telemetry_importer_trait::{TelemetryImporter, WorkbookReader};
use crate::importer::value_parser::non_empty;
use crate::importer::workbook_reader::{is_ship_info_sheet, Workbook, WorkbookSheet};
use crate::repository::{RepositoryError, TelemetryImportRepository};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// TelemetryImporterImpl - 遥测导入器实现
// ==========================================
pub struct TelemetryImporterImpl<R>
where
    R: TelemetryImportRepository,
{
    // 数据访问层
    import_repo: R,

    // 工作簿读取器
    reader: Box<dyn WorkbookReader>,
}

impl<R> TelemetryImporterImpl<R>
where
    R: TelemetryImportRepository,
{
    /// # 参数
    /// - import_repo: 导入数据仓储
    /// - reader: 工作簿读取器（通常为 UniversalWorkbookReader）
    pub fn new(import_repo: R, reader: Box<dyn WorkbookReader>) -> Self {
        Self {
            import_repo,
            reader,
        }
    }

    /// 解析船舶身份并落库
    ///
    /// 优先级:
    /// - IMO: 显式参数 > Ship Info 表
    /// - 船名: Ship Info 表 > 参数 > `Vessel-{imo}`
    async fn resolve_vessel(
        &self,
        ship: &ShipInfo,
        imo_param: Option<&str>,
        name_param: Option<&str>,
    ) -> ImportResult<i64> {
        let imo = imo_param.map(str::trim).and_then(non_empty).or_else(|| ship.imo.clone());

        let name = ship
            .name
            .clone()
            .or_else(|| name_param.map(str::trim).and_then(non_empty))
            .or_else(|| imo.as_ref().map(|imo| format!("Vessel-{}", imo)))
            .ok_or(ImportError::VesselIdentityMissing)?;

        let profile = VesselProfile {
            imo,
            name,
            flag: ship.flag.clone(),
            vessel_type: ship.vessel_type.clone(),
        };

        let Some(imo) = profile.imo.as_deref() else {
            // 仅有船名：每次导入都新建船舶
            let id = self.import_repo.insert_vessel(&profile).await?;
            debug!(vessel_id = id, name = %profile.name, "新建船舶（无 IMO）");
            return Ok(id);
        };

        if let Some(existing) = self.import_repo.find_vessel_by_imo(imo).await? {
            self.import_repo
                .update_vessel_profile(existing.id, &profile)
                .await?;
            debug!(vessel_id = existing.id, imo = %imo, "更新已有船舶");
            return Ok(existing.id);
        }

        match self.import_repo.insert_vessel(&profile).await {
            Ok(id) => {
                info!(vessel_id = id, imo = %imo, name = %profile.name, "新建船舶");
                Ok(id)
            }
            Err(RepositoryError::UniqueConstraintViolation(msg)) => {
                // 并发导入同一 IMO：改为更新胜出者
                let existing = self
                    .import_repo
                    .find_vessel_by_imo(imo)
                    .await?
                    .ok_or(RepositoryError::UniqueConstraintViolation(msg))?;
                self.import_repo
                    .update_vessel_profile(existing.id, &profile)
                    .await?;
                Ok(existing.id)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// 写入单表产出的读数
    async fn store_rows(&self, rows: SheetRows) -> ImportResult<SheetOutcome> {
        let inserted = self.import_repo.insert_readings(&rows.readings).await?;
        let skipped = rows.readings.len() - inserted;
        if skipped > 0 {
            debug!(skipped = skipped, "重复读数已忽略");
        }
        Ok(SheetOutcome {
            inserted,
            warnings: rows.warnings,
        })
    }

    /// 处理一张遥测表；读取/解析失败降级为警告
    async fn process_sheet(
        &self,
        sheet: &WorkbookSheet,
        stream: Stream,
        vessel_id: i64,
        reference_ts: DateTime<Utc>,
    ) -> ImportResult<SheetOutcome> {
        let failed = || SheetOutcome::failed(format!("error reading {} sheet", sheet.name));

        let Some(processor) = processor_for(stream) else {
            return Ok(SheetOutcome::default());
        };

        let table = match SheetTable::from_sheet(sheet) {
            Ok(table) => table,
            Err(reason) => {
                warn!(sheet = %sheet.name, stream = %processor.stream(), reason = %reason, "工作表不可用");
                return Ok(failed());
            }
        };

        match processor.process(&table, vessel_id, reference_ts) {
            Ok(rows) => self.store_rows(rows).await,
            Err(e) => {
                warn!(sheet = %sheet.name, stream = %processor.stream(), error = %e, "工作表处理失败");
                Ok(failed())
            }
        }
    }

    /// 逐表处理，按流汇总写入行数与警告
    async fn process_workbook(
        &self,
        workbook: &Workbook,
        ship_table: Option<&SheetTable<'_>>,
        vessel_id: i64,
        reference_ts: DateTime<Utc>,
    ) -> ImportResult<(BTreeMap<Stream, usize>, Vec<String>)> {
        let mut rows_inserted = BTreeMap::new();
        let mut warnings = Vec::new();

        // ===== 船位（来自 Ship Info 表第一条数据行）=====
        if let Some(table) = ship_table {
            let outcome = self
                .store_rows(extract_location(table, vessel_id, reference_ts)?)
                .await?;
            if outcome.inserted > 0 {
                rows_inserted.insert(Stream::Location, outcome.inserted);
            }
            warnings.extend(outcome.warnings);
        }

        // ===== 遥测表 =====
        for sheet in &workbook.sheets {
            if is_ship_info_sheet(&sheet.name) {
                continue;
            }
            let Some(stream) = Stream::classify_sheet(&sheet.name) else {
                debug!(sheet = %sheet.name, "未识别的工作表，跳过");
                continue;
            };

            let outcome = self
                .process_sheet(sheet, stream, vessel_id, reference_ts)
                .await?;
            info!(
                sheet = %sheet.name,
                stream = %stream,
                inserted = outcome.inserted,
                warnings = outcome.warnings.len(),
                "工作表处理完成"
            );

            *rows_inserted.entry(stream).or_insert(0) += outcome.inserted;
            warnings.extend(outcome.warnings);
        }

        Ok((rows_inserted, warnings))
    }
}

#[async_trait::async_trait]
impl<R> TelemetryImporter for TelemetryImporterImpl<R>
where
    R: TelemetryImportRepository + Send + Sync,
{
    #[instrument(skip(self, request), fields(run_id, filename = %request.filename))]
    async fn process_file(&self, request: IngestRequest<'_>) -> ImportResult<IngestResponse> {
        let run_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("run_id", run_id.as_str());

        // === 步骤 1: 文件哈希 + 重复检查 ===
        let file_hash = file_hash(request.bytes);
        if let Some(existing) = self.import_repo.find_upload_by_hash(&file_hash).await? {
            info!(upload_id = existing.id, "文件已导入，跳过");
            return Ok(IngestResponse::already_ingested(
                existing.id,
                existing.vessel_id,
            ));
        }

        // === 步骤 2: 打开工作簿 ===
        let workbook = self
            .reader
            .read_workbook(request.bytes, request.filename)?;
        debug!(sheets = ?workbook.sheet_names(), "工作簿已打开");

        // === 步骤 3: 船舶身份 ===
        let ship_table = workbook
            .ship_info_sheet()
            .and_then(|sheet| SheetTable::from_sheet(sheet).ok());
        let ship = ship_table.as_ref().map(read_ship_info).unwrap_or_default();
        let vessel_id = self
            .resolve_vessel(&ship, request.imo, request.vessel_name)
            .await?;

        // === 步骤 4: 船位 + 遥测表 ===
        let (rows_inserted, warnings) = self
            .process_workbook(&workbook, ship_table.as_ref(), vessel_id, request.reference_ts)
            .await?;
        for warning in &warnings {
            warn!(warning = %warning, "导入警告");
        }

        // === 步骤 5: stream_latest ===
        for (stream, count) in &rows_inserted {
            if *count > 0 {
                self.import_repo
                    .upsert_stream_latest(StreamLatest {
                        vessel_id,
                        stream: *stream,
                        latest_ts: request.reference_ts,
                    })
                    .await?;
            }
        }

        // === 步骤 6: 上传记录 ===
        let upload = NewUpload {
            vessel_id,
            source_filename: request.filename.to_string(),
            file_hash,
            uploaded_at: request.reference_ts,
            note: None,
        };
        let upload_id = match self.import_repo.insert_upload(upload).await? {
            UploadInsertOutcome::Inserted(id) => id,
            UploadInsertOutcome::Duplicate(winner) => {
                info!(upload_id = winner.id, "并发导入落败，返回已有上传记录");
                return Ok(IngestResponse::already_ingested(winner.id, winner.vessel_id));
            }
        };

        info!(
            upload_id = upload_id,
            vessel_id = vessel_id,
            total = rows_inserted.values().sum::<usize>(),
            "导入完成"
        );

        Ok(IngestResponse {
            status: IngestStatus::Ingested,
            upload_id: Some(upload_id),
            vessel_id: Some(vessel_id),
            rows_inserted,
            warnings,
        })
    }
}
