// ==========================================
// 船舶遥测数据系统 - 遥测导入 Trait
// ==========================================
// 职责: 定义导入接口（不包含实现）
// ==========================================

use crate::domain::ingest::{IngestRequest, IngestResponse};
use crate::domain::types::Stream;
use crate::importer::error::ImportResult;
use crate::importer::sheet_processor::{SheetRows, SheetTable};
use crate::importer::workbook_reader::Workbook;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

// ==========================================
// TelemetryImporter Trait
// ==========================================
// 用途: 遥测工作簿导入主接口
// 实现者: TelemetryImporterImpl
#[async_trait]
pub trait TelemetryImporter: Send + Sync {
    /// 导入一个工作簿
    ///
    /// # 返回
    /// - Ok(IngestResponse): status = ingested / already_ingested
    /// - Err: 工作簿无法打开、船舶身份无法确定、船舶/上传记录写入失败
    ///
    /// # 导入流程
    /// 1. 文件哈希 + 重复检查
    /// 2. 打开工作簿
    /// 3. 解析船舶身份（Ship Info 表 / 参数）
    /// 4. 船位 + 各遥测表处理
    /// 5. 更新 stream_latest
    /// 6. 写入上传记录
    async fn process_file(&self, request: IngestRequest<'_>) -> ImportResult<IngestResponse>;
}

// ==========================================
// WorkbookReader Trait
// ==========================================
// 用途: 字节 → 工作簿
// 实现者: XlsxWorkbookReader, CsvWorkbookReader, UniversalWorkbookReader
pub trait WorkbookReader: Send + Sync {
    /// # 参数
    /// - bytes: 原始文件字节
    /// - filename: 原始文件名（用于格式分派、CSV 表名）
    ///
    /// # 返回
    /// - Err: 容器本身无法解析（整体失败）
    fn read_workbook(&self, bytes: &[u8], filename: &str) -> ImportResult<Workbook>;
}

// ==========================================
// SheetProcessor Trait
// ==========================================
// 用途: 单张遥测表 → 待写入读数 + 警告
// 实现者: Engine/Fuel/Generator/Cctv/Impact SheetProcessor
pub trait SheetProcessor: Send + Sync {
    fn stream(&self) -> Stream;

    /// # 参数
    /// - table: 已确认至少含一行数据的工作表
    /// - vessel_id: 已解析的船舶 ID
    /// - reference_ts: 行无有效时间戳时的默认值
    fn process(
        &self,
        table: &SheetTable<'_>,
        vessel_id: i64,
        reference_ts: DateTime<Utc>,
    ) -> ImportResult<SheetRows>;
}
