// ==========================================
// 船舶遥测数据系统 - 导入层
// ==========================================
// 职责: 遥测工作簿导入，生成读数与船舶主数据
// 支持: Excel (.xlsx/.xlsm), CSV
// ==========================================

// 模块声明
pub mod error;
pub mod extra_fields;
pub mod field_validator;
pub mod fingerprint;
pub mod header_mapper;
pub mod sheet_processor;
pub mod telemetry_importer_impl;
pub mod telemetry_importer_trait;
pub mod value_parser;
pub mod workbook_reader;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use header_mapper::HeaderMapper;
pub use telemetry_importer_impl::TelemetryImporterImpl;
pub use workbook_reader::{
    CsvWorkbookReader, UniversalWorkbookReader, Workbook, WorkbookSheet, XlsxWorkbookReader,
};

// 重导出 Trait 接口
pub use telemetry_importer_trait::{SheetProcessor, TelemetryImporter, WorkbookReader};
