// ==========================================
// 船舶遥测数据系统 - 工作表处理器
// ==========================================
// 职责: 表头映射 → 列计划 → 逐行解析/校验/指纹
// 输出: 待写入读数 + 警告（写入由编排器负责）
// ==========================================

mod cctv;
mod common;
mod engine;
mod fuel;
mod generator;
mod impact;
mod ship_info;

pub use cctv::CctvSheetProcessor;
pub use common::{Column, SheetRow, SheetRows, SheetTable};
pub use engine::EngineSheetProcessor;
pub use fuel::FuelSheetProcessor;
pub use generator::GeneratorSheetProcessor;
pub use impact::ImpactSheetProcessor;
pub use ship_info::{extract_location, read_ship_info, ShipInfo};

use crate::domain::types::Stream;
use crate::importer::telemetry_importer_trait::SheetProcessor;

/// 按数据流取处理器（location 来自 Ship Info 表，无独立处理器）
pub fn processor_for(stream: Stream) -> Option<&'static dyn SheetProcessor> {
    match stream {
        Stream::Engines => Some(&EngineSheetProcessor),
        Stream::Fuel => Some(&FuelSheetProcessor),
        Stream::Generators => Some(&GeneratorSheetProcessor),
        Stream::Cctv => Some(&CctvSheetProcessor),
        Stream::Impact => Some(&ImpactSheetProcessor),
        Stream::Location => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processor_for_matches_stream() {
        for stream in Stream::ALL {
            match processor_for(stream) {
                Some(processor) => assert_eq!(processor.stream(), stream),
                None => assert_eq!(stream, Stream::Location),
            }
        }
    }
}
