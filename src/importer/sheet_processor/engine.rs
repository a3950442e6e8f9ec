// ==========================================
// 工作表处理器 - 主机 (Engines)
// ==========================================
// 校验失败 → 跳过该行 + 行级警告
// ==========================================

use super::common::{finish_reading, mapped_headers, row_warning, Column, SheetRows, SheetTable};
use crate::domain::reading::{EngineValues, ReadingValues};
use crate::domain::types::Stream;
use crate::importer::error::ImportResult;
use crate::importer::field_validator::validate_engine;
use crate::importer::telemetry_importer_trait::SheetProcessor;
use chrono::{DateTime, Utc};

const ENGINE_NO: [&str; 3] = ["engine_no", "engine", "eng_no"];
const RPM: [&str; 1] = ["rpm"];
const TEMP: [&str; 3] = ["temp", "temperature", "temp_c"];
const OIL_PRESSURE: [&str; 3] = ["oil_pressure", "pressure", "oil_press"];
const ALARMS: [&str; 3] = ["alarm", "alarms", "alert"];

struct EngineColumns {
    ts: Option<Column>,
    engine_no: Option<Column>,
    rpm: Option<Column>,
    temp: Option<Column>,
    oil_pressure: Option<Column>,
    alarms: Option<Column>,
}

impl EngineColumns {
    fn resolve(table: &SheetTable<'_>) -> Self {
        let mapper = table.mapper();
        Self {
            ts: table.timestamp_column(&mapper),
            engine_no: table.column(&mapper, &ENGINE_NO),
            rpm: table.column(&mapper, &RPM),
            temp: table.column(&mapper, &TEMP),
            oil_pressure: table.column(&mapper, &OIL_PRESSURE),
            alarms: table.column(&mapper, &ALARMS),
        }
    }

    fn mapped(&self) -> Vec<&str> {
        mapped_headers(&[
            &self.ts,
            &self.engine_no,
            &self.rpm,
            &self.temp,
            &self.oil_pressure,
            &self.alarms,
        ])
    }
}

pub struct EngineSheetProcessor;

impl SheetProcessor for EngineSheetProcessor {
    fn stream(&self) -> Stream {
        Stream::Engines
    }

    fn process(
        &self,
        table: &SheetTable<'_>,
        vessel_id: i64,
        reference_ts: DateTime<Utc>,
    ) -> ImportResult<SheetRows> {
        let columns = EngineColumns::resolve(table);
        if columns.ts.is_none() {
            tracing::debug!(sheet = table.name, headers = ?table.headers, "主机表未找到时间戳列");
        }
        let mapped = columns.mapped();

        let mut out = SheetRows::default();
        for row in table.rows() {
            let ts = row.timestamp(columns.ts.as_ref(), reference_ts);
            let values = EngineValues {
                engine_no: row.ordinal(columns.engine_no.as_ref()),
                rpm: row.float(columns.rpm.as_ref()),
                temp_c: row.float(columns.temp.as_ref()),
                oil_pressure_bar: row.float(columns.oil_pressure.as_ref()),
                alarms: row.text(columns.alarms.as_ref()),
            };

            let warnings = validate_engine(values.rpm, values.oil_pressure_bar);
            if !warnings.is_empty() {
                out.warnings
                    .push(row_warning(row.number, Stream::Engines, &warnings));
                continue;
            }

            let tag = values.engine_no.map(|n| format!("engine_no:{}", n));
            out.readings.push(finish_reading(
                &row,
                vessel_id,
                ts,
                tag,
                &mapped,
                ReadingValues::Engine(values),
            )?);
        }

        Ok(out)
    }
}
