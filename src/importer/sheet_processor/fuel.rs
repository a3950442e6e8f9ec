// ==========================================
// 工作表处理器 - 油舱 (Fuel)
// ==========================================
// 单位: 表头含 "m3" 的容量/存量列 ×1000 换算为升
// 派生: level_percent = 当前存量 / 容量 × 100（两者均有且容量 > 0）
// 回退: 无"当前存量"列时沿用容量列作为当前存量
// 校验失败 → 跳过该行 + 行级警告
// ==========================================

use super::common::{
    finish_reading, mapped_headers, row_warning, Column, SheetRow, SheetRows, SheetTable,
};
use crate::domain::reading::{FuelTankValues, ReadingValues};
use crate::domain::types::Stream;
use crate::importer::error::ImportResult;
use crate::importer::field_validator::validate_fuel;
use crate::importer::telemetry_importer_trait::SheetProcessor;
use chrono::{DateTime, Utc};

const TANK_NO: [&str; 3] = ["tank_no", "tank", "tank_id"];
const CAPACITY: [&str; 3] = ["capacity", "volume", "volume_liters"];
const CURRENT: [&str; 4] = ["current", "current_level", "current_volume", "volume_liters"];
const TEMP: [&str; 3] = ["temp", "temperature", "temp_c"];

const LITERS_PER_M3: f64 = 1000.0;

struct FuelColumns {
    ts: Option<Column>,
    tank_no: Option<Column>,
    capacity: Option<Column>,
    current: Option<Column>,
    temp: Option<Column>,
}

impl FuelColumns {
    fn resolve(table: &SheetTable<'_>) -> Self {
        let mapper = table.mapper();
        Self {
            ts: table.timestamp_column(&mapper),
            tank_no: table.column(&mapper, &TANK_NO),
            capacity: table.column(&mapper, &CAPACITY),
            current: table.column(&mapper, &CURRENT),
            temp: table.column(&mapper, &TEMP),
        }
    }

    fn mapped(&self) -> Vec<&str> {
        mapped_headers(&[
            &self.ts,
            &self.tank_no,
            &self.capacity,
            &self.current,
            &self.temp,
        ])
    }

    /// 当前存量列（无专用列时回退到容量列）
    fn current_or_capacity(&self) -> Option<&Column> {
        self.current.as_ref().or(self.capacity.as_ref())
    }
}

fn is_m3_header(header: &str) -> bool {
    header.to_lowercase().contains("m3")
}

/// 读取体积并换算为升
fn liters(row: &SheetRow<'_>, column: Option<&Column>) -> Option<f64> {
    let value = row.float(column)?;
    match column {
        Some(c) if is_m3_header(&c.header) => Some(value * LITERS_PER_M3),
        _ => Some(value),
    }
}

pub struct FuelSheetProcessor;

impl SheetProcessor for FuelSheetProcessor {
    fn stream(&self) -> Stream {
        Stream::Fuel
    }

    fn process(
        &self,
        table: &SheetTable<'_>,
        vessel_id: i64,
        reference_ts: DateTime<Utc>,
    ) -> ImportResult<SheetRows> {
        let columns = FuelColumns::resolve(table);
        let mapped = columns.mapped();

        let mut out = SheetRows::default();
        for row in table.rows() {
            let ts = row.timestamp(columns.ts.as_ref(), reference_ts);

            let capacity = liters(&row, columns.capacity.as_ref());
            let current = liters(&row, columns.current_or_capacity());
            let level_percent = match (current, capacity) {
                (Some(cur), Some(cap)) if cap > 0.0 => Some(cur / cap * 100.0),
                _ => None,
            };

            let values = FuelTankValues {
                tank_no: row.ordinal(columns.tank_no.as_ref()),
                level_percent,
                volume_liters: current,
                temp_c: row.float(columns.temp.as_ref()),
            };

            let warnings = validate_fuel(values.level_percent, values.volume_liters);
            if !warnings.is_empty() {
                out.warnings.push(row_warning(row.number, Stream::Fuel, &warnings));
                continue;
            }

            let tag = values.tank_no.map(|n| format!("tank_no:{}", n));
            out.readings.push(finish_reading(
                &row,
                vessel_id,
                ts,
                tag,
                &mapped,
                ReadingValues::Fuel(values),
            )?);
        }

        Ok(out)
    }
}
