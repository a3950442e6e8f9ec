// ==========================================
// 工作表处理器 - 发电机 (Generators)
// ==========================================
// 校验失败 → 跳过该行 + 行级警告
// ==========================================

use super::common::{finish_reading, mapped_headers, row_warning, Column, SheetRows, SheetTable};
use crate::domain::reading::{GeneratorValues, ReadingValues};
use crate::domain::types::Stream;
use crate::importer::error::ImportResult;
use crate::importer::field_validator::validate_generator;
use crate::importer::telemetry_importer_trait::SheetProcessor;
use chrono::{DateTime, Utc};

const GEN_NO: [&str; 4] = ["gen_no", "generator", "gen", "generator_no"];
const LOAD: [&str; 3] = ["load", "load_kw", "power"];
const VOLTAGE: [&str; 3] = ["voltage", "volt", "voltage_v"];
const FREQUENCY: [&str; 3] = ["frequency", "freq", "frequency_hz"];
const FUEL_RATE: [&str; 3] = ["fuel_rate", "fuel_rate_lph", "consumption"];

struct GeneratorColumns {
    ts: Option<Column>,
    gen_no: Option<Column>,
    load: Option<Column>,
    voltage: Option<Column>,
    frequency: Option<Column>,
    fuel_rate: Option<Column>,
}

impl GeneratorColumns {
    fn resolve(table: &SheetTable<'_>) -> Self {
        let mapper = table.mapper();
        Self {
            ts: table.timestamp_column(&mapper),
            gen_no: table.column(&mapper, &GEN_NO),
            load: table.column(&mapper, &LOAD),
            voltage: table.column(&mapper, &VOLTAGE),
            frequency: table.column(&mapper, &FREQUENCY),
            fuel_rate: table.column(&mapper, &FUEL_RATE),
        }
    }

    fn mapped(&self) -> Vec<&str> {
        mapped_headers(&[
            &self.ts,
            &self.gen_no,
            &self.load,
            &self.voltage,
            &self.frequency,
            &self.fuel_rate,
        ])
    }
}

pub struct GeneratorSheetProcessor;

impl SheetProcessor for GeneratorSheetProcessor {
    fn stream(&self) -> Stream {
        Stream::Generators
    }

    fn process(
        &self,
        table: &SheetTable<'_>,
        vessel_id: i64,
        reference_ts: DateTime<Utc>,
    ) -> ImportResult<SheetRows> {
        let columns = GeneratorColumns::resolve(table);
        let mapped = columns.mapped();

        let mut out = SheetRows::default();
        for row in table.rows() {
            let ts = row.timestamp(columns.ts.as_ref(), reference_ts);
            let values = GeneratorValues {
                gen_no: row.ordinal(columns.gen_no.as_ref()),
                load_kw: row.float(columns.load.as_ref()),
                voltage_v: row.float(columns.voltage.as_ref()),
                frequency_hz: row.float(columns.frequency.as_ref()),
                fuel_rate_lph: row.float(columns.fuel_rate.as_ref()),
            };

            let warnings = validate_generator(
                values.load_kw,
                values.voltage_v,
                values.frequency_hz,
                values.fuel_rate_lph,
            );
            if !warnings.is_empty() {
                out.warnings
                    .push(row_warning(row.number, Stream::Generators, &warnings));
                continue;
            }

            let tag = values.gen_no.map(|n| format!("gen_no:{}", n));
            out.readings.push(finish_reading(
                &row,
                vessel_id,
                ts,
                tag,
                &mapped,
                ReadingValues::Generator(values),
            )?);
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_generator_rows() {
        let reference = Utc.with_ymd_and_hms(2025, 8, 1, 0, 0, 0).unwrap();
        let headers = strings(&["Time", "Generator", "Load kW", "Voltage V", "Freq Hz", "Fuel Rate"]);
        let data = vec![
            strings(&["2025-08-08 10:00", "DG-1", "450", "440", "60", "95.5"]),
            strings(&["2025-08-08 10:00", "DG-2", "450", "440", "80", "95.5"]),
        ];
        let table = SheetTable::new("Generators", &headers, &data);

        let out = GeneratorSheetProcessor.process(&table, 1, reference).unwrap();
        assert_eq!(out.readings.len(), 1);
        assert_eq!(out.warnings, vec!["row 3 generators: frequency out of range (45-70 Hz)"]);
        assert_eq!(
            out.readings[0].values,
            ReadingValues::Generator(GeneratorValues {
                gen_no: Some(1),
                load_kw: Some(450.0),
                voltage_v: Some(440.0),
                frequency_hz: Some(60.0),
                fuel_rate_lph: Some(95.5),
            })
        );
        assert_eq!(
            out.readings[0].ts,
            Utc.with_ymd_and_hms(2025, 8, 8, 10, 0, 0).unwrap()
        );
    }
}
